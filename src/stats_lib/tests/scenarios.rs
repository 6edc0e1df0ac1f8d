//! End-to-end runs: trace text in, resolved references and hit rates out.

use geometry_lib::{Config, ReplacementPolicy, WritePolicy};
use sim_lib::{Outcome, Simulator};
use stats_lib::{HitRate, HitStats};
use trace_lib::Trace;

fn config(associativity: u64, replacement: ReplacementPolicy, write: WritePolicy) -> Config {
    Config {
	memory_size: 1024,
	cache_size: 64,
	block_size: 16,
	associativity,
	replacement,
	write,
    }
}

fn run(config: Config, text: &str) -> (Simulator, HitStats) {
    let trace = Trace::parse(text, config.memory_size).unwrap();
    let mut sim = Simulator::new(config).unwrap();
    sim.sim_run(&trace).unwrap();
    let stats = HitStats::analyze(sim.sim_results());
    (sim, stats)
}

#[test]
fn cold_fills_then_one_hit() {
    let (sim, stats) = run(
	config(2, ReplacementPolicy::Lru, WritePolicy::WriteBack),
	"4\nR 0\nR 16\nR 32\nR 0\n",
    );

    let outcomes: Vec<Outcome> = sim.sim_results().iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Miss, Outcome::Miss, Outcome::Miss, Outcome::Hit]);

    let blocks: Vec<u64> = sim.sim_results().iter().map(|r| r.block).collect();
    assert_eq!(blocks, vec![0, 1, 2, 0]);

    assert_eq!(stats.achieved, HitRate::new(1, 4));
    assert_eq!(stats.best_possible, HitRate::new(1, 4));
    assert_eq!(stats.achieved.to_string(), "1/4 = 25.00%");
}

#[test]
fn achieved_never_exceeds_best_possible() {
    let trace = "12\nR 0\nW 64\nR 128\nR 0\nW 192\nR 64\nR 16\nW 80\nR 0\nR 144\nW 16\nR 128\n";
    for associativity in [1, 2, 4] {
	for replacement in [ReplacementPolicy::Lru, ReplacementPolicy::Fifo] {
	    for write in [WritePolicy::WriteBack, WritePolicy::WriteThrough] {
		let (_, stats) = run(config(associativity, replacement, write), trace);
		assert!(stats.achieved.hits <= stats.best_possible.hits);
		assert_eq!(stats.achieved.total, 12);
	    }
	}
    }
}

#[test]
fn fully_associative_cache_reaches_best_possible() {
    // Four distinct blocks fit in four lines, so only cold misses remain
    let (_, stats) = run(
	config(4, ReplacementPolicy::Fifo, WritePolicy::WriteThrough),
	"8\nR 0\nR 100\nW 200\nR 300\nR 0\nW 100\nR 200\nR 300\n",
    );
    assert_eq!(stats.achieved, stats.best_possible);
    assert_eq!(stats.achieved, HitRate::new(4, 8));
}

#[test]
fn conflicting_blocks_thrash_direct_mapped_cache() {
    // Blocks 0 and 4 share set 0
    let (_, stats) = run(
	config(1, ReplacementPolicy::Lru, WritePolicy::WriteBack),
	"6\nR 0\nR 64\nR 0\nR 64\nR 0\nR 64\n",
    );
    assert_eq!(stats.achieved, HitRate::new(0, 6));
    assert_eq!(stats.best_possible, HitRate::new(4, 6));
}
