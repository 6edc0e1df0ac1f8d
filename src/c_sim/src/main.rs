//==================================================================================================
// Configuration
//==================================================================================================
#![deny(clippy::all)]

//==================================================================================================
// Modules
//==================================================================================================
mod args;
mod interactive;
mod report;

//==================================================================================================
// Imports
//==================================================================================================
use anyhow::{Context, Result};
use args::Args;
use geometry_lib::Config;
use log::{error, info};
use sim_lib::Simulator;
use stats_lib::HitStats;
use std::{
    io::{self, Write},
    path::Path,
};
use trace_lib::Trace;

/// Runs one independent simulation and writes the full report to `out`.
fn simulate<W: Write>(out: &mut W, config: Config, trace_path: &Path) -> Result<()> {
    info!(
	"Simulating {}-way {} B cache over {} B memory ({}, {})",
	config.associativity,
	config.cache_size,
	config.memory_size,
	config.replacement,
	config.write,
    );

    let mut sim = Simulator::new(config).context("invalid cache configuration")?;
    report::print_geometry(out, sim.sim_geometry())?;

    let trace = Trace::from_file(trace_path, config.memory_size)
	.with_context(|| format!("failed to load trace {}", trace_path.display()))?;

    sim.sim_run(&trace)?;
    let stats = HitStats::analyze(sim.sim_results());

    report::print_references(out, sim.sim_results())?;
    report::print_cache(out, sim.sim_cache())?;
    report::print_hit_rates(out, &stats)?;
    out.flush()?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.interactive() {
	let trace_path = args
	    .trace()
	    .ok_or_else(|| anyhow::anyhow!("no trace file given"))?;
	return simulate(&mut out, args.config(), trace_path);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
	let (config, trace_path) = interactive::read_config(&mut input, &mut out)?;
	writeln!(out, "{}", trace_path.display())?;
	// A failed run does not end the session
	if let Err(e) = simulate(&mut out, config, &trace_path) {
	    error!("{:#}", e);
	    writeln!(out, "ERROR: {:#}", e)?;
	}
	if !interactive::ask_continue(&mut input, &mut out)? {
	    return Ok(());
	}
    }
}

fn main() {
    env_logger::init();

    let result = Args::parse(std::env::args().collect()).and_then(run);
    if let Err(e) = result {
	error!("{:#}", e);
	eprintln!("ERROR: {:#}", e);
	std::process::exit(1);
    }
}
