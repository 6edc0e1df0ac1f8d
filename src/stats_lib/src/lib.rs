//==================================================================================================
// Configuration
//==================================================================================================
#![deny(clippy::all)]

//==================================================================================================
// Imports
//==================================================================================================
use log::debug;
use sim_lib::{Outcome, ReferenceResult};
use std::{
    collections::HashSet,
    fmt,
};

//==================================================================================================
// Structures
//==================================================================================================
/// A hit count out of a number of references.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitRate {
    pub hits	: usize,
    pub total	: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitStats {
    /// Hits the simulated cache actually scored
    pub achieved	: HitRate,
    /// Hits of an unbounded cache: every reference but the first to each block
    pub best_possible	: HitRate,
}

//==================================================================================================
// Implementations
//==================================================================================================
impl HitRate {
    pub fn new(hits: usize, total: usize) -> Self {
	Self { hits, total }
    }

    /// Hit rate in percent, 0 for an empty trace.
    pub fn percent(&self) -> f64 {
	if self.total > 0 {
	    (self.hits as f64 / self.total as f64) * 100.0
	} else {
	    0.0
	}
    }
}

impl fmt::Display for HitRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	write!(f, "{}/{} = {:.2}%", self.hits, self.total, self.percent())
    }
}

impl HitStats {
    /// Summarizes a resolved trace.
    pub fn analyze(results: &[ReferenceResult]) -> Self {
	let total = results.len();

	let hits = results
	    .iter()
	    .filter(|r| r.outcome == Outcome::Hit)
	    .count();

	let mut seen: HashSet<u64> = HashSet::new();
	let repeats = results
	    .iter()
	    .filter(|r| !seen.insert(r.block))
	    .count();

	debug!(
	    "{} references: {} hits, {} repeated blocks",
	    total,
	    hits,
	    repeats,
	);

	Self {
	    achieved: HitRate::new(hits, total),
	    best_possible: HitRate::new(repeats, total),
	}
    }
}
