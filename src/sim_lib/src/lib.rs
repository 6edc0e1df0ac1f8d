//==================================================================================================
// Configuration
//==================================================================================================
#![deny(clippy::all)]

//==================================================================================================
// Imports
//==================================================================================================
use cache_lib::Cache;
use geometry_lib::{
    Config,
    ConfigError,
    Geometry,
    ReplacementPolicy,
};
use log::{debug, info};
use std::{
    fmt,
    ops::Range,
};
use thiserror::Error;
use trace_lib::{MemRef, Operation, Trace};

//==================================================================================================
// Enum
//==================================================================================================
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("address {address} is outside main memory ({memory_size} bytes)")]
    AddressOutOfRange { address: u64, memory_size: u64 },
}

//==================================================================================================
// Structures
//==================================================================================================
/// How a single memory reference was resolved against the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceResult {
    pub address		: u64,
    pub operation	: Operation,
    /// Main memory block number
    pub block		: u64,
    /// Cache set number
    pub set		: usize,
    /// Cache lines the block may occupy
    pub lines		: Range<usize>,
    pub outcome		: Outcome,
}

/// Drives one cache through a trace. Every `Simulator` owns its own, freshly initialized cache.
#[derive(Clone, Debug)]
pub struct Simulator {
    config	: Config,
    geometry	: Geometry,
    cache	: Cache,
    results	: Vec<ReferenceResult>,
}

//==================================================================================================
// Implementations
//==================================================================================================
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Outcome::Hit => write!(f, "Hit"),
	    Outcome::Miss => write!(f, "Miss"),
	}
    }
}

impl Simulator {
    /// Validates `config` and builds an empty cache for it.
    pub fn new(config: Config) -> Result<Self, SimError> {
	let geometry = Geometry::new(&config)?;
	let cache = Cache::new(&geometry, config.replacement, config.write);

	Ok(Self {
	    config,
	    geometry,
	    cache,
	    results: Vec::new(),
	})
    }

    /// Resolves one memory reference, updating the cache and recording the result.
    pub fn sim_process(&mut self, mem_ref: MemRef) -> Result<&ReferenceResult, SimError> {
	let address = mem_ref.memref_address();
	let operation = mem_ref.memref_operation();
	if address >= self.config.memory_size {
	    return Err(SimError::AddressOutOfRange {
		address,
		memory_size: self.config.memory_size,
	    });
	}

	let block = self.geometry.block_number(address);
	let set = self.geometry.set_of_block(block);
	let tag = self.geometry.tag_of_block(block);
	let is_write = operation.is_write();

	let outcome = match self.cache.cache_lookup(set, tag) {
	    Some(line) => {
		self.cache.cache_mark_hit(line, is_write);
		self.cache.cache_touch(line, set);
		Outcome::Hit
	    }
	    None => {
		let line = match self.cache.cache_find_free_slot(set) {
		    Some(free) => free,
		    None => self.cache.cache_eviction_target(set),
		};
		self.cache.cache_fill(line, tag, block, is_write);
		match self.config.replacement {
		    ReplacementPolicy::Lru => self.cache.cache_touch(line, set),
		    ReplacementPolicy::Fifo => self.cache.cache_advance_fifo(set),
		}
		Outcome::Miss
	    }
	};

	debug!(
	    "[Sim] {} {} -> mm blk {}, set {}, tag {}: {}",
	    operation,
	    address,
	    block,
	    set,
	    tag,
	    outcome,
	);

	self.results.push(ReferenceResult {
	    address,
	    operation,
	    block,
	    set,
	    lines: self.geometry.set_lines(set),
	    outcome,
	});
	match self.results.last() {
	    Some(result) => Ok(result),
	    None => unreachable!("a result was just recorded"),
	}
    }

    /// Resolves every reference of `trace`, in order.
    pub fn sim_run(&mut self, trace: &Trace) -> Result<&[ReferenceResult], SimError> {
	info!("Simulating {} memory references", trace.trace_len());
	for mem_ref in trace.trace_refs() {
	    self.sim_process(*mem_ref)?;
	}
	Ok(&self.results)
    }

    pub fn sim_results(&self) -> &[ReferenceResult] {
	&self.results
    }

    pub fn sim_cache(&self) -> &Cache {
	&self.cache
    }

    pub fn sim_geometry(&self) -> &Geometry {
	&self.geometry
    }
}
