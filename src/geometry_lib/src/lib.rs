//==================================================================================================
// Configuration
//==================================================================================================
#![deny(clippy::all)]

//==================================================================================================
// Imports
//==================================================================================================
use log::debug;
use std::{
    fmt,
    ops::Range,
    str::FromStr,
};
use thiserror::Error;

//==================================================================================================
// Constants
//==================================================================================================
/// Largest number of cache lines a simulated cache may have.
pub const MAX_LINES: u64 = 1 << 24;

//==================================================================================================
// Enum
//==================================================================================================
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplacementPolicy {
    Lru,
    Fifo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WritePolicy {
    WriteBack,
    WriteThrough,
}

/// Reasons a cache configuration is rejected before any reference is simulated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer")]
    NonPositive { name: &'static str },

    #[error("{name} ({value}) must be power of 2")]
    NotPowerOfTwo { name: &'static str, value: u64 },

    #[error("cache size ({cache_size}) is not divisible by block size ({block_size}) x associativity ({associativity})")]
    Indivisible {
	cache_size	: u64,
	block_size	: u64,
	associativity	: u64,
    },

    #[error("cache size ({cache_size}) exceeds main memory size ({memory_size})")]
    CacheExceedsMemory { cache_size: u64, memory_size: u64 },

    #[error("cache has {num_lines} lines (at most {max} are supported)")]
    TooManyLines { num_lines: u64, max: u64 },

    #[error("address width ({address_bits} bits) cannot hold {offset_bits} offset bits and {index_bits} index bits")]
    NegativeTagBits {
	address_bits	: u32,
	offset_bits	: u32,
	index_bits	: u32,
    },

    #[error("invalid replacement policy '{0}' (expected LRU or FIFO)")]
    UnknownReplacementPolicy(String),

    #[error("invalid write policy '{0}' (expected write-back or write-through)")]
    UnknownWritePolicy(String),
}

//==================================================================================================
// Structures
//==================================================================================================
/// The six user-facing parameters of a simulated cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Main memory size (in Bytes)
    pub memory_size		: u64,
    /// Cache data size (in Bytes)
    pub cache_size		: u64,
    /// Block (line) size (in Bytes)
    pub block_size		: u64,
    /// Number of lines per set
    pub associativity		: u64,
    pub replacement		: ReplacementPolicy,
    pub write			: WritePolicy,
}

/// Bit layout and dimensions derived from a [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    address_bits		: u32,
    offset_bits			: u32,
    index_bits			: u32,
    tag_bits			: u32,

    block_size			: u64,
    associativity		: usize,
    num_lines			: usize,
    num_sets			: usize,

    // Storage footprint (in Bytes)
    cache_size			: u64,
    tag_storage			: u64,
    valid_storage		: u64,
    dirty_storage		: u64,
}

//==================================================================================================
// Implementations
//==================================================================================================
impl FromStr for ReplacementPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
	match s.trim().to_ascii_lowercase().as_str() {
	    "l" | "lru" => Ok(ReplacementPolicy::Lru),
	    "f" | "fifo" => Ok(ReplacementPolicy::Fifo),
	    _ => Err(ConfigError::UnknownReplacementPolicy(s.to_string())),
	}
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    ReplacementPolicy::Lru => write!(f, "LRU"),
	    ReplacementPolicy::Fifo => write!(f, "FIFO"),
	}
    }
}

impl FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
	match s.trim().to_ascii_lowercase().as_str() {
	    "b" | "write-back" | "writeback" => Ok(WritePolicy::WriteBack),
	    "t" | "write-through" | "writethrough" => Ok(WritePolicy::WriteThrough),
	    _ => Err(ConfigError::UnknownWritePolicy(s.to_string())),
	}
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    WritePolicy::WriteBack => write!(f, "write-back"),
	    WritePolicy::WriteThrough => write!(f, "write-through"),
	}
    }
}

impl Geometry {
    /// Derives the cache geometry from `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(Geometry)`       - if every size is a positive power of two and the sizes fit together
    /// * `Err(ConfigError)`   - otherwise; nothing is simulated with a rejected configuration
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
	// Sanity Check
	for (name, value) in [
	    ("main memory size", config.memory_size),
	    ("cache size", config.cache_size),
	    ("block size", config.block_size),
	    ("associativity", config.associativity),
	] {
	    if value == 0 {
		return Err(ConfigError::NonPositive { name });
	    }
	}
	for (name, value) in [
	    ("main memory size", config.memory_size),
	    ("cache size", config.cache_size),
	    ("block size", config.block_size),
	] {
	    if !value.is_power_of_two() {
		return Err(ConfigError::NotPowerOfTwo { name, value });
	    }
	}

	if config.cache_size > config.memory_size {
	    return Err(ConfigError::CacheExceedsMemory {
		cache_size: config.cache_size,
		memory_size: config.memory_size,
	    });
	}

	let set_bytes = config.block_size.checked_mul(config.associativity);
	let num_sets = match set_bytes {
	    Some(bytes) if config.cache_size % bytes == 0 => config.cache_size / bytes,
	    _ => {
		return Err(ConfigError::Indivisible {
		    cache_size: config.cache_size,
		    block_size: config.block_size,
		    associativity: config.associativity,
		});
	    }
	};

	// A divisor of a power of two is itself a power of two, so every log below is exact.
	let address_bits = config.memory_size.ilog2();
	let offset_bits = config.block_size.ilog2();
	let index_bits = num_sets.ilog2();
	let tag_bits = address_bits
	    .checked_sub(offset_bits + index_bits)
	    .ok_or(ConfigError::NegativeTagBits {
		address_bits,
		offset_bits,
		index_bits,
	    })?;

	let num_lines = config.cache_size / config.block_size;
	if num_lines > MAX_LINES {
	    return Err(ConfigError::TooManyLines {
		num_lines,
		max: MAX_LINES,
	    });
	}
	// num_lines <= 2^24 and tag_bits < 64, so the product fits
	let tag_storage = (u64::from(tag_bits) * num_lines) / 8;
	let valid_storage = num_lines / 8;
	let dirty_storage = valid_storage;

	debug!(
	    "Geometry: {} address bits = {} tag + {} index + {} offset, {} lines in {} sets",
	    address_bits,
	    tag_bits,
	    index_bits,
	    offset_bits,
	    num_lines,
	    num_sets,
	);

	Ok(Self {
	    address_bits,
	    offset_bits,
	    index_bits,
	    tag_bits,
	    block_size: config.block_size,
	    associativity: config.associativity as usize,
	    num_lines: num_lines as usize,
	    num_sets: num_sets as usize,
	    cache_size: config.cache_size,
	    tag_storage,
	    valid_storage,
	    dirty_storage,
	})
    }

    pub fn address_bits(&self) -> u32 {
	self.address_bits
    }

    pub fn offset_bits(&self) -> u32 {
	self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
	self.index_bits
    }

    pub fn tag_bits(&self) -> u32 {
	self.tag_bits
    }

    pub fn associativity(&self) -> usize {
	self.associativity
    }

    pub fn num_lines(&self) -> usize {
	self.num_lines
    }

    pub fn num_sets(&self) -> usize {
	self.num_sets
    }

    /// Main memory block holding `address`.
    pub fn block_number(&self, address: u64) -> u64 {
	address / self.block_size
    }

    pub fn set_of_block(&self, block_number: u64) -> usize {
	(block_number % self.num_sets as u64) as usize
    }

    pub fn tag_of_block(&self, block_number: u64) -> u64 {
	block_number / self.num_sets as u64
    }

    /// Set that owns cache line `line`.
    pub fn set_of_line(&self, line: usize) -> usize {
	line / self.associativity
    }

    /// Contiguous line numbers belonging to `set`.
    pub fn set_lines(&self, set: usize) -> Range<usize> {
	let first = set * self.associativity;
	first..first + self.associativity
    }

    /// Bytes of tag storage across all lines.
    pub fn tag_storage(&self) -> u64 {
	self.tag_storage
    }

    pub fn valid_storage(&self) -> u64 {
	self.valid_storage
    }

    pub fn dirty_storage(&self) -> u64 {
	self.dirty_storage
    }

    /// Data plus tag, valid and dirty storage (in Bytes).
    pub fn total_size(&self) -> u64 {
	self.cache_size + self.tag_storage + self.valid_storage + self.dirty_storage
    }
}
