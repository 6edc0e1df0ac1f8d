//==================================================================================================
// Imports
//==================================================================================================
use ::anyhow::{Context, Result};
use geometry_lib::{
    Config,
    ReplacementPolicy,
    WritePolicy,
};
use std::path::{Path, PathBuf};

//==================================================================================================
// Structures
//==================================================================================================
pub struct Args {
    /// Main memory size (in Bytes)
    memory_size: u64,
    /// Cache size (in Bytes)
    cache_size: u64,
    /// Cache block/line size (in Bytes)
    block_size: u64,
    /// Degree of set-associativity (n for an n-way set-associative mapping)
    associativity: u64,
    /// Which replacement policy the cache will be using
    replacement: ReplacementPolicy,
    /// Which write policy the cache will be using
    write: WritePolicy,
    /// File holding the memory references generated by the CPU
    trace: Option<PathBuf>,
    /// Prompt for the configuration instead of reading it from the command line
    interactive: bool,
}

//==================================================================================================
// Implementation
//==================================================================================================
impl Args {
    const OPT_HELP: &'static str = "--help";
    const OPT_MEMORY: &'static str = "--memory";
    const OPT_CACHE: &'static str = "--cache";
    const OPT_BLOCK: &'static str = "--block";
    const OPT_ASSOC: &'static str = "--assoc";
    const OPT_REPLACEMENT: &'static str = "--replacement";
    const OPT_WRITE: &'static str = "--write";
    const OPT_TRACE: &'static str = "--trace";
    const OPT_INTERACTIVE: &'static str = "--interactive";

    pub fn parse(args: Vec<String>) -> Result<Self> {
	let mut memory_size: u64 = 1024;
	let mut cache_size: u64 = 64;
	let mut block_size: u64 = 16;
	let mut associativity: u64 = 2;
	let mut replacement: ReplacementPolicy = ReplacementPolicy::Lru;
	let mut write: WritePolicy = WritePolicy::WriteBack;
	let mut trace: Option<PathBuf> = None;
	let mut interactive: bool = false;

	let program_name = args.first().map(String::as_str).unwrap_or("c_sim");
	let mut i: usize = 1;
	while i < args.len() {
	    let option = args[i].as_str();
	    match option {
		Self::OPT_HELP => {
		    Self::usage(program_name);
		    return Err(anyhow::anyhow!("wrong usage"));
		}
		Self::OPT_INTERACTIVE => {
		    interactive = true;
		}
		Self::OPT_MEMORY => {
		    i += 1;
		    memory_size = Self::number(&args, i, option)?;
		}
		Self::OPT_CACHE => {
		    i += 1;
		    cache_size = Self::number(&args, i, option)?;
		}
		Self::OPT_BLOCK => {
		    i += 1;
		    block_size = Self::number(&args, i, option)?;
		}
		Self::OPT_ASSOC => {
		    i += 1;
		    associativity = Self::number(&args, i, option)?;
		}
		Self::OPT_REPLACEMENT => {
		    i += 1;
		    replacement = Self::value(&args, i, option)?.parse()?;
		}
		Self::OPT_WRITE => {
		    i += 1;
		    write = Self::value(&args, i, option)?.parse()?;
		}
		Self::OPT_TRACE => {
		    i += 1;
		    trace = Some(PathBuf::from(Self::value(&args, i, option)?));
		}
		&_ => {
		    Self::usage(program_name);
		    return Err(anyhow::anyhow!("invalid argument '{}'", option));
		}
	    }

	    i += 1;
	}

	if trace.is_none() && !interactive {
	    Self::usage(program_name);
	    return Err(anyhow::anyhow!("missing {} <file>", Self::OPT_TRACE));
	}

	Ok(Self {
	    memory_size,
	    cache_size,
	    block_size,
	    associativity,
	    replacement,
	    write,
	    trace,
	    interactive,
	})
    }

    fn value<'a>(args: &'a [String], i: usize, option: &str) -> Result<&'a str> {
	args.get(i)
	    .map(String::as_str)
	    .ok_or_else(|| anyhow::anyhow!("missing value for {}", option))
    }

    fn number(args: &[String], i: usize, option: &str) -> Result<u64> {
	let value = Self::value(args, i, option)?;
	value
	    .parse::<u64>()
	    .with_context(|| format!("invalid value '{}' for {}", value, option))
    }

    pub fn usage(program_name: &str) {
	eprintln!(
	    "Usage: {} [{} <bytes> {} <bytes> {} <bytes> {} <n> {} <['LRU', 'FIFO']> {} <['write-back', 'write-through']>] {} <file>",
	    program_name,
	    Self::OPT_MEMORY,
	    Self::OPT_CACHE,
	    Self::OPT_BLOCK,
	    Self::OPT_ASSOC,
	    Self::OPT_REPLACEMENT,
	    Self::OPT_WRITE,
	    Self::OPT_TRACE,
	);
	eprintln!("       {} {}", program_name, Self::OPT_INTERACTIVE);
    }

    pub fn config(&self) -> Config {
	Config {
	    memory_size: self.memory_size,
	    cache_size: self.cache_size,
	    block_size: self.block_size,
	    associativity: self.associativity,
	    replacement: self.replacement,
	    write: self.write,
	}
    }

    pub fn trace(&self) -> Option<&Path> {
	self.trace.as_deref()
    }

    pub fn interactive(&self) -> bool {
	self.interactive
    }
}
