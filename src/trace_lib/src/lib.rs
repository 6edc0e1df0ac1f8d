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
    fs,
    path::Path,
    str::FromStr,
};
use thiserror::Error;

//==================================================================================================
// Enum
//==================================================================================================
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

#[derive(Debug, Error)]
pub enum TraceFormatError {
    #[error("trace is empty (expected the number of memory references first)")]
    MissingCount,

    #[error("invalid number of memory references '{0}'")]
    InvalidCount(String),

    #[error("reference {index}: unknown operation '{token}' (expected R or W)")]
    UnknownOperation { index: usize, token: String },

    #[error("reference {index}: missing address")]
    MissingAddress { index: usize },

    #[error("reference {index}: invalid address '{token}'")]
    InvalidAddress { index: usize, token: String },

    #[error("reference {index}: address {address} is outside main memory ({memory_size} bytes)")]
    AddressOutOfRange {
	index		: usize,
	address		: u64,
	memory_size	: u64,
    },

    #[error("trace declares {declared} references but contains {found}")]
    CountMismatch { declared: usize, found: usize },

    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
}

//==================================================================================================
// Structures
//==================================================================================================
/// Represents a single memory reference issued by the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRef
{
    operation	: Operation,
    address	: u64,
}

/// An ordered list of memory references, in issue order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    refs	: Vec<MemRef>,
}

//==================================================================================================
// Implementations
//==================================================================================================
impl Operation {
    pub fn is_write(&self) -> bool {
	matches!(self, Operation::Write)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
	match s.to_ascii_lowercase().as_str() {
	    "r" | "read" => Ok(Operation::Read),
	    "w" | "write" => Ok(Operation::Write),
	    _ => Err(s.to_string()),
	}
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Operation::Read => write!(f, "R"),
	    Operation::Write => write!(f, "W"),
	}
    }
}

impl MemRef {
    pub fn new(operation: Operation, address: u64) -> Self {
	Self {
	    operation,
	    address,
	}
    }

    pub fn read(address: u64) -> Self {
	Self::new(Operation::Read, address)
    }

    pub fn write(address: u64) -> Self {
	Self::new(Operation::Write, address)
    }

    pub fn memref_operation(&self) -> Operation {
	self.operation
    }

    pub fn memref_address(&self) -> u64 {
	self.address
    }
}

impl Trace {
    pub fn new(refs: Vec<MemRef>) -> Self {
	Self { refs }
    }

    /// Parses a trace in text form: the number of references, followed by that many
    /// `<R|W> <address>` records. Every address must lie below `memory_size`.
    ///
    /// # Returns
    ///
    /// * `Ok(Trace)`              - with exactly the declared number of references
    /// * `Err(TraceFormatError)`  - on the first malformed record, or on a count mismatch
    pub fn parse(text: &str, memory_size: u64) -> Result<Self, TraceFormatError> {
	let mut tokens = text.split_whitespace();

	let count_token = tokens.next().ok_or(TraceFormatError::MissingCount)?;
	let declared = count_token
	    .parse::<usize>()
	    .map_err(|_| TraceFormatError::InvalidCount(count_token.to_string()))?;

	let mut refs: Vec<MemRef> = Vec::new();
	while let Some(op_token) = tokens.next() {
	    let index = refs.len();
	    let operation = op_token
		.parse::<Operation>()
		.map_err(|token| TraceFormatError::UnknownOperation { index, token })?;

	    let addr_token = tokens.next().ok_or(TraceFormatError::MissingAddress { index })?;
	    let address = addr_token
		.parse::<u64>()
		.map_err(|_| TraceFormatError::InvalidAddress {
		    index,
		    token: addr_token.to_string(),
		})?;
	    if address >= memory_size {
		return Err(TraceFormatError::AddressOutOfRange {
		    index,
		    address,
		    memory_size,
		});
	    }

	    refs.push(MemRef::new(operation, address));
	}

	if refs.len() != declared {
	    return Err(TraceFormatError::CountMismatch {
		declared,
		found: refs.len(),
	    });
	}

	debug!("Parsed trace with {} references", refs.len());
	Ok(Self { refs })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, memory_size: u64) -> Result<Self, TraceFormatError> {
	let text = fs::read_to_string(path.as_ref())?;
	debug!("Loading trace from {}", path.as_ref().display());
	Self::parse(&text, memory_size)
    }

    pub fn trace_len(&self) -> usize {
	self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
	self.refs.is_empty()
    }

    pub fn trace_refs(&self) -> &[MemRef] {
	&self.refs
    }
}
