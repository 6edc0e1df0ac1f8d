//==================================================================================================
// Imports
//==================================================================================================
use ::anyhow::{Context, Result};
use geometry_lib::Config;
use std::{
    io::{BufRead, Write},
    path::PathBuf,
    str::FromStr,
};

//==================================================================================================
// Functions
//==================================================================================================
/// Prints `question` and reads one trimmed line of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
	return Err(anyhow::anyhow!("unexpected end of input"));
    }
    Ok(line.trim().to_string())
}

fn prompt_parse<R, W, T>(input: &mut R, out: &mut W, question: &str) -> Result<T>
where
    R: BufRead,
    W: Write,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let answer = prompt(input, out, question)?;
    answer
	.parse::<T>()
	.with_context(|| format!("invalid answer '{}'", answer))
}

/// Asks for the cache configuration and the trace file, one value per line.
pub fn read_config<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<(Config, PathBuf)> {
    let memory_size = prompt_parse(input, out, "Enter the size of main memory in bytes: ")?;
    let cache_size = prompt_parse(input, out, "Enter the size of the cache in bytes: ")?;
    let block_size = prompt_parse(input, out, "Enter the cache block/line size: ")?;
    let associativity = prompt_parse(
	input,
	out,
	"Enter the degree of set-associativity (input n for an n-way set-associative mapping): ",
    )?;
    let replacement = prompt_parse(input, out, "Enter the replacement policy (L = LRU , F = FIFO) : ")?;
    let write = prompt_parse(input, out, "Enter the write policy (B = write-back , T = write-through) : ")?;
    let trace = prompt(
	input,
	out,
	"Enter the name of the input file containing the list of memory references generated by the CPU: ",
    )?;

    Ok((
	Config {
	    memory_size,
	    cache_size,
	    block_size,
	    associativity,
	    replacement,
	    write,
	},
	PathBuf::from(trace),
    ))
}

/// Asks whether to run another simulation. Only `y` continues.
pub fn ask_continue<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<bool> {
    let answer = prompt(input, out, "\nContinue? (y = yes, n = no): ")?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

//==================================================================================================
// Tests
//==================================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use geometry_lib::{ReplacementPolicy, WritePolicy};
    use std::io::Cursor;

    #[test]
    fn reads_answers_in_order() {
	let mut input = Cursor::new("1024\n64\n16\n2\nF\nT\nrefs.txt\n");
	let mut out: Vec<u8> = Vec::new();
	let (config, trace) = read_config(&mut input, &mut out).unwrap();
	assert_eq!(
	    config,
	    Config {
		memory_size: 1024,
		cache_size: 64,
		block_size: 16,
		associativity: 2,
		replacement: ReplacementPolicy::Fifo,
		write: WritePolicy::WriteThrough,
	    }
	);
	assert_eq!(trace, PathBuf::from("refs.txt"));
	assert!(String::from_utf8(out).unwrap().starts_with("Enter the size of main memory in bytes: "));
    }

    #[test]
    fn rejects_bad_answers() {
	let mut out: Vec<u8> = Vec::new();
	assert!(read_config(&mut Cursor::new("1024\nlots\n"), &mut out).is_err());
	assert!(read_config(&mut Cursor::new("1024\n64\n16\n2\nQ\n"), &mut out).is_err());
	assert!(read_config(&mut Cursor::new("1024\n64\n"), &mut out).is_err());
    }

    #[test]
    fn continue_only_on_yes() {
	let mut out: Vec<u8> = Vec::new();
	assert!(ask_continue(&mut Cursor::new("y\n"), &mut out).unwrap());
	assert!(!ask_continue(&mut Cursor::new("n\n"), &mut out).unwrap());
	assert!(ask_continue(&mut Cursor::new(""), &mut out).is_err());
    }
}
