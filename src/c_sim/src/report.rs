//==================================================================================================
// Imports
//==================================================================================================
use cache_lib::{Cache, CacheLine};
use geometry_lib::Geometry;
use sim_lib::ReferenceResult;
use stats_lib::HitStats;
use std::{
    io::{self, Write},
    ops::Range,
};

//==================================================================================================
// Constants
//==================================================================================================
const RULE: &str = "______________________________________________________________________________________";

//==================================================================================================
// Functions
//==================================================================================================
pub fn print_geometry<W: Write>(out: &mut W, geometry: &Geometry) -> io::Result<()> {
    writeln!(out, "Total address lines required: {}", geometry.address_bits())?;
    writeln!(out, "Number of bits for offset: {}", geometry.offset_bits())?;
    writeln!(out, "Number of bits for index: {}", geometry.index_bits())?;
    writeln!(out, "Number of bits for tag: {}", geometry.tag_bits())?;
    writeln!(out, "Total cache size required: {} bytes", geometry.total_size())
}

/// Main memory table: one row per reference.
pub fn print_references<W: Write>(out: &mut W, results: &[ReferenceResult]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
	out,
	"{:<22}{:<12}{:<12}{:<12}{}",
	"main memory address", "mm blk#", "cm set#", "cm blk#", "hit/miss"
    )?;
    writeln!(out, "{}", RULE)?;
    for result in results {
	writeln!(
	    out,
	    "{:<22}{:<12}{:<12}{:<12}{}",
	    result.address,
	    result.block,
	    result.set,
	    line_range(&result.lines),
	    result.outcome,
	)?;
    }
    Ok(())
}

/// Final status of every cache line.
pub fn print_cache<W: Write>(out: &mut W, cache: &Cache) -> io::Result<()> {
    let tag_bits = cache.cache_geometry().tag_bits() as usize;

    writeln!(out)?;
    writeln!(out, "FINAL STATUS OF THE CACHE:")?;
    writeln!(
	out,
	"{:<12}{:<12}{:<12}{:<16}{}",
	"Cache blk#", "dirty bit", "valid bit", "tag", "Data"
    )?;
    writeln!(out, "{}", RULE)?;
    for line in cache.cache_lines() {
	writeln!(
	    out,
	    "{:<12}{:<12}{:<12}{:<16}{}",
	    line.line_number(),
	    line.line_dirty().as_flag(),
	    u8::from(line.line_valid()),
	    tag_field(line, tag_bits),
	    data_field(line),
	)?;
    }
    Ok(())
}

pub fn print_hit_rates<W: Write>(out: &mut W, stats: &HitStats) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Actual Hit Rate = {}", stats.achieved)?;
    writeln!(out, "Best possible hit rate = {}", stats.best_possible)
}

fn line_range(lines: &Range<usize>) -> String {
    match lines.len() {
	1 => lines.start.to_string(),
	_ => format!("{}-{}", lines.start, lines.end - 1),
    }
}

// Fixed width binary, or all X's for a line that was never filled
fn tag_field(line: &CacheLine, tag_bits: usize) -> String {
    match line.line_tag() {
	Some(_) if tag_bits == 0 => String::new(),
	Some(tag) => format!("{:0width$b}", tag, width = tag_bits),
	None => "X".repeat(tag_bits),
    }
}

fn data_field(line: &CacheLine) -> String {
    match line.line_block() {
	Some(block) => format!("mm blk #{}", block),
	None => "mm blk #?".to_string(),
    }
}
