//==================================================================================================
// Configuration
//==================================================================================================
#![deny(clippy::all)]
//==================================================================================================
// Imports
//==================================================================================================
use geometry_lib::{
    Geometry,
    ReplacementPolicy,
    WritePolicy,
};
use log::debug;
use std::collections::VecDeque;

//==================================================================================================
// Enum
//==================================================================================================
/// Dirty bit of a cache line. Write-through caches never hold stale data, so the bit is not
/// tracked there at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtyState {
    Clean,
    Dirty,
    NotApplicable,
}

//==================================================================================================
// Structures
//==================================================================================================
/// Represents a Cache Line (or Block)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    line_number	: usize,
    line_set	: usize,
    line_valid	: bool,
    line_dirty	: DirtyState,
    // `None` until the line is first filled
    line_tag	: Option<u64>,
    line_block	: Option<u64>,
}

/// Replacement bookkeeping of one set.
#[derive(Clone, Debug)]
struct SetState {
    // Line numbers, least recently used at the front
    lru_order	: VecDeque<usize>,
    // Line to be replaced next under FIFO
    fifo_next	: usize,
}

/// Represents a Cache instance.
///
/// Lines are stored as one contiguous sequence; set `s` owns lines
/// `s * associativity .. (s + 1) * associativity`.
#[derive(Clone, Debug)]
pub struct Cache {
    geometry		: Geometry,
    replacement		: ReplacementPolicy,
    write		: WritePolicy,

    cache_lines		: Vec<CacheLine>,
    cache_sets		: Vec<SetState>,
}

//==================================================================================================
// Implementations
//==================================================================================================
impl DirtyState {
    /// Single-character flag used in cache dumps.
    pub fn as_flag(&self) -> char {
	match self {
	    DirtyState::Clean => '0',
	    DirtyState::Dirty => '1',
	    DirtyState::NotApplicable => 'X',
	}
    }
}

impl CacheLine {
    fn new(line_number: usize, line_set: usize, write: WritePolicy) -> Self {
	let line_dirty = match write {
	    WritePolicy::WriteBack => DirtyState::Clean,
	    WritePolicy::WriteThrough => DirtyState::NotApplicable,
	};

	Self {
	    line_number,
	    line_set,
	    line_valid: false,
	    line_dirty,
	    line_tag: None,
	    line_block: None,
	}
    }

    pub fn line_number(&self) -> usize {
	self.line_number
    }

    pub fn line_set(&self) -> usize {
	self.line_set
    }

    pub fn line_valid(&self) -> bool {
	self.line_valid
    }

    pub fn line_dirty(&self) -> DirtyState {
	self.line_dirty
    }

    pub fn line_tag(&self) -> Option<u64> {
	self.line_tag
    }

    /// Main memory block currently held by the line.
    pub fn line_block(&self) -> Option<u64> {
	self.line_block
    }
}

impl Cache {
    /// Creates an empty cache: every line invalid, LRU order ascending and FIFO pointing at the
    /// first line of each set.
    pub fn new(
	geometry	: &Geometry,
	replacement	: ReplacementPolicy,
	write		: WritePolicy,
    ) -> Self {
	debug!(
	    "Creating new Cache ({} lines, {}-way, {}, {})",
	    geometry.num_lines(),
	    geometry.associativity(),
	    replacement,
	    write,
	);

	let cache_lines: Vec<CacheLine> = (0..geometry.num_lines())
	    .map(|line| CacheLine::new(line, geometry.set_of_line(line), write))
	    .collect();

	let cache_sets: Vec<SetState> = (0..geometry.num_sets())
	    .map(|set| {
		let lines = geometry.set_lines(set);
		SetState {
		    fifo_next: lines.start,
		    lru_order: lines.collect(),
		}
	    })
	    .collect();

	Self {
	    geometry: *geometry,
	    replacement,
	    write,
	    cache_lines,
	    cache_sets,
	}
    }

    /// Returns the valid line of `set` holding `tag`, if any.
    pub fn cache_lookup(&self, set: usize, tag: u64) -> Option<usize> {
	self.geometry
	    .set_lines(set)
	    .find(|&line| {
		let line = &self.cache_lines[line];
		line.line_valid && line.line_tag == Some(tag)
	    })
    }

    /// Returns the lowest-numbered invalid line of `set`.
    pub fn cache_find_free_slot(&self, set: usize) -> Option<usize> {
	self.geometry
	    .set_lines(set)
	    .find(|&line| !self.cache_lines[line].line_valid)
    }

    /// Line to be overwritten when `set` is full.
    pub fn cache_eviction_target(&self, set: usize) -> usize {
	let state = &self.cache_sets[set];
	match self.replacement {
	    ReplacementPolicy::Lru => match state.lru_order.front() {
		Some(&line) => line,
		None => unreachable!("every set holds at least one line"),
	    },
	    ReplacementPolicy::Fifo => state.fifo_next,
	}
    }

    /// Loads main memory block `block` with `tag` into `line`, discarding whatever it held.
    pub fn cache_fill(&mut self, line: usize, tag: u64, block: u64, is_write: bool) {
	let write = self.write;
	let entry = &mut self.cache_lines[line];

	if let (true, Some(evicted)) = (entry.line_valid, entry.line_block) {
	    debug!(
		"[Cache] Evicting mm blk {} from line {} ({:?})",
		evicted,
		line,
		entry.line_dirty,
	    );
	}

	entry.line_valid = true;
	entry.line_tag = Some(tag);
	entry.line_block = Some(block);
	entry.line_dirty = match write {
	    WritePolicy::WriteBack if is_write => DirtyState::Dirty,
	    WritePolicy::WriteBack => DirtyState::Clean,
	    WritePolicy::WriteThrough => DirtyState::NotApplicable,
	};
    }

    /// Applies the write policy to a line that was hit.
    pub fn cache_mark_hit(&mut self, line: usize, is_write: bool) {
	let entry = &mut self.cache_lines[line];
	match self.write {
	    WritePolicy::WriteBack => {
		if is_write {
		    entry.line_dirty = DirtyState::Dirty;
		}
	    }
	    WritePolicy::WriteThrough => entry.line_dirty = DirtyState::NotApplicable,
	}
    }

    /// Moves `line` to the most recently used end of `set`'s LRU order. No-op under FIFO.
    pub fn cache_touch(&mut self, line: usize, set: usize) {
	if self.replacement != ReplacementPolicy::Lru {
	    return;
	}

	let usage_queue = &mut self.cache_sets[set].lru_order;
	if let Some(pos) = usage_queue.iter().position(|&l| l == line) {
	    usage_queue.remove(pos);
	}
	usage_queue.push_back(line);
    }

    /// Points `set`'s FIFO marker at the next line of the set, wrapping around.
    pub fn cache_advance_fifo(&mut self, set: usize) {
	let lines = self.geometry.set_lines(set);
	let state = &mut self.cache_sets[set];
	state.fifo_next = if state.fifo_next + 1 >= lines.end {
	    lines.start
	} else {
	    state.fifo_next + 1
	};
    }

    pub fn cache_lines(&self) -> &[CacheLine] {
	&self.cache_lines
    }

    pub fn cache_line(&self, line: usize) -> &CacheLine {
	&self.cache_lines[line]
    }

    /// LRU order of `set`, least recently used first.
    pub fn cache_lru_order(&self, set: usize) -> Vec<usize> {
	self.cache_sets[set].lru_order.iter().copied().collect()
    }

    pub fn cache_fifo_next(&self, set: usize) -> usize {
	self.cache_sets[set].fifo_next
    }

    pub fn cache_geometry(&self) -> &Geometry {
	&self.geometry
    }
}

//==================================================================================================
// Tests
//==================================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use geometry_lib::Config;

    // 8 lines, 4-way, 2 sets
    fn new_cache(replacement: ReplacementPolicy, write: WritePolicy) -> Cache {
	let config = Config {
	    memory_size: 1024,
	    cache_size: 128,
	    block_size: 16,
	    associativity: 4,
	    replacement,
	    write,
	};
	Cache::new(&Geometry::new(&config).unwrap(), replacement, write)
    }

    #[test]
    fn starts_empty() {
	let cache = new_cache(ReplacementPolicy::Lru, WritePolicy::WriteBack);
	assert_eq!(cache.cache_lines().len(), 8);
	for line in cache.cache_lines() {
	    assert!(!line.line_valid());
	    assert_eq!(line.line_tag(), None);
	    assert_eq!(line.line_dirty(), DirtyState::Clean);
	    assert_eq!(line.line_set(), line.line_number() / 4);
	}
	assert_eq!(cache.cache_lru_order(1), vec![4, 5, 6, 7]);
	assert_eq!(cache.cache_fifo_next(1), 4);

	let cache = new_cache(ReplacementPolicy::Fifo, WritePolicy::WriteThrough);
	assert!(cache
	    .cache_lines()
	    .iter()
	    .all(|line| line.line_dirty() == DirtyState::NotApplicable));
    }

    #[test]
    fn lookup_only_scans_its_set() {
	let mut cache = new_cache(ReplacementPolicy::Lru, WritePolicy::WriteBack);
	cache.cache_fill(5, 3, 7, false);
	assert_eq!(cache.cache_lookup(1, 3), Some(5));
	assert_eq!(cache.cache_lookup(0, 3), None);
	assert_eq!(cache.cache_lookup(1, 2), None);
    }

    #[test]
    fn free_slots_in_ascending_order() {
	let mut cache = new_cache(ReplacementPolicy::Lru, WritePolicy::WriteBack);
	assert_eq!(cache.cache_find_free_slot(0), Some(0));
	cache.cache_fill(0, 1, 2, false);
	cache.cache_fill(2, 1, 2, false);
	assert_eq!(cache.cache_find_free_slot(0), Some(1));
	cache.cache_fill(1, 1, 2, false);
	cache.cache_fill(3, 1, 2, false);
	assert_eq!(cache.cache_find_free_slot(0), None);
	assert_eq!(cache.cache_find_free_slot(1), Some(4));
    }

    #[test]
    fn touch_moves_line_to_most_recent() {
	let mut cache = new_cache(ReplacementPolicy::Lru, WritePolicy::WriteBack);
	cache.cache_touch(1, 0);
	assert_eq!(cache.cache_lru_order(0), vec![0, 2, 3, 1]);
	cache.cache_touch(0, 0);
	assert_eq!(cache.cache_lru_order(0), vec![2, 3, 1, 0]);
	cache.cache_touch(0, 0);
	assert_eq!(cache.cache_lru_order(0), vec![2, 3, 1, 0]);
	assert_eq!(cache.cache_eviction_target(0), 2);
    }

    #[test]
    fn touch_is_ignored_under_fifo() {
	let mut cache = new_cache(ReplacementPolicy::Fifo, WritePolicy::WriteBack);
	cache.cache_touch(1, 0);
	assert_eq!(cache.cache_lru_order(0), vec![0, 1, 2, 3]);
	assert_eq!(cache.cache_eviction_target(0), 0);
    }

    #[test]
    fn fifo_pointer_wraps_within_set() {
	let mut cache = new_cache(ReplacementPolicy::Fifo, WritePolicy::WriteBack);
	for expected in [5, 6, 7, 4, 5] {
	    cache.cache_advance_fifo(1);
	    assert_eq!(cache.cache_fifo_next(1), expected);
	    assert_eq!(cache.cache_eviction_target(1), expected);
	}
    }

    #[test]
    fn write_back_dirty_bit() {
	let mut cache = new_cache(ReplacementPolicy::Lru, WritePolicy::WriteBack);
	cache.cache_fill(0, 1, 2, true);
	assert_eq!(cache.cache_line(0).line_dirty(), DirtyState::Dirty);
	cache.cache_mark_hit(0, false);
	assert_eq!(cache.cache_line(0).line_dirty(), DirtyState::Dirty);

	// Refill discards the old contents
	cache.cache_fill(0, 4, 8, false);
	assert_eq!(cache.cache_line(0).line_dirty(), DirtyState::Clean);
	assert_eq!(cache.cache_line(0).line_block(), Some(8));
	cache.cache_mark_hit(0, true);
	assert_eq!(cache.cache_line(0).line_dirty(), DirtyState::Dirty);
    }

    #[test]
    fn write_through_never_dirty() {
	let mut cache = new_cache(ReplacementPolicy::Lru, WritePolicy::WriteThrough);
	cache.cache_fill(0, 1, 2, true);
	cache.cache_mark_hit(0, true);
	assert_eq!(cache.cache_line(0).line_dirty(), DirtyState::NotApplicable);
	assert_eq!(cache.cache_line(0).line_dirty().as_flag(), 'X');
    }
}
