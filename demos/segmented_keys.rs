//! Walks a small cache through misses, promotions, demotions and evictions,
//! printing both segments after every lookup.

use std::fmt;

use pooled_slru::{CacheBuilder, CacheEntry};

// Rendered tile, keyed by its coordinates
struct Tile {
	x: i32,
	y: i32,
	hits: u32,
}

impl CacheEntry<(i32, i32)> for Tile {
	fn from_key(&(x, y): &(i32, i32)) -> Self {
		println!("  render tile ({x}, {y})");
		Self {
			x,
			y,
			hits: 0,
		}
	}

	fn matches(&self, &(x, y): &(i32, i32)) -> bool {
		self.x == x && self.y == y
	}
}

impl fmt::Display for Tile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({},{})x{}", self.x, self.y, self.hits)
	}
}

fn main() {
	// Two proven tiles, three on probation
	let mut cache = CacheBuilder::new(2)
		.regular_capacity(3)
		.build_pooled::<(i32, i32), Tile>()
		.expect("pool layout");

	let requests = [(0, 0), (0, 1), (0, 0), (1, 1), (0, 1), (2, 2), (1, 1), (3, 3), (4, 4), (5, 5)];

	for key in requests {
		println!("get {key:?}");
		match cache.get(&key) {
			Ok(tile) => tile.hits += 1,
			Err(e) => println!("  failed: {e}"),
		}
		print!("{cache}");
	}

	let pool = cache.allocator().pool();
	println!("\npool slots in use: {} of {}", pool.in_use(), pool.capacity());
	for stats in pool.stats() {
		println!("  class {:>3} bytes: {}/{} used", stats.slot_size, stats.in_use, stats.slots);
	}
}
