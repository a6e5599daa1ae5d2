//! Fixed size-class memory pool.
//!
//! The arena is carved up once, at construction, into one contiguous region per
//! registered size class. A region for class `n` holds `block_size / n` slots of
//! exactly `n` bytes. Allocation only ever hands out a slot from the region whose
//! class matches the request exactly; there is no rounding up to a larger class.
//!
//! ```text
//!  arena
//!  +------------------+--+----------------------+--+------------------------+
//!  | class 8: 8 slots |pd| class 24: 2 slots    |pd| class 64: 1 slot       |
//!  +------------------+--+----------------------+--+------------------------+
//!  ^ region start                                   region starts are 16-aligned
//! ```
//!
//! Occupancy is kept in a bitmap with one bit per byte offset, so an allocation
//! carries no header and deallocation only needs the address.

use std::fmt;
use std::ops::Range;
use std::ptr::{self, NonNull};

use tracing::{debug, trace};

use crate::bitmap::OccupancyBitmap;
use crate::error::{AllocError, ConfigError};

/// Alignment of the arena base and of every size-class region.
///
/// Slots of class `n` start at `region_start + i * n`, so any type whose size is
/// `n` and whose alignment is at most this value lands on an aligned address.
pub const ARENA_ALIGN: usize = 16;

#[repr(C, align(16))]
#[derive(Clone, Copy)]
struct Chunk([u8; ARENA_ALIGN]);

/// One registered size class and the region it owns.
#[derive(Debug, Clone, Copy)]
struct SizeClass {
	/// Slot size in bytes.
	size: usize,
	/// Offset of the region within the arena.
	start: usize,
	/// Number of slots in the region.
	slots: usize,
}

impl SizeClass {
	fn region(&self) -> Range<usize> {
		self.start..self.start + self.slots * self.size
	}
}

/// Occupancy snapshot for a single size class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeClassStats {
	/// Slot size in bytes.
	pub slot_size: usize,
	/// Total number of slots.
	pub slots: usize,
	/// Slots currently allocated.
	pub in_use: usize,
	/// Byte range of the region within the arena.
	pub region: Range<usize>,
}

impl SizeClassStats {
	/// Slots still available.
	pub fn free(&self) -> usize {
		self.slots - self.in_use
	}
}

/// Builder for a [`SizeClassPool`].
///
/// # Example
///
/// ```
/// use pooled_slru::PoolBuilder;
///
/// let pool = PoolBuilder::new(4096)
///     .size_class(32)
///     .size_class(64)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.size_classes().collect::<Vec<_>>(), vec![32, 64]);
/// ```
#[derive(Debug, Clone)]
pub struct PoolBuilder {
	block_size: usize,
	sizes: Vec<usize>,
}

impl PoolBuilder {
	/// Start a pool where every class gets a budget of `block_size` bytes.
	pub fn new(block_size: usize) -> Self {
		Self {
			block_size,
			sizes: Vec::new(),
		}
	}

	/// Register a size class.
	pub fn size_class(mut self, size: usize) -> Self {
		self.sizes.push(size);
		self
	}

	/// Register several size classes at once.
	pub fn size_classes(mut self, sizes: impl IntoIterator<Item = usize>) -> Self {
		self.sizes.extend(sizes);
		self
	}

	/// Lay out the arena and build the pool.
	pub fn build(self) -> Result<SizeClassPool, ConfigError> {
		SizeClassPool::new(self.block_size, &self.sizes)
	}
}

/// Byte arena partitioned into fixed size-class regions.
///
/// Single-threaded by construction: the pool hands out raw addresses into
/// memory it owns and is neither `Send` nor `Sync`.
pub struct SizeClassPool {
	/// Base of the arena, obtained from a leaked `Box<[Chunk]>`.
	arena: NonNull<u8>,
	/// Number of chunks backing the arena, needed to free it.
	chunks: usize,
	/// Usable arena length in bytes.
	arena_len: usize,
	/// Per-class byte budget.
	block_size: usize,
	/// Registered classes, sorted ascending by size.
	classes: Vec<SizeClass>,
	/// One bit per arena byte offset.
	occupancy: OccupancyBitmap,
}

impl SizeClassPool {
	/// Create a pool where each class in `sizes` gets `block_size / size` slots.
	///
	/// Sizes are sorted and duplicates collapsed. Each region starts on an
	/// [`ARENA_ALIGN`] boundary.
	pub fn new(block_size: usize, sizes: &[usize]) -> Result<Self, ConfigError> {
		if sizes.is_empty() {
			return Err(ConfigError::NoSizeClasses);
		}
		if sizes.contains(&0) {
			return Err(ConfigError::ZeroSizeClass);
		}
		if block_size == 0 {
			return Err(ConfigError::ZeroBlockSize);
		}

		let mut sorted = sizes.to_vec();
		sorted.sort_unstable();
		sorted.dedup();

		let mut classes = Vec::with_capacity(sorted.len());
		let mut total: usize = 0;
		for size in sorted {
			let slots = block_size / size;
			// slots * size <= block_size, so only the running offset can overflow
			let region = total
				.checked_next_multiple_of(ARENA_ALIGN)
				.and_then(|start| start.checked_add(slots * size).map(|end| (start, end)));
			let Some((start, end)) = region else {
				return Err(ConfigError::ArenaTooLarge);
			};
			total = end;
			classes.push(SizeClass {
				size,
				start,
				slots,
			});
		}

		let chunks = total.div_ceil(ARENA_ALIGN);
		let mut storage = Vec::new();
		storage.try_reserve_exact(chunks).map_err(|_| ConfigError::ArenaTooLarge)?;
		storage.resize(chunks, Chunk([0; ARENA_ALIGN]));
		let raw = Box::into_raw(storage.into_boxed_slice()) as *mut Chunk as *mut u8;
		// SAFETY: Box::into_raw never returns null, even for an empty slice.
		let arena = unsafe { NonNull::new_unchecked(raw) };

		let occupancy = OccupancyBitmap::new(total);
		debug_assert_eq!(occupancy.len(), total);

		debug!(
			block_size,
			arena_len = total,
			classes = ?classes.iter().map(|c| (c.size, c.slots)).collect::<Vec<_>>(),
			"size class pool initialised"
		);

		Ok(Self {
			arena,
			chunks,
			arena_len: total,
			block_size,
			classes,
			occupancy,
		})
	}

	/// Start a [`PoolBuilder`].
	pub fn builder(block_size: usize) -> PoolBuilder {
		PoolBuilder::new(block_size)
	}

	/// Allocate one slot of exactly `size` bytes.
	///
	/// The lowest free slot of the matching class is returned. Fails with an
	/// out-of-memory error when no class equals `size` or the class is full.
	///
	/// # Runtime Complexity
	///
	/// O(log c) to find the class plus O(s) to scan its s slots.
	pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, AllocError> {
		let class = self.find_class(size).ok_or(AllocError::UnknownSizeClass {
			size,
		})?;
		let offset = self.find_free_slot(&class).ok_or(AllocError::SizeClassExhausted {
			size,
		})?;

		self.occupancy.set(offset);
		trace!(size, offset, "allocated slot");

		// SAFETY: `offset` lies inside a class region, which is inside the arena.
		Ok(unsafe { NonNull::new_unchecked(self.arena.as_ptr().add(offset)) })
	}

	/// Release the slot starting at `ptr`.
	///
	/// If `ptr` falls inside the arena the occupancy bit at its offset is cleared
	/// without checking that the offset is a slot start or that it was
	/// allocated. Pointers outside the arena are ignored. The caller is
	/// responsible for passing back exactly the address `allocate` returned.
	pub fn deallocate(&mut self, ptr: *const u8) {
		match self.offset_of(ptr) {
			Some(offset) => {
				self.occupancy.clear(offset);
				trace!(offset, "released slot");
			}
			None => trace!(?ptr, "deallocation target outside the arena ignored"),
		}
	}

	/// Whether `ptr` lies inside the arena.
	pub fn contains(&self, ptr: *const u8) -> bool {
		self.offset_of(ptr).is_some()
	}

	/// Per-class byte budget the pool was built with.
	pub fn block_size(&self) -> usize {
		self.block_size
	}

	/// Registered size classes in ascending order.
	pub fn size_classes(&self) -> impl Iterator<Item = usize> + '_ {
		self.classes.iter().map(|c| c.size)
	}

	/// Arena length in bytes, including inter-region padding.
	pub fn arena_len(&self) -> usize {
		self.arena_len
	}

	/// Total number of slots across all classes.
	pub fn capacity(&self) -> usize {
		self.classes.iter().map(|c| c.slots).sum()
	}

	/// Number of slots currently allocated.
	pub fn in_use(&self) -> usize {
		self.occupancy.count_ones()
	}

	/// Occupancy snapshot per class, in ascending class order.
	pub fn stats(&self) -> Vec<SizeClassStats> {
		self.classes
			.iter()
			.map(|class| SizeClassStats {
				slot_size: class.size,
				slots: class.slots,
				in_use: self.slot_offsets(class).filter(|&o| self.occupancy.is_set(o)).count(),
				region: class.region(),
			})
			.collect()
	}

	/// Exact-match lookup of the class for `size`.
	fn find_class(&self, size: usize) -> Option<SizeClass> {
		let idx = self.classes.binary_search_by_key(&size, |c| c.size).ok()?;
		Some(self.classes[idx])
	}

	/// First-fit scan of a class region.
	fn find_free_slot(&self, class: &SizeClass) -> Option<usize> {
		self.slot_offsets(class).find(|&offset| !self.occupancy.is_set(offset))
	}

	fn slot_offsets(&self, class: &SizeClass) -> impl Iterator<Item = usize> {
		let (start, size) = (class.start, class.size);
		(0..class.slots).map(move |i| start + i * size)
	}

	/// Offset of `ptr` from the arena base, if it is inside `[base, base + len)`.
	fn offset_of(&self, ptr: *const u8) -> Option<usize> {
		let base = self.arena.as_ptr() as usize;
		let offset = (ptr as usize).wrapping_sub(base);
		(offset < self.arena_len).then_some(offset)
	}

	#[cfg(test)]
	pub(crate) fn occupancy(&self) -> &OccupancyBitmap {
		&self.occupancy
	}
}

impl Drop for SizeClassPool {
	fn drop(&mut self) {
		let slice = ptr::slice_from_raw_parts_mut(self.arena.as_ptr() as *mut Chunk, self.chunks);
		// SAFETY: `arena` and `chunks` come from the boxed slice leaked in `new`.
		unsafe { drop(Box::from_raw(slice)) };
	}
}

impl fmt::Debug for SizeClassPool {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SizeClassPool")
			.field("block_size", &self.block_size)
			.field("arena_len", &self.arena_len)
			.field("classes", &self.classes)
			.field("in_use", &self.in_use())
			.finish()
	}
}
