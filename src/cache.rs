use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use tracing::{debug, trace};

use crate::alloc::{ObjectAllocator, PoolAllocator, PoolBox};
use crate::error::{AllocError, ConfigError};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::pool::SizeClassPool;
use crate::traits::CacheEntry;

/// Two-segment LRU cache whose entries live in allocator-managed storage.
///
/// # Segments
///
/// Entries are kept in two queues, each ordered from most to least recently
/// touched:
///
/// - **Regular**: every new entry starts here. Entries that age out of the
///   regular tail are destroyed through the allocator.
/// - **Priority**: an entry requested again while still in the regular segment
///   is promoted here. When the priority segment overflows, its tail is demoted
///   to the front of the regular segment rather than destroyed.
///
/// A burst of one-off lookups therefore only churns the regular segment and
/// cannot flush entries that have proven themselves by being reused.
///
/// # Allocation
///
/// Each [`get`](Self::get) performs at most one `create` (on a miss) and at most
/// one `destroy` (when the regular segment overflows). With a
/// [`PoolAllocator`] the entries are placed in the pool's size class equal to
/// `size_of::<E>()`.
///
/// # Example
///
/// ```
/// use std::fmt;
/// use pooled_slru::{CacheBuilder, CacheEntry};
///
/// struct Page {
///     id: u32,
/// }
///
/// impl CacheEntry<u32> for Page {
///     fn from_key(key: &u32) -> Self {
///         Self { id: *key }
///     }
///
///     fn matches(&self, key: &u32) -> bool {
///         self.id == *key
///     }
/// }
///
/// impl fmt::Display for Page {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}", self.id)
///     }
/// }
///
/// let mut cache = CacheBuilder::new(2).build_pooled::<u32, Page>().unwrap();
///
/// cache.get(&1).unwrap();
/// cache.get(&2).unwrap();
/// cache.get(&1).unwrap(); // promoted
///
/// assert_eq!(cache.to_string(), "Priority: 1\nRegular: 2\n");
/// ```
pub struct SegmentedCache<K: ?Sized, E, A = PoolAllocator>
where
	A: ObjectAllocator,
{
	/// Entries that earned promotion, most recent first
	priority: VecDeque<PoolBox<E>>,
	/// New and demoted entries, most recent first
	regular: VecDeque<PoolBox<E>>,
	max_top_size: usize,
	max_low_size: usize,
	alloc: A,
	#[cfg(feature = "metrics")]
	priority_hits: u64,
	#[cfg(feature = "metrics")]
	regular_hits: u64,
	#[cfg(feature = "metrics")]
	misses: u64,
	#[cfg(feature = "metrics")]
	demotions: u64,
	#[cfg(feature = "metrics")]
	evictions: u64,
	marker: PhantomData<fn(&K)>,
}

impl<K: ?Sized, E, A> SegmentedCache<K, E, A>
where
	E: CacheEntry<K>,
	A: ObjectAllocator,
{
	/// Create a cache where both segments hold up to `capacity` entries.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn new(capacity: usize, alloc: A) -> Self {
		Self::with_capacities(capacity, capacity, alloc)
	}

	/// Create a cache with independent segment capacities.
	///
	/// # Panics
	///
	/// Panics if either capacity is zero.
	pub fn with_capacities(max_top_size: usize, max_low_size: usize, alloc: A) -> Self {
		assert!(max_top_size > 0, "priority capacity must be greater than 0");
		assert!(max_low_size > 0, "regular capacity must be greater than 0");

		Self {
			priority: VecDeque::with_capacity(max_top_size + 1),
			regular: VecDeque::with_capacity(max_low_size + 1),
			max_top_size,
			max_low_size,
			alloc,
			#[cfg(feature = "metrics")]
			priority_hits: 0,
			#[cfg(feature = "metrics")]
			regular_hits: 0,
			#[cfg(feature = "metrics")]
			misses: 0,
			#[cfg(feature = "metrics")]
			demotions: 0,
			#[cfg(feature = "metrics")]
			evictions: 0,
			marker: PhantomData,
		}
	}

	/// Look up the entry for `key`, creating it on a miss.
	///
	/// - Found in the priority segment: moved to its front.
	/// - Found in the regular segment: promoted to the priority front. If the
	///   priority segment overflows, its tail is demoted to the regular front.
	/// - Not found: a new entry is built with [`CacheEntry::from_key`] and pushed
	///   to the regular front.
	///
	/// Whenever the regular segment exceeds its capacity, its tail is destroyed.
	///
	/// # Errors
	///
	/// Returns the allocator's error if a miss cannot obtain storage. The cache
	/// is left exactly as it was.
	///
	/// # Runtime Complexity
	///
	/// O(n) in the number of resident entries: both segments are scanned
	/// linearly with [`CacheEntry::matches`].
	pub fn get(&mut self, key: &K) -> Result<&mut E, AllocError> {
		if let Some(idx) = Self::position(&self.priority, key) {
			trace!(idx, "priority hit");
			#[cfg(feature = "metrics")]
			{
				self.priority_hits += 1;
			}
			Self::move_to_front(&mut self.priority, idx);
			return Ok(&mut *self.priority[0]);
		}

		if let Some(idx) = Self::position(&self.regular, key) {
			trace!(idx, "regular hit, promoting");
			#[cfg(feature = "metrics")]
			{
				self.regular_hits += 1;
			}
			if let Some(entry) = self.regular.remove(idx) {
				self.priority.push_front(entry);
			}
			self.check_priority();
			return Ok(&mut *self.priority[0]);
		}

		// SAFETY: the handle stays in a segment of this cache, which owns
		// `alloc`, until it is destroyed through that same `alloc`.
		let entry = unsafe { self.alloc.create_with(|| E::from_key(key)) }?;
		trace!(entry = %entry, "miss, created entry");
		#[cfg(feature = "metrics")]
		{
			self.misses += 1;
		}
		self.regular.push_front(entry);
		self.check_regular();
		Ok(&mut *self.regular[0])
	}

	/// Look up the entry for `key` without reordering or allocating.
	pub fn peek(&self, key: &K) -> Option<&E> {
		self.priority.iter().chain(self.regular.iter()).find(|e| e.matches(key)).map(|e| &**e)
	}

	/// Whether an entry for `key` is resident.
	pub fn contains(&self, key: &K) -> bool {
		self.peek(key).is_some()
	}

	/// Demote the priority tail if the priority segment overflowed.
	fn check_priority(&mut self) {
		if self.priority.len() > self.max_top_size {
			if let Some(entry) = self.priority.pop_back() {
				debug!(entry = %entry, "demoted priority tail");
				#[cfg(feature = "metrics")]
				{
					self.demotions += 1;
				}
				self.regular.push_front(entry);
				self.check_regular();
			}
		}
	}

	/// Destroy the regular tail if the regular segment overflowed.
	fn check_regular(&mut self) {
		if self.regular.len() > self.max_low_size {
			if let Some(entry) = self.regular.pop_back() {
				debug!(entry = %entry, "evicted regular tail");
				#[cfg(feature = "metrics")]
				{
					self.evictions += 1;
				}
				// SAFETY: every resident entry was created by `self.alloc`.
				unsafe { self.alloc.destroy(entry) };
			}
		}
	}

	fn position(queue: &VecDeque<PoolBox<E>>, key: &K) -> Option<usize> {
		queue.iter().position(|e| e.matches(key))
	}
}

impl<K: ?Sized, E, A> SegmentedCache<K, E, A>
where
	A: ObjectAllocator,
{
	/// Total number of resident entries across both segments.
	pub fn len(&self) -> usize {
		self.priority.len() + self.regular.len()
	}

	/// Whether the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of entries in the priority segment.
	pub fn priority_len(&self) -> usize {
		self.priority.len()
	}

	/// Number of entries in the regular segment.
	pub fn regular_len(&self) -> usize {
		self.regular.len()
	}

	/// Capacity of the priority segment.
	pub fn max_top_size(&self) -> usize {
		self.max_top_size
	}

	/// Capacity of the regular segment.
	pub fn max_low_size(&self) -> usize {
		self.max_low_size
	}

	/// Priority entries, most recently used first.
	pub fn priority(&self) -> impl Iterator<Item = &E> + '_ {
		self.priority.iter().map(|e| &**e)
	}

	/// Regular entries, most recently used first.
	pub fn regular(&self) -> impl Iterator<Item = &E> + '_ {
		self.regular.iter().map(|e| &**e)
	}

	/// The allocator backing the entries.
	pub fn allocator(&self) -> &A {
		&self.alloc
	}

	/// Snapshot of the lookup counters.
	#[cfg(feature = "metrics")]
	pub fn metrics(&self) -> CacheMetrics {
		CacheMetrics {
			priority_hits: self.priority_hits,
			regular_hits: self.regular_hits,
			misses: self.misses,
			demotions: self.demotions,
			evictions: self.evictions,
			priority_len: self.priority.len(),
			regular_len: self.regular.len(),
		}
	}

	fn move_to_front(queue: &mut VecDeque<PoolBox<E>>, idx: usize) {
		if idx != 0 {
			queue.make_contiguous()[..=idx].rotate_right(1);
		}
	}
}

impl<K: ?Sized, E> SegmentedCache<K, E, PoolAllocator>
where
	E: CacheEntry<K>,
{
	/// Create a cache over a freshly built [`SizeClassPool`].
	///
	/// `sizes` must include `size_of::<E>()` for lookups to be able to create
	/// entries.
	pub fn with_pool(
		capacity: usize,
		block_size: usize,
		sizes: &[usize],
	) -> Result<Self, ConfigError> {
		let pool = SizeClassPool::new(block_size, sizes)?;
		Ok(Self::new(capacity, PoolAllocator::new(pool)))
	}

	/// Slots of class `size_of::<E>()` needed so a miss never runs out of memory.
	///
	/// A miss allocates before the regular tail is released, so one slot beyond
	/// the combined segment capacity is required.
	pub fn required_slots(max_top_size: usize, max_low_size: usize) -> usize {
		max_top_size + max_low_size + 1
	}

	/// Byte budget for a single-class pool sized by [`required_slots`](Self::required_slots).
	pub fn required_block_size(max_top_size: usize, max_low_size: usize) -> usize {
		Self::required_slots(max_top_size, max_low_size) * mem::size_of::<E>()
	}
}

impl<K: ?Sized, E, A> fmt::Display for SegmentedCache<K, E, A>
where
	E: fmt::Display,
	A: ObjectAllocator,
{
	/// Renders `Priority:` and `Regular:` lines, entries front to back.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Priority:")?;
		for entry in &self.priority {
			write!(f, " {}", **entry)?;
		}
		f.write_str("\nRegular:")?;
		for entry in &self.regular {
			write!(f, " {}", **entry)?;
		}
		f.write_str("\n")
	}
}

impl<K: ?Sized, E, A> fmt::Debug for SegmentedCache<K, E, A>
where
	A: ObjectAllocator + fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SegmentedCache")
			.field("priority_len", &self.priority.len())
			.field("regular_len", &self.regular.len())
			.field("max_top_size", &self.max_top_size)
			.field("max_low_size", &self.max_low_size)
			.field("alloc", &self.alloc)
			.finish()
	}
}

impl<K: ?Sized, E, A> Drop for SegmentedCache<K, E, A>
where
	A: ObjectAllocator,
{
	fn drop(&mut self) {
		for entry in self.priority.drain(..).chain(self.regular.drain(..)) {
			// SAFETY: every resident entry was created by `self.alloc`, which is
			// still alive here.
			unsafe { self.alloc.destroy(entry) };
		}
	}
}
