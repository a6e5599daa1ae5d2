use std::mem;

use crate::alloc::{ObjectAllocator, PoolAllocator};
use crate::cache::SegmentedCache;
use crate::error::ConfigError;
use crate::pool::SizeClassPool;
use crate::traits::CacheEntry;

/// Builder for configuring a [`SegmentedCache`].
///
/// # Example
///
/// ```ignore
/// use pooled_slru::CacheBuilder;
///
/// let cache = CacheBuilder::new(64)
///     .priority_capacity(16) // keep fewer proven entries
///     .regular_capacity(128) // and a longer probation queue
///     .build_pooled::<u64, Page>()?;
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder {
	max_top_size: usize,
	max_low_size: usize,
}

impl CacheBuilder {
	/// Create a builder with both segment capacities set to `capacity`.
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "capacity must be greater than 0");
		Self {
			max_top_size: capacity,
			max_low_size: capacity,
		}
	}

	/// Set the number of entries the priority segment holds.
	///
	/// Default: the capacity passed to [`new`](Self::new)
	pub fn priority_capacity(mut self, capacity: usize) -> Self {
		assert!(capacity > 0, "priority capacity must be greater than 0");
		self.max_top_size = capacity;
		self
	}

	/// Set the number of entries the regular segment holds.
	///
	/// Default: the capacity passed to [`new`](Self::new)
	pub fn regular_capacity(mut self, capacity: usize) -> Self {
		assert!(capacity > 0, "regular capacity must be greater than 0");
		self.max_low_size = capacity;
		self
	}

	/// Build the cache on top of an existing allocator.
	pub fn build<K: ?Sized, E, A>(self, alloc: A) -> SegmentedCache<K, E, A>
	where
		E: CacheEntry<K>,
		A: ObjectAllocator,
	{
		SegmentedCache::with_capacities(self.max_top_size, self.max_low_size, alloc)
	}

	/// Build the cache with a dedicated single-class pool for `E`.
	///
	/// The pool holds exactly the number of slots the cache can need at once,
	/// so lookups never fail for lack of memory.
	pub fn build_pooled<K: ?Sized, E>(
		self,
	) -> Result<SegmentedCache<K, E, PoolAllocator>, ConfigError>
	where
		E: CacheEntry<K>,
	{
		let slots = SegmentedCache::<K, E>::required_slots(self.max_top_size, self.max_low_size);
		let size = mem::size_of::<E>();
		let pool = SizeClassPool::new(slots * size, &[size])?;
		Ok(self.build(PoolAllocator::new(pool)))
	}
}

impl Default for CacheBuilder {
	/// Create a builder with 128 entries per segment.
	fn default() -> Self {
		Self::new(128)
	}
}

#[cfg(test)]
mod tests {
	use std::fmt;

	use super::*;
	use crate::alloc::HeapAllocator;

	struct Slot(u64);

	impl CacheEntry<u64> for Slot {
		fn from_key(key: &u64) -> Self {
			Self(*key)
		}

		fn matches(&self, key: &u64) -> bool {
			self.0 == *key
		}
	}

	impl fmt::Display for Slot {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			write!(f, "{}", self.0)
		}
	}

	struct Marker;

	impl CacheEntry<u64> for Marker {
		fn from_key(_: &u64) -> Self {
			Self
		}

		fn matches(&self, _: &u64) -> bool {
			true
		}
	}

	impl fmt::Display for Marker {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("marker")
		}
	}

	#[test]
	fn test_builder_default() {
		let cache: SegmentedCache<u64, Slot, _> = CacheBuilder::default().build(HeapAllocator);
		assert!(cache.is_empty());
		assert_eq!(cache.max_top_size(), 128);
		assert_eq!(cache.max_low_size(), 128);
	}

	#[test]
	fn test_builder_independent_capacities() {
		let cache: SegmentedCache<u64, Slot, _> =
			CacheBuilder::new(8).priority_capacity(2).regular_capacity(5).build(HeapAllocator);
		assert_eq!(cache.max_top_size(), 2);
		assert_eq!(cache.max_low_size(), 5);
	}

	#[test]
	fn test_builder_pooled_sizing() {
		let cache = CacheBuilder::new(4).build_pooled::<u64, Slot>().unwrap();
		let pool = cache.allocator().pool();
		assert_eq!(pool.size_classes().collect::<Vec<_>>(), vec![mem::size_of::<Slot>()]);
		assert_eq!(pool.capacity(), 9);
	}

	#[test]
	fn test_builder_pooled_rejects_zero_sized_entry() {
		let err = CacheBuilder::new(4).build_pooled::<u64, Marker>().unwrap_err();
		assert_eq!(err, ConfigError::ZeroSizeClass);
	}

	#[test]
	#[should_panic(expected = "capacity must be greater than 0")]
	fn test_builder_zero_capacity() {
		CacheBuilder::new(0);
	}

	#[test]
	#[should_panic(expected = "regular capacity must be greater than 0")]
	fn test_builder_zero_regular_capacity() {
		CacheBuilder::new(4).regular_capacity(0);
	}
}
