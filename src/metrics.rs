//! Cache performance metrics.

/// Counters describing how lookups moved entries between segments.
///
/// # Example
///
/// ```
/// use pooled_slru::SegmentedCache;
/// # use pooled_slru::CacheEntry;
/// # struct Id(u32);
/// # impl CacheEntry<u32> for Id {
/// #     fn from_key(key: &u32) -> Self { Id(*key) }
/// #     fn matches(&self, key: &u32) -> bool { self.0 == *key }
/// # }
/// # impl std::fmt::Display for Id {
/// #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
/// # }
///
/// let mut cache = SegmentedCache::<u32, Id, _>::new(8, pooled_slru::HeapAllocator);
/// cache.get(&1).unwrap();
/// cache.get(&1).unwrap();
///
/// let metrics = cache.metrics();
/// assert_eq!(metrics.misses, 1);
/// assert_eq!(metrics.regular_hits, 1);
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
	/// Lookups served from the priority segment.
	pub priority_hits: u64,
	/// Lookups served from the regular segment, each one a promotion.
	pub regular_hits: u64,
	/// Lookups that created a new entry.
	pub misses: u64,
	/// Entries moved from the priority tail back to the regular segment.
	pub demotions: u64,
	/// Entries destroyed from the regular tail.
	pub evictions: u64,
	/// Current priority segment length.
	pub priority_len: usize,
	/// Current regular segment length.
	pub regular_len: usize,
}

impl CacheMetrics {
	/// Total number of hits across both segments.
	pub fn hits(&self) -> u64 {
		self.priority_hits + self.regular_hits
	}

	/// Total number of lookups (hits + misses).
	pub fn total_accesses(&self) -> u64 {
		self.hits() + self.misses
	}

	/// Hit rate as a ratio between 0.0 and 1.0.
	///
	/// Returns 0.0 if there have been no lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.total_accesses();
		if total == 0 {
			0.0
		} else {
			self.hits() as f64 / total as f64
		}
	}
}
