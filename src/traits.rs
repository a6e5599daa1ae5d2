use std::fmt;

/// Capability set every cached entry type must provide.
///
/// An entry is built from the key that missed, answers whether it belongs to a
/// given key, and can render itself for the cache's debug output. Identity is
/// decided by [`matches`](CacheEntry::matches) alone, never by address.
///
/// # Example
///
/// ```
/// use std::fmt;
/// use pooled_slru::CacheEntry;
///
/// struct Square {
///     n: u32,
///     value: u64,
/// }
///
/// impl CacheEntry<u32> for Square {
///     fn from_key(key: &u32) -> Self {
///         Self { n: *key, value: (*key as u64).pow(2) }
///     }
///
///     fn matches(&self, key: &u32) -> bool {
///         self.n == *key
///     }
/// }
///
/// impl fmt::Display for Square {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}", self.n)
///     }
/// }
/// ```
pub trait CacheEntry<K: ?Sized>: fmt::Display + Sized {
	/// Build a new entry for a key that missed.
	fn from_key(key: &K) -> Self;

	/// Whether this entry is the one cached for `key`.
	fn matches(&self, key: &K) -> bool;
}
