//! # Pooled SLRU
//!
//! An in-memory object cache with:
//! - **Segmented LRU eviction** (a priority segment for reused entries, a regular
//!   segment for new ones)
//! - **Fixed size-class pool** storage instead of general heap allocation
//! - **Bounded, predictable memory**: the arena is laid out once and never grows
//!
//! ## Quick Start
//!
//! ```rust
//! use std::fmt;
//! use pooled_slru::{CacheBuilder, CacheEntry};
//!
//! // Define your entry type
//! struct Glyph {
//!     code: char,
//!     width: u16,
//! }
//!
//! // Describe how it is built from, and matched against, a key
//! impl CacheEntry<char> for Glyph {
//!     fn from_key(key: &char) -> Self {
//!         Self { code: *key, width: 8 }
//!     }
//!
//!     fn matches(&self, key: &char) -> bool {
//!         self.code == *key
//!     }
//! }
//!
//! impl fmt::Display for Glyph {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{}", self.code)
//!     }
//! }
//!
//! // Two segments of 16 entries, backed by a pool sized for them
//! let mut cache = CacheBuilder::new(16).build_pooled::<char, Glyph>().unwrap();
//!
//! // A miss creates the entry in the pool
//! let glyph = cache.get(&'a').unwrap();
//! glyph.width = 12;
//!
//! // A second lookup promotes it to the priority segment
//! assert_eq!(cache.get(&'a').unwrap().width, 12);
//! assert_eq!(cache.priority_len(), 1);
//! ```
//!
//! ## Using the pool directly
//!
//! The arena does not depend on the cache:
//!
//! ```rust
//! use pooled_slru::SizeClassPool;
//!
//! let mut pool = SizeClassPool::new(256, &[16, 64]).unwrap();
//!
//! let slot = pool.allocate(16).unwrap();
//! assert!(pool.allocate(32).unwrap_err().is_out_of_memory()); // no rounding up
//!
//! pool.deallocate(slot.as_ptr());
//! assert_eq!(pool.allocate(16).unwrap(), slot); // first fit reuses the slot
//! ```
//!
//! ## Thread Safety
//!
//! Nothing here is `Send` or `Sync`. The cache and pool are meant for a single
//! thread; wrap a whole cache in a lock if it must be shared.

mod alloc;
mod bitmap;
mod builder;
mod cache;
mod error;
#[cfg(feature = "metrics")]
mod metrics;
mod pool;
mod traits;

pub use alloc::{HeapAllocator, ObjectAllocator, PoolAllocator, PoolBox};
pub use builder::CacheBuilder;
pub use cache::SegmentedCache;
pub use error::{AllocError, ConfigError};
#[cfg(feature = "metrics")]
pub use metrics::CacheMetrics;
pub use pool::{ARENA_ALIGN, PoolBuilder, SizeClassPool, SizeClassStats};
pub use traits::CacheEntry;
