// An entry built from `String` keys cannot serve a cache keyed by `u64`.

use std::fmt;

use pooled_slru::{CacheBuilder, CacheEntry, HeapAllocator, SegmentedCache};

struct Named(String);

impl CacheEntry<String> for Named {
    fn from_key(key: &String) -> Self {
        Self(key.clone())
    }

    fn matches(&self, key: &String) -> bool {
        &self.0 == key
    }
}

impl fmt::Display for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn main() {
    let cache: SegmentedCache<u64, Named, HeapAllocator> =
        CacheBuilder::new(4).build(HeapAllocator);
    assert!(cache.is_empty());
}
