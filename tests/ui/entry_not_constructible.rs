// A type with no `CacheEntry` impl cannot back a cache.

use pooled_slru::{CacheBuilder, HeapAllocator, SegmentedCache};

struct NotAnEntry;

fn main() {
    let _marker = NotAnEntry;
    let cache: SegmentedCache<u32, NotAnEntry, HeapAllocator> =
        CacheBuilder::new(4).build(HeapAllocator);
    assert!(cache.is_empty());
}
