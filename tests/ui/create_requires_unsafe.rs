// A handle must not outlive its allocator, so creating one is unsafe.
use pooled_slru::{ObjectAllocator, PoolAllocator, SizeClassPool};

fn main() {
    let mut alloc = PoolAllocator::new(SizeClassPool::new(64, &[8]).unwrap());
    let value = alloc.create(7u64).unwrap();
    drop(alloc);
    println!("{}", *value);
}
