// Releasing a handle through another allocator must not compile in safe code.
use pooled_slru::{HeapAllocator, ObjectAllocator, PoolAllocator, SizeClassPool};

fn main() {
    let mut pool = PoolAllocator::new(SizeClassPool::new(64, &[8]).unwrap());
    let value = unsafe { pool.create(7u64) }.unwrap();
    HeapAllocator.destroy(value);
}
