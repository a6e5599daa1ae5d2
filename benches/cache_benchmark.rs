use std::fmt;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pooled_slru::{CacheBuilder, CacheEntry, HeapAllocator, SegmentedCache, SizeClassPool};

#[derive(Clone, Debug, PartialEq)]
struct BenchEntry {
	key: u64,
	data: [u8; 48],
}

impl CacheEntry<u64> for BenchEntry {
	fn from_key(key: &u64) -> Self {
		Self {
			key: *key,
			data: [0u8; 48],
		}
	}

	fn matches(&self, key: &u64) -> bool {
		self.key == *key
	}
}

impl fmt::Display for BenchEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.key)
	}
}

type PooledCache = SegmentedCache<u64, BenchEntry>;
type HeapCache = SegmentedCache<u64, BenchEntry, HeapAllocator>;

fn pooled(capacity: usize) -> PooledCache {
	CacheBuilder::new(capacity).build_pooled().unwrap()
}

fn heap(capacity: usize) -> HeapCache {
	CacheBuilder::new(capacity).build(HeapAllocator)
}

fn bench_get_hit(c: &mut Criterion) {
	let mut group = c.benchmark_group("get_hit");

	for size in [16u64, 64, 256] {
		group.throughput(Throughput::Elements(size));

		let mut cache = pooled(size as usize);
		// Two passes land every key in the priority segment
		for _ in 0..2 {
			for i in 0..size {
				cache.get(&i).unwrap();
			}
		}
		group.bench_with_input(BenchmarkId::new("pooled", size), &size, |b, &size| {
			b.iter(|| {
				for i in 0..size {
					let _ = black_box(cache.get(&black_box(i)).unwrap().data[0]);
				}
			});
		});

		let mut qc = quick_cache::unsync::Cache::new(size as usize * 2);
		for i in 0..size {
			qc.insert(i, BenchEntry::from_key(&i));
		}
		group.bench_with_input(BenchmarkId::new("quick_cache", size), &size, |b, &size| {
			b.iter(|| {
				for i in 0..size {
					let _ = black_box(qc.get(&black_box(i)).map(|e| e.data[0]));
				}
			});
		});
	}

	group.finish();
}

fn bench_get_miss(c: &mut Criterion) {
	let mut group = c.benchmark_group("get_miss");
	let size = 1000u64;
	group.throughput(Throughput::Elements(size));

	group.bench_function("pooled", |b| {
		let mut cache = pooled(64);
		let mut next = 0u64;
		b.iter(|| {
			for _ in 0..size {
				next += 1;
				let _ = black_box(cache.get(&next).unwrap().key);
			}
		});
	});

	group.bench_function("heap", |b| {
		let mut cache = heap(64);
		let mut next = 0u64;
		b.iter(|| {
			for _ in 0..size {
				next += 1;
				let _ = black_box(cache.get(&next).unwrap().key);
			}
		});
	});

	group.bench_function("quick_cache", |b| {
		let mut qc = quick_cache::unsync::Cache::new(128);
		let mut next = 0u64;
		b.iter(|| {
			for _ in 0..size {
				next += 1;
				if qc.get(&next).is_none() {
					qc.insert(next, BenchEntry::from_key(&next));
				}
			}
		});
	});

	group.finish();
}

fn bench_scan_resistance(c: &mut Criterion) {
	c.bench_function("hot_set_with_scan", |b| {
		let mut cache = pooled(32);
		for _ in 0..2 {
			for i in 0..32u64 {
				cache.get(&i).unwrap();
			}
		}
		let mut scan = 1_000_000u64;

		b.iter(|| {
			for i in 0..32u64 {
				let _ = black_box(cache.get(&i).unwrap().key);
				scan += 1;
				let _ = black_box(cache.get(&scan).unwrap().key);
			}
		});
	});
}

fn bench_pool(c: &mut Criterion) {
	let mut group = c.benchmark_group("pool");

	for slots in [64usize, 1024] {
		group.throughput(Throughput::Elements(slots as u64));
		group.bench_with_input(BenchmarkId::new("fill_and_drain", slots), &slots, |b, &slots| {
			let mut pool = SizeClassPool::new(slots * 64, &[16, 64]).unwrap();
			let mut ptrs = Vec::with_capacity(slots);
			b.iter(|| {
				for _ in 0..slots {
					ptrs.push(pool.allocate(black_box(64)).unwrap());
				}
				for ptr in ptrs.drain(..) {
					pool.deallocate(ptr.as_ptr());
				}
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_get_hit, bench_get_miss, bench_scan_resistance, bench_pool);
criterion_main!(benches);
