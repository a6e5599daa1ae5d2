//! Typed object allocation on top of a raw arena.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::error::AllocError;
use crate::pool::{ARENA_ALIGN, SizeClassPool};

/// Move-only owning handle to a `T` living in allocator-managed storage.
///
/// The handle cannot be cloned, so an object always has exactly one owner.
/// Storage is only reclaimed by passing the handle back to the allocator that
/// created it via [`ObjectAllocator::destroy`]; dropping the handle instead
/// leaks both the value and its slot.
///
/// The handle does not borrow its allocator. Keeping it valid is part of the
/// `unsafe` contract of [`ObjectAllocator::create_with`].
pub struct PoolBox<T> {
	ptr: NonNull<T>,
	/// Ownership of a `T` for drop check
	marker: PhantomData<T>,
}

impl<T> PoolBox<T> {
	/// Wrap a pointer to an initialised `T`.
	///
	/// # Safety
	///
	/// `ptr` must point to a valid, initialised `T` that nothing else owns, and
	/// must be released through the allocator that produced the storage.
	pub unsafe fn from_raw(ptr: NonNull<T>) -> Self {
		Self {
			ptr,
			marker: PhantomData,
		}
	}

	/// Give up ownership and return the raw pointer.
	pub fn into_raw(self) -> NonNull<T> {
		let ptr = self.ptr;
		mem::forget(self);
		ptr
	}

	/// Address of the object, without giving up ownership.
	pub fn as_ptr(&self) -> *const T {
		self.ptr.as_ptr()
	}
}

impl<T> Deref for PoolBox<T> {
	type Target = T;

	fn deref(&self) -> &T {
		// SAFETY: the handle uniquely owns an initialised `T`.
		unsafe { self.ptr.as_ref() }
	}
}

impl<T> DerefMut for PoolBox<T> {
	fn deref_mut(&mut self) -> &mut T {
		// SAFETY: the handle uniquely owns an initialised `T` and `&mut self`
		// guarantees exclusive access.
		unsafe { self.ptr.as_mut() }
	}
}

impl<T: fmt::Debug> fmt::Debug for PoolBox<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(**self).fmt(f)
	}
}

impl<T: fmt::Display> fmt::Display for PoolBox<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(**self).fmt(f)
	}
}

/// Typed, construction-aware allocation capability used by the cache.
///
/// A [`PoolBox`] points into storage the allocator owns but carries no borrow
/// of it, so the allocator cannot stop a handle from outliving the storage or
/// from being handed to a different allocator. Both operations are therefore
/// `unsafe`; [`SegmentedCache`](crate::SegmentedCache) upholds the contract by
/// owning the allocator together with every handle it creates.
pub trait ObjectAllocator {
	/// Obtain storage for a `T`, then build the value in it with `init`.
	///
	/// `init` only runs once storage has been secured, so a failed allocation
	/// never constructs the object.
	///
	/// # Safety
	///
	/// The returned handle must not be dereferenced after `self` is dropped, and
	/// may only be released by calling [`destroy`](Self::destroy) on `self`.
	unsafe fn create_with<T, F>(&mut self, init: F) -> Result<PoolBox<T>, AllocError>
	where
		F: FnOnce() -> T;

	/// Drop the object in place and release its storage.
	///
	/// # Safety
	///
	/// `object` must have been created by this same allocator.
	unsafe fn destroy<T>(&mut self, object: PoolBox<T>);

	/// Move `value` into freshly allocated storage.
	///
	/// # Safety
	///
	/// Same contract as [`create_with`](Self::create_with).
	unsafe fn create<T>(&mut self, value: T) -> Result<PoolBox<T>, AllocError> {
		self.create_with(|| value)
	}
}

/// [`ObjectAllocator`] backed by a [`SizeClassPool`].
///
/// A `T` is placed in the size class equal to `size_of::<T>()`; the pool must
/// have that exact class registered.
///
/// # Example
///
/// ```
/// use pooled_slru::{ObjectAllocator, PoolAllocator, SizeClassPool};
///
/// let pool = SizeClassPool::new(64, &[8]).unwrap();
/// let mut alloc = PoolAllocator::new(pool);
///
/// // SAFETY: the handle is released through `alloc` while it is still alive.
/// unsafe {
///     let value = alloc.create(42u64).unwrap();
///     assert_eq!(*value, 42);
///     alloc.destroy(value);
/// }
/// ```
#[derive(Debug)]
pub struct PoolAllocator {
	pool: SizeClassPool,
}

impl PoolAllocator {
	/// Wrap a pool.
	pub fn new(pool: SizeClassPool) -> Self {
		Self {
			pool,
		}
	}

	/// The underlying pool.
	pub fn pool(&self) -> &SizeClassPool {
		&self.pool
	}

	/// Unwrap the underlying pool.
	pub fn into_inner(self) -> SizeClassPool {
		self.pool
	}
}

impl From<SizeClassPool> for PoolAllocator {
	fn from(pool: SizeClassPool) -> Self {
		Self::new(pool)
	}
}

impl ObjectAllocator for PoolAllocator {
	unsafe fn create_with<T, F>(&mut self, init: F) -> Result<PoolBox<T>, AllocError>
	where
		F: FnOnce() -> T,
	{
		let size = mem::size_of::<T>();
		let align = mem::align_of::<T>();
		if size == 0 {
			return Err(AllocError::ZeroSized);
		}
		if align > ARENA_ALIGN {
			return Err(AllocError::UnsupportedAlignment {
				align,
			});
		}

		let slot = self.pool.allocate(size)?.cast::<T>();
		// SAFETY: the slot is `size_of::<T>()` bytes, aligned (region starts are
		// ARENA_ALIGN-aligned and slot strides are multiples of `align`), and
		// exclusively ours until deallocated.
		unsafe {
			slot.as_ptr().write(init());
			Ok(PoolBox::from_raw(slot))
		}
	}

	unsafe fn destroy<T>(&mut self, object: PoolBox<T>) {
		let ptr = object.into_raw();
		// SAFETY: the handle came from this pool and owned an initialised `T`
		// that is never touched again.
		unsafe { ptr::drop_in_place(ptr.as_ptr()) };
		self.pool.deallocate(ptr.as_ptr() as *const u8);
	}
}

/// [`ObjectAllocator`] on the global heap.
///
/// Has no capacity limit; useful as a baseline and when pool sizing is not a
/// concern.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl ObjectAllocator for HeapAllocator {
	unsafe fn create_with<T, F>(&mut self, init: F) -> Result<PoolBox<T>, AllocError>
	where
		F: FnOnce() -> T,
	{
		let raw = Box::into_raw(Box::new(init()));
		// SAFETY: Box::into_raw returns a non-null pointer to an owned value.
		unsafe { Ok(PoolBox::from_raw(NonNull::new_unchecked(raw))) }
	}

	unsafe fn destroy<T>(&mut self, object: PoolBox<T>) {
		// SAFETY: the caller guarantees the handle came from `create_with` on a
		// heap allocator, which leaked it with Box::into_raw.
		unsafe { drop(Box::from_raw(object.into_raw().as_ptr())) };
	}
}
