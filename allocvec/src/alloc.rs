//! Pluggable allocators.
//!
//! Every container takes its allocator as a type parameter and keeps the
//! instance that produced its storage for the rest of its life, so resize and
//! release always go back to the same allocator. Pass `&my_allocator` to share
//! one allocator between containers without giving up ownership of it.

use core::cell::Cell;
use core::ffi::c_void;
use core::ptr::NonNull;
use std::alloc::Layout;

/// A source of raw memory.
///
/// Failure is reported as `None`; implementations must not panic or abort on
/// exhaustion. `&self` carries any user context the allocator needs.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`, and must keep them
/// valid until they are passed to `free` or `realloc`.
pub unsafe trait Allocator {
    /// Allocates a block for `layout`. `layout.size()` is never zero.
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Resizes a block, preserving the first `min(old, new_size)` bytes.
    ///
    /// On `None` the original block is untouched and still owned by the caller.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `layout`, and
    /// `new_size` must be non-zero and form a valid layout with `layout.align()`.
    unsafe fn realloc(&self, ptr: NonNull<u8>, layout: Layout, new_size: usize)
        -> Option<NonNull<u8>>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `layout` and not
    /// freed since.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).alloc(layout)
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded contract
        unsafe { (**self).realloc(ptr, layout, new_size) }
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract
        unsafe { (**self).free(ptr, layout) }
    }
}

/// The platform allocator (`std::alloc`). Default type parameter of every container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAllocator;

unsafe impl Allocator for DefaultAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: callers never pass a zero-sized layout
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: ptr/layout come from `alloc` above, new_size is validated by the caller
        NonNull::new(unsafe { std::alloc::realloc(ptr.as_ptr(), layout, new_size) })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr/layout come from `alloc` or `realloc` above
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

pub type AllocFn = unsafe fn(size: usize, align: usize, user_data: *mut c_void) -> *mut u8;
pub type ReallocFn = unsafe fn(
    ptr: *mut u8,
    old_size: usize,
    align: usize,
    new_size: usize,
    user_data: *mut c_void,
) -> *mut u8;
pub type FreeFn = unsafe fn(ptr: *mut u8, size: usize, align: usize, user_data: *mut c_void);

/// An allocator assembled from three function pointers and an opaque context.
///
/// This is the boundary for arena or pool allocators living outside Rust, or
/// for test doubles that need a plain function table. A null return from
/// `alloc` or `realloc` is treated as failure.
#[derive(Debug, Clone, Copy)]
pub struct FnAllocator {
    pub alloc: AllocFn,
    pub realloc: ReallocFn,
    pub free: FreeFn,
    pub user_data: *mut c_void,
}

// The function table itself promises the `Allocator` contract; constructing a
// `FnAllocator` is where that promise is made.
unsafe impl Allocator for FnAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: the table's author guarantees the `Allocator` contract
        NonNull::new(unsafe { (self.alloc)(layout.size(), layout.align(), self.user_data) })
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: see `alloc`
        NonNull::new(unsafe {
            (self.realloc)(
                ptr.as_ptr(),
                layout.size(),
                layout.align(),
                new_size,
                self.user_data,
            )
        })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: see `alloc`
        unsafe { (self.free)(ptr.as_ptr(), layout.size(), layout.align(), self.user_data) }
    }
}

/// Snapshot of the counters kept by a [`TrackingAllocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocStats {
    pub allocations: usize,
    pub reallocations: usize,
    pub frees: usize,
    pub failures: usize,
    pub live_bytes: usize,
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Number of blocks handed out and not yet freed.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.allocations - self.frees
    }
}

/// Wraps another allocator and counts what passes through it.
///
/// Counters use `Cell`, so a tracking allocator is meant to be shared by
/// reference within one thread.
#[derive(Debug, Default)]
pub struct TrackingAllocator<A: Allocator = DefaultAllocator> {
    inner: A,
    stats: Cell<AllocStats>,
}

impl TrackingAllocator<DefaultAllocator> {
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(DefaultAllocator)
    }
}

impl<A: Allocator> TrackingAllocator<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            stats: Cell::new(AllocStats::default()),
        }
    }

    #[must_use]
    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn update(&self, f: impl FnOnce(&mut AllocStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);
        self.stats.set(stats);
    }
}

unsafe impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        let result = self.inner.alloc(layout);
        self.update(|s| match result {
            Some(_) => {
                s.allocations += 1;
                s.live_bytes += layout.size();
            }
            None => s.failures += 1,
        });
        result
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded contract
        let result = unsafe { self.inner.realloc(ptr, layout, new_size) };
        self.update(|s| match result {
            Some(_) => {
                s.reallocations += 1;
                s.live_bytes = s.live_bytes - layout.size() + new_size;
            }
            None => s.failures += 1,
        });
        result
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract
        unsafe { self.inner.free(ptr, layout) };
        self.update(|s| {
            s.frees += 1;
            s.live_bytes -= layout.size();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allocator_round_trip() {
        let layout = Layout::from_size_align(64, 8).unwrap();
        let ptr = DefaultAllocator.alloc(layout).unwrap();
        unsafe {
            ptr.as_ptr().write_bytes(0xAB, 64);
            let grown = DefaultAllocator.realloc(ptr, layout, 128).unwrap();
            assert_eq!(*grown.as_ptr().add(63), 0xAB);
            DefaultAllocator.free(grown, Layout::from_size_align(128, 8).unwrap());
        }
    }

    #[test]
    fn test_tracking_counts_and_peak() {
        let tracker = TrackingAllocator::new();
        let small = Layout::from_size_align(16, 1).unwrap();
        let a = tracker.alloc(small).unwrap();
        let b = tracker.alloc(small).unwrap();
        assert_eq!(tracker.stats().live_bytes, 32);

        unsafe {
            let b = tracker.realloc(b, small, 48).unwrap();
            assert_eq!(tracker.stats().live_bytes, 64);
            tracker.free(a, small);
            tracker.free(b, Layout::from_size_align(48, 1).unwrap());
        }

        let stats = tracker.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.reallocations, 1);
        assert_eq!(stats.frees, 2);
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.peak_bytes, 64);
        assert_eq!(stats.live_blocks(), 0);
    }

    #[test]
    fn test_reference_forwards_to_owner() {
        let tracker = TrackingAllocator::new();
        let by_ref = &tracker;
        let layout = Layout::from_size_align(8, 8).unwrap();
        let ptr = by_ref.alloc(layout).unwrap();
        unsafe { by_ref.free(ptr, layout) };
        assert_eq!(tracker.stats().allocations, 1);
        assert_eq!(tracker.stats().frees, 1);
    }
}
