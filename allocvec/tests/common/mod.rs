#![allow(dead_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use allocvec::{Allocator, DefaultAllocator};

/// Lets the first `successes` alloc/realloc calls through, then refuses every
/// further request. Frees always succeed.
pub struct FailAfter {
    remaining: Cell<usize>,
    inner: DefaultAllocator,
}

impl FailAfter {
    pub fn new(successes: usize) -> Self {
        Self {
            remaining: Cell::new(successes),
            inner: DefaultAllocator,
        }
    }

    /// Allows `successes` more requests from now on.
    pub fn allow(&self, successes: usize) {
        self.remaining.set(successes);
    }

    fn take(&self) -> bool {
        match self.remaining.get() {
            0 => false,
            n => {
                self.remaining.set(n - 1);
                true
            }
        }
    }
}

unsafe impl Allocator for FailAfter {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.take() {
            self.inner.alloc(layout)
        } else {
            None
        }
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if self.take() {
            unsafe { self.inner.realloc(ptr, layout, new_size) }
        } else {
            None
        }
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.free(ptr, layout) }
    }
}
