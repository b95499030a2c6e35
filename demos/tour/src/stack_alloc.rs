//! A bump allocator over one fixed region.

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use allocvec::Allocator;

/// Hands out memory from a fixed region by bumping a top offset.
///
/// Only the most recent block can grow in place or be given back; freeing an
/// older block is a no-op until the region is dropped. Exhausting the region
/// makes requests fail instead of falling back to the heap.
pub struct StackAllocator {
    region: Box<[Cell<u128>]>,
    top: Cell<usize>,
    last: Cell<Option<usize>>,
}

impl StackAllocator {
    /// Creates a region of at least `size` bytes, aligned to 16.
    pub fn new(size: usize) -> Self {
        let words = size.div_ceil(16);
        Self {
            region: (0..words).map(|_| Cell::new(0)).collect(),
            top: Cell::new(0),
            last: Cell::new(None),
        }
    }

    /// Bytes currently handed out, including alignment padding.
    pub fn used(&self) -> usize {
        self.top.get()
    }

    fn capacity(&self) -> usize {
        self.region.len() * 16
    }

    fn base(&self) -> *mut u8 {
        self.region.as_ptr().cast::<u8>().cast_mut()
    }

    fn offset_of(&self, ptr: NonNull<u8>) -> usize {
        ptr.as_ptr() as usize - self.base() as usize
    }
}

unsafe impl Allocator for StackAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.align() > 16 {
            return None;
        }
        let start = self.top.get().checked_next_multiple_of(layout.align())?;
        let end = start.checked_add(layout.size())?;
        if end > self.capacity() {
            tracing::debug!(requested = layout.size(), used = self.top.get(), "stack region exhausted");
            return None;
        }
        self.top.set(end);
        self.last.set(Some(start));
        // SAFETY: `start` is within the region
        NonNull::new(unsafe { self.base().add(start) })
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        let offset = self.offset_of(ptr);
        if self.last.get() == Some(offset) {
            let end = offset.checked_add(new_size)?;
            if end > self.capacity() {
                return None;
            }
            self.top.set(end);
            return Some(ptr);
        }
        let new_layout = Layout::from_size_align(new_size, layout.align()).ok()?;
        let moved = self.alloc(new_layout)?;
        // SAFETY: both blocks live in the region and do not overlap
        unsafe {
            std::ptr::copy_nonoverlapping(
                ptr.as_ptr(),
                moved.as_ptr(),
                layout.size().min(new_size),
            );
        }
        Some(moved)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, _layout: Layout) {
        let offset = self.offset_of(ptr);
        if self.last.get() == Some(offset) {
            self.top.set(offset);
            self.last.set(None);
        }
    }
}
