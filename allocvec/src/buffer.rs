use core::fmt;
use core::ptr::NonNull;
use std::alloc::Layout;

use crate::alloc::{Allocator, DefaultAllocator};
use crate::error::{Error, Result};

/// A raw, reallocatable byte region.
///
/// `set_size` is the only operation that touches the allocator. The region
/// is released through the allocator that produced it, either by
/// `set_size(0)` or on drop.
///
/// Invariant: `size == 0` exactly when no region is held.
pub struct Buffer<A: Allocator = DefaultAllocator> {
    data: Option<NonNull<u8>>,
    size: usize,
    align: usize,
    alloc: A,
}

impl Buffer<DefaultAllocator> {
    /// Creates an empty, byte-aligned buffer on the platform allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(DefaultAllocator)
    }
}

impl Default for Buffer<DefaultAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Buffer<A> {
    /// Creates an empty, byte-aligned buffer that will allocate from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self {
            data: None,
            size: 0,
            align: 1,
            alloc,
        }
    }

    /// Creates an empty buffer whose region will be aligned to `align`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `align` is not a power of two.
    pub fn with_align_in(align: usize, alloc: A) -> Result<Self> {
        if !align.is_power_of_two() {
            return Err(Error::InvalidArgument {
                parameter: "align",
                value: align,
            });
        }
        Ok(Self {
            data: None,
            size: 0,
            align,
            alloc,
        })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn align(&self) -> usize {
        self.align
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to the start of the region, or a dangling aligned pointer when empty.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.map_or(self.dangling().as_ptr().cast_const(), |p| {
            p.as_ptr().cast_const()
        })
    }

    /// Mutable pointer to the start of the region, or a dangling aligned pointer when empty.
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.map_or(self.dangling().as_ptr(), NonNull::as_ptr)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self.data {
            // SAFETY: the region holds `size` initialised bytes (zero-filled on growth)
            Some(p) => unsafe { core::slice::from_raw_parts(p.as_ptr(), self.size) },
            None => &[],
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self.data {
            // SAFETY: as above, and `&mut self` guarantees exclusive access
            Some(p) => unsafe { core::slice::from_raw_parts_mut(p.as_ptr(), self.size) },
            None => &mut [],
        }
    }

    fn dangling(&self) -> NonNull<u8> {
        // `align` is a non-zero power of two, so it is a valid aligned address
        NonNull::new(self.align as *mut u8).unwrap_or(NonNull::dangling())
    }

    fn layout_for(&self, size: usize) -> Result<Layout> {
        Layout::from_size_align(size, self.align).map_err(|_| Error::InvalidArgument {
            parameter: "size",
            value: size,
        })
    }

    /// Resizes the region to exactly `new_size` bytes.
    ///
    /// - `0` releases the region (no-op when already empty).
    /// - Growing from empty allocates and zero-fills the whole region.
    /// - Resizing a held region reallocates; existing bytes are preserved and
    ///   any new tail is zero-filled.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if `new_size` cannot form a layout; the
    ///   allocator is not called.
    /// - `Error::AllocationFailed` if the allocator returns nothing; the
    ///   buffer keeps its previous region and size.
    pub fn set_size(&mut self, new_size: usize) -> Result<()> {
        if new_size == self.size {
            return Ok(());
        }
        let new_layout = self.layout_for(new_size)?;

        match self.data {
            None => {
                debug_assert_eq!(self.size, 0);
                let Some(ptr) = self.alloc.alloc(new_layout) else {
                    tracing::error!(requested = new_size, "buffer allocation failed");
                    return Err(Error::AllocationFailed {
                        requested: new_size,
                    });
                };
                // SAFETY: freshly allocated block of `new_size` bytes
                unsafe { ptr.as_ptr().write_bytes(0, new_size) };
                self.data = Some(ptr);
                self.size = new_size;
            }
            Some(ptr) => {
                let old_layout = self.layout_for(self.size)?;
                if new_size == 0 {
                    // SAFETY: `ptr` was produced by `self.alloc` for `old_layout`
                    unsafe { self.alloc.free(ptr, old_layout) };
                    self.data = None;
                    self.size = 0;
                    return Ok(());
                }
                // SAFETY: `ptr` was produced by `self.alloc` for `old_layout`; new_size > 0
                let Some(new_ptr) = (unsafe { self.alloc.realloc(ptr, old_layout, new_size) })
                else {
                    tracing::error!(
                        requested = new_size,
                        current = self.size,
                        "buffer reallocation failed"
                    );
                    return Err(Error::AllocationFailed {
                        requested: new_size,
                    });
                };
                if new_size > self.size {
                    // SAFETY: bytes [old, new) lie inside the reallocated block
                    unsafe {
                        new_ptr
                            .as_ptr()
                            .add(self.size)
                            .write_bytes(0, new_size - self.size);
                    }
                }
                self.data = Some(new_ptr);
                self.size = new_size;
            }
        }
        Ok(())
    }
}

// SAFETY: the region is exclusively owned; moving or sharing the buffer is as
// safe as moving or sharing its allocator.
unsafe impl<A: Allocator + Send> Send for Buffer<A> {}
// SAFETY: `&Buffer` only permits reads of the region.
unsafe impl<A: Allocator + Sync> Sync for Buffer<A> {}

impl<A: Allocator> Drop for Buffer<A> {
    fn drop(&mut self) {
        if let Some(ptr) = self.data.take() {
            if let Ok(layout) = Layout::from_size_align(self.size, self.align) {
                // SAFETY: `ptr` was produced by `self.alloc` for this layout
                unsafe { self.alloc.free(ptr, layout) };
            }
        }
    }
}

impl<A: Allocator> fmt::Debug for Buffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.size)
            .field("align", &self.align)
            .field("allocated", &self.data.is_some())
            .finish()
    }
}
