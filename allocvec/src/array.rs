use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr;

use crate::alloc::{Allocator, DefaultAllocator};
use crate::buffer::Buffer;
use crate::config::{self, DEFAULT_INITIAL_CAPACITY};
use crate::error::{Error, Result};

/// Three-way comparison used by [`Array::find`] and [`Array::sort`].
pub type Comparer<T> = fn(&T, &T) -> Ordering;

/// A growable array of `Copy` items stored in a single [`Buffer`].
///
/// Slots `[0, len)` hold live items; slots `[len, capacity)` are spare and
/// may hold stale copies of removed items. Because items are `Copy`, nothing
/// is ever dropped, so truncation and removal only move the length.
pub struct Array<T: Copy, A: Allocator = DefaultAllocator> {
    buffer: Buffer<A>,
    len: usize,
    capacity: usize,
    comparer: Option<Comparer<T>>,
    _marker: PhantomData<T>,
}

impl<T: Copy> Array<T, DefaultAllocator> {
    /// Creates an array with room for `capacity` items on the platform allocator.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if `T` is zero-sized
    /// - `Error::CapacityOverflow` or `Error::AllocationFailed` if the storage
    ///   cannot be obtained
    pub fn new(capacity: usize) -> Result<Self> {
        Self::new_in(capacity, None, DefaultAllocator)
    }

    /// Creates an array with the default initial capacity (8).
    ///
    /// # Errors
    ///
    /// See [`Array::new`].
    pub fn with_default_capacity() -> Result<Self> {
        Self::new(DEFAULT_INITIAL_CAPACITY)
    }

    /// Creates an array that can `find` and `sort` with `comparer`.
    ///
    /// # Errors
    ///
    /// See [`Array::new`].
    pub fn with_comparer(capacity: usize, comparer: Comparer<T>) -> Result<Self> {
        Self::new_in(capacity, Some(comparer), DefaultAllocator)
    }
}

impl<T: Copy, A: Allocator> Array<T, A> {
    /// Creates an array whose storage comes from `alloc`.
    ///
    /// Zero-sized item types are rejected rather than silently given a
    /// substitute size.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if `T` is zero-sized
    /// - `Error::CapacityOverflow` if `capacity * size_of::<T>()` overflows
    /// - `Error::AllocationFailed` if the allocator refuses the initial block
    pub fn new_in(capacity: usize, comparer: Option<Comparer<T>>, alloc: A) -> Result<Self> {
        if mem::size_of::<T>() == 0 {
            return Err(Error::InvalidArgument {
                parameter: "item_size",
                value: 0,
            });
        }
        let buffer = Buffer::with_align_in(mem::align_of::<T>(), alloc)?;
        let mut array = Self {
            buffer,
            len: 0,
            capacity: 0,
            comparer,
            _marker: PhantomData,
        };
        array.set_capacity(capacity)?;
        Ok(array)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of one item in bytes. Fixed for the life of the array.
    #[must_use]
    pub fn item_size(&self) -> usize {
        mem::size_of::<T>()
    }

    #[must_use]
    pub fn comparer(&self) -> Option<Comparer<T>> {
        self.comparer
    }

    pub fn set_comparer(&mut self, comparer: Option<Comparer<T>>) {
        self.comparer = comparer;
    }

    pub fn allocator(&self) -> &A {
        self.buffer.allocator()
    }

    fn base(&self) -> *const T {
        self.buffer.as_ptr().cast::<T>()
    }

    fn base_mut(&mut self) -> *mut T {
        self.buffer.as_mut_ptr().cast::<T>()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the buffer is aligned for T and slots [0, len) were written as T
        unsafe { core::slice::from_raw_parts(self.base(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        // SAFETY: as in `as_slice`, with exclusive access through `&mut self`
        unsafe { core::slice::from_raw_parts_mut(self.base_mut(), len) }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Changes the capacity to exactly `new_capacity` items.
    ///
    /// Shrinking below the current length truncates the array; the items
    /// beyond the new capacity are lost. `0` releases the storage.
    ///
    /// # Errors
    ///
    /// - `Error::CapacityOverflow` if the byte size overflows
    /// - `Error::AllocationFailed` if the allocator fails; length, capacity
    ///   and contents are unchanged
    pub fn set_capacity(&mut self, new_capacity: usize) -> Result<()> {
        let bytes = new_capacity
            .checked_mul(self.item_size())
            .ok_or(Error::CapacityOverflow {
                count: new_capacity,
            })?;
        self.buffer.set_size(bytes)?;
        tracing::trace!(
            from = self.capacity,
            to = new_capacity,
            item_size = self.item_size(),
            "array capacity changed"
        );
        self.capacity = new_capacity;
        if self.len > new_capacity {
            self.len = new_capacity;
        }
        Ok(())
    }

    /// Makes sure at least `additional` more items fit without reallocating.
    ///
    /// Grows with [`config::grown_capacity`] when needed; never shrinks.
    ///
    /// # Errors
    ///
    /// - `Error::CapacityOverflow` if the required capacity overflows
    /// - `Error::AllocationFailed` if growing fails; the array is unchanged
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow { count: usize::MAX })?;
        if required <= self.capacity {
            return Ok(());
        }
        let new_capacity = config::grown_capacity(self.capacity, required)?;
        tracing::trace!(
            len = self.len,
            capacity = self.capacity,
            new_capacity,
            "array growing"
        );
        self.set_capacity(new_capacity)
    }

    /// Shortens the array to `len` items. No-op if it is already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Forgets every item but keeps the storage for reuse.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.len {
            Err(Error::IndexOutOfBounds {
                index,
                length: self.len,
            })
        } else {
            Ok(())
        }
    }

    fn check_insert_position(&self, index: usize) -> Result<()> {
        if index > self.len {
            Err(Error::IndexOutOfBounds {
                index,
                length: self.len,
            })
        } else {
            Ok(())
        }
    }

    /// Moves `[index, len)` right by `n` slots. Capacity must already cover `len + n`.
    fn open_gap(&mut self, index: usize, n: usize) {
        debug_assert!(self.len + n <= self.capacity);
        let tail = self.len - index;
        if tail > 0 {
            let base = self.base_mut();
            // SAFETY: source and destination lie within capacity; `copy` handles overlap
            unsafe { ptr::copy(base.add(index), base.add(index + n), tail) };
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Tries to get the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `index >= len`.
    pub fn try_get(&self, index: usize) -> Result<&T> {
        self.check_bounds(index)?;
        Ok(&self.as_slice()[index])
    }

    /// Overwrites the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `index >= len`.
    pub fn put(&mut self, index: usize, item: T) -> Result<()> {
        self.check_bounds(index)?;
        self.as_mut_slice()[index] = item;
        Ok(())
    }

    /// Appends an item, growing first if the array is full.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` (or `CapacityOverflow`) if growth
    /// fails; the length is unchanged.
    pub fn push(&mut self, item: T) -> Result<()> {
        self.reserve(1)?;
        let len = self.len;
        // SAFETY: reserve guarantees slot `len` is within capacity
        unsafe { self.base_mut().add(len).write(item) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last item and returns a reference to the slot it occupied.
    ///
    /// The slot keeps its bytes until the next write, and the borrow keeps
    /// the array from being mutated while the reference is alive.
    ///
    /// Returns `None` if the array is empty.
    pub fn pop(&mut self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was a live item a moment ago and is inside capacity
        Some(unsafe { &*self.base().add(self.len) })
    }

    /// Tries to remove the last item.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyArray` if there is nothing to pop.
    pub fn try_pop(&mut self) -> Result<&T> {
        self.pop().ok_or(Error::EmptyArray)
    }

    /// Returns the last item without removing it.
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Tries to return the last item without removing it.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyArray` if the array is empty.
    pub fn try_top(&self) -> Result<&T> {
        self.top().ok_or(Error::EmptyArray)
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Inserts `item` at `index`, shifting later items one slot right.
    ///
    /// `index == len` appends.
    ///
    /// # Errors
    ///
    /// - `Error::IndexOutOfBounds` if `index > len`
    /// - `Error::AllocationFailed` if growth fails; the array is unchanged
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        self.check_insert_position(index)?;
        self.reserve(1)?;
        self.open_gap(index, 1);
        // SAFETY: slot `index` is inside capacity and was vacated by `open_gap`
        unsafe { self.base_mut().add(index).write(item) };
        self.len += 1;
        Ok(())
    }

    /// Inserts `n` default-valued items at `index`, shifting later items right by `n`.
    ///
    /// For the primitive types `T::default()` is the all-zero value.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if `n == 0`
    /// - `Error::IndexOutOfBounds` if `index > len`
    /// - `Error::AllocationFailed` if growth fails; the array is unchanged
    pub fn insert_empty_run(&mut self, index: usize, n: usize) -> Result<()>
    where
        T: Default,
    {
        if n == 0 {
            return Err(Error::InvalidArgument {
                parameter: "count",
                value: 0,
            });
        }
        self.check_insert_position(index)?;
        self.reserve(n)?;
        self.open_gap(index, n);
        let base = self.base_mut();
        for i in index..index + n {
            // SAFETY: the gap [index, index + n) is inside capacity
            unsafe { base.add(i).write(T::default()) };
        }
        self.len += n;
        Ok(())
    }

    /// Inserts a copy of `items` at `index`, shifting later items right.
    ///
    /// # Errors
    ///
    /// - `Error::IndexOutOfBounds` if `index > len`
    /// - `Error::AllocationFailed` if growth fails; the array is unchanged
    pub fn insert_slice(&mut self, index: usize, items: &[T]) -> Result<()> {
        self.check_insert_position(index)?;
        if items.is_empty() {
            return Ok(());
        }
        self.reserve(items.len())?;
        self.open_gap(index, items.len());
        // SAFETY: the gap is inside capacity; `items` cannot alias our storage
        // because we hold `&mut self`
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), self.base_mut().add(index), items.len());
        }
        self.len += items.len();
        Ok(())
    }

    /// Appends a copy of `items`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if growth fails; the array is unchanged.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()> {
        self.insert_slice(self.len, items)
    }

    /// Removes the item at `index`, shifting later items left. Keeps order.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `index >= len`.
    pub fn remove_ordered(&mut self, index: usize) -> Result<T> {
        self.check_bounds(index)?;
        let slice = self.as_mut_slice();
        let item = slice[index];
        slice.copy_within(index + 1.., index);
        self.len -= 1;
        Ok(item)
    }

    /// Removes the item at `index` by moving the last item into its slot.
    ///
    /// O(1), but does not preserve order; use [`Array::remove_ordered`] when
    /// order matters.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if `index >= len`.
    pub fn remove_swap(&mut self, index: usize) -> Result<T> {
        self.check_bounds(index)?;
        let last = self.len - 1;
        let slice = self.as_mut_slice();
        let item = slice[index];
        if index != last {
            slice[index] = slice[last];
        }
        self.len -= 1;
        Ok(item)
    }

    /// Removes up to `count` items starting at `start`, keeping order.
    ///
    /// `count` is clamped to the items available. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// - `Error::IndexOutOfBounds` if `start >= len`
    /// - `Error::InvalidArgument` if `count == 0`
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<usize> {
        self.check_bounds(start)?;
        if count == 0 {
            return Err(Error::InvalidArgument {
                parameter: "count",
                value: 0,
            });
        }
        let removed = count.min(self.len - start);
        let end = start + removed;
        self.as_mut_slice().copy_within(end.., start);
        self.len -= removed;
        Ok(removed)
    }

    /// Returns the index of the first item equal to `item` under the comparer.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingComparer` if no comparer is set.
    pub fn find(&self, item: &T) -> Result<Option<usize>> {
        let cmp = self.comparer.ok_or(Error::MissingComparer)?;
        Ok(self
            .as_slice()
            .iter()
            .position(|candidate| cmp(candidate, item) == Ordering::Equal))
    }

    /// # Errors
    ///
    /// Returns `Error::MissingComparer` if no comparer is set.
    pub fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.find(item)?.is_some())
    }

    /// Sorts the items in place with the comparer. The sort is not stable.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingComparer` if no comparer is set.
    pub fn sort(&mut self) -> Result<()> {
        let cmp = self.comparer.ok_or(Error::MissingComparer)?;
        self.as_mut_slice().sort_unstable_by(cmp);
        Ok(())
    }

    /// Copies the array into fresh storage from a clone of its allocator.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if the new storage cannot be obtained.
    pub fn try_clone(&self) -> Result<Self>
    where
        A: Clone,
    {
        let mut copy = Self::new_in(self.capacity, self.comparer, self.allocator().clone())?;
        copy.extend_from_slice(self.as_slice())?;
        Ok(copy)
    }
}

impl<T: Copy + fmt::Debug, A: Allocator> fmt::Debug for Array<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("items", &self.as_slice())
            .finish()
    }
}
