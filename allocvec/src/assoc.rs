use core::cmp::Ordering;
use core::fmt;

use crate::alloc::{Allocator, DefaultAllocator};
use crate::array::{Array, Comparer};
use crate::error::{Error, Result};
use crate::iter::AssocIter;

/// A small ordered key-value store backed by two parallel arrays.
///
/// Lookup is a linear scan with the key comparer, so every keyed operation is
/// O(n). Entry `i` is `(keys[i], values[i])`; the two arrays always have the
/// same length after any public call, including calls that fail.
pub struct AssocArray<K: Copy, V: Copy, A: Allocator + Clone = DefaultAllocator> {
    keys: Array<K, A>,
    values: Array<V, A>,
    comparer: Comparer<K>,
}

impl<K: Copy + Ord, V: Copy> AssocArray<K, V, DefaultAllocator> {
    /// Creates a store with room for `capacity` entries, comparing keys with `Ord`.
    ///
    /// # Errors
    ///
    /// See [`Array::new`].
    pub fn new(capacity: usize) -> Result<Self> {
        Self::new_in(capacity, K::cmp, DefaultAllocator)
    }
}

impl<K: Copy, V: Copy> AssocArray<K, V, DefaultAllocator> {
    /// Creates a store that matches keys with `comparer`.
    ///
    /// # Errors
    ///
    /// See [`Array::new`].
    pub fn with_comparer(capacity: usize, comparer: Comparer<K>) -> Result<Self> {
        Self::new_in(capacity, comparer, DefaultAllocator)
    }
}

impl<K: Copy, V: Copy, A: Allocator + Clone> AssocArray<K, V, A> {
    /// Creates a store whose two arrays both allocate from `alloc`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` if `K` or `V` is zero-sized
    /// - `Error::AllocationFailed` if either array cannot get its initial storage
    pub fn new_in(capacity: usize, comparer: Comparer<K>, alloc: A) -> Result<Self> {
        let keys = Array::new_in(capacity, Some(comparer), alloc.clone())?;
        let values = Array::new_in(capacity, None, alloc)?;
        Ok(Self {
            keys,
            values,
            comparer,
        })
    }

    fn check_lockstep(&self) {
        debug_assert_eq!(
            self.keys.len(),
            self.values.len(),
            "keys and values out of step"
        );
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        let cmp = self.comparer;
        self.keys
            .iter()
            .position(|candidate| cmp(candidate, key) == Ordering::Equal)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.check_lockstep();
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries that fit without growing either array.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keys.capacity().min(self.values.capacity())
    }

    /// Inserts a new entry or overwrites the value of an existing key.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if either array fails to grow. A key
    /// pushed before the value push failed is taken back out, so the store is
    /// left exactly as it was.
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        if let Some(index) = self.index_of(&key) {
            return self.values.put(index, value);
        }
        self.keys.push(key)?;
        if let Err(err) = self.values.push(value) {
            self.keys.pop();
            tracing::debug!(len = self.keys.len(), "value push failed, key rolled back");
            return Err(err);
        }
        self.check_lockstep();
        Ok(())
    }

    /// Returns the value stored for `key`, or `None` if the key is absent.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = self.index_of(key)?;
        self.values.get(index)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.index_of(key)?;
        self.values.get_mut(index)
    }

    /// Tries to get the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the key is absent.
    pub fn try_get(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::NotFound)
    }

    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        self.index_of(key).is_some()
    }

    /// Removes the entry for `key` by swapping the last entry into its place.
    ///
    /// Returns the removed value, or `None` if the key was absent (not an error).
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.index_of(key)?;
        let removed = self
            .keys
            .remove_swap(index)
            .and(self.values.remove_swap(index))
            .ok();
        self.check_lockstep();
        removed
    }

    /// Removes the entry for `key`, keeping the order of the remaining entries.
    ///
    /// Returns the removed value, or `None` if the key was absent.
    pub fn remove_ordered(&mut self, key: &K) -> Option<V> {
        let index = self.index_of(key)?;
        let removed = self
            .keys
            .remove_ordered(index)
            .and(self.values.remove_ordered(index))
            .ok();
        self.check_lockstep();
        removed
    }

    /// Drops every entry but keeps both arrays' storage.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// Sets the capacity of both arrays to `capacity` entries.
    ///
    /// Shrinking below the current length drops the trailing entries.
    ///
    /// # Errors
    ///
    /// Returns `Error::AllocationFailed` if either array fails. If the keys
    /// were resized but the values were not, the values are truncated to the
    /// keys' length so both stay in step; [`AssocArray::capacity`] then
    /// reports the smaller of the two capacities.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        self.keys.set_capacity(capacity)?;
        if let Err(err) = self.values.set_capacity(capacity) {
            self.values.truncate(self.keys.len());
            tracing::debug!(
                len = self.keys.len(),
                keys_capacity = self.keys.capacity(),
                values_capacity = self.values.capacity(),
                "value array resize failed after keys resized"
            );
            return Err(err);
        }
        self.check_lockstep();
        Ok(())
    }

    /// Reorders entries by key with the comparer, moving values alongside.
    ///
    /// Insertion sort: stable, and quadratic like the rest of the store.
    pub fn sort_by_key(&mut self) {
        let cmp = self.comparer;
        let keys = self.keys.as_mut_slice();
        let values = self.values.as_mut_slice();
        for i in 1..keys.len() {
            let mut j = i;
            while j > 0 && cmp(&keys[j - 1], &keys[j]) == Ordering::Greater {
                keys.swap(j - 1, j);
                values.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[K] {
        self.keys.as_slice()
    }

    #[must_use]
    pub fn values(&self) -> &[V] {
        self.values.as_slice()
    }

    /// Iterates `(key, value)` pairs in storage order.
    pub fn iter(&self) -> AssocIter<'_, K, V> {
        AssocIter::new(self.keys.as_slice(), self.values.as_slice())
    }
}

impl<K, V, A> fmt::Debug for AssocArray<K, V, A>
where
    K: Copy + fmt::Debug,
    V: Copy + fmt::Debug,
    A: Allocator + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
