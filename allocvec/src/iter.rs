use crate::alloc::Allocator;
use crate::array::Array;
use crate::assoc::AssocArray;

impl<'a, T: Copy, A: Allocator> IntoIterator for &'a Array<T, A> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over key-value pairs of an `AssocArray`, in storage order.
///
/// Storage order is insertion order until a swap removal or a sort moves
/// entries around.
///
/// This iterator implements `Clone`.
#[derive(Clone)]
pub struct AssocIter<'a, K, V> {
    keys: core::slice::Iter<'a, K>,
    values: core::slice::Iter<'a, V>,
}

impl<'a, K, V> AssocIter<'a, K, V> {
    pub(crate) fn new(keys: &'a [K], values: &'a [V]) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self {
            keys: keys.iter(),
            values: values.iter(),
        }
    }
}

impl<'a, K, V> Iterator for AssocIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        let value = self.values.next()?;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for AssocIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let key = self.keys.next_back()?;
        let value = self.values.next_back()?;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for AssocIter<'_, K, V> {}

impl<'a, K: Copy, V: Copy, A: Allocator + Clone> IntoIterator for &'a AssocArray<K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = AssocIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
