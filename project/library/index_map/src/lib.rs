//! A growable arena whose slots are addressed by strongly typed indices.
//!
//! Values are never removed except from the end, so an index handed out by
//! [`IndexMap::insert`] stays valid for the lifetime of the map.

use std::{
    fmt,
    iter::{Enumerate, Map},
    marker::PhantomData,
    slice, vec,
};

pub use derive::Index;

pub struct IndexMap<I, T> {
    values: Vec<T>,
    _marker: PhantomData<fn(&I)>,
}

impl<I, T> IndexMap<I, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::bare(Vec::with_capacity(capacity))
    }

    pub fn bare(values: Vec<T>) -> Self {
        Self {
            values,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn values_mut(&mut self) -> slice::IterMut<'_, T> {
        self.values.iter_mut()
    }

    /// Drop every value, invalidating all indices handed out so far.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<I: Index, T> IndexMap<I, T> {
    #[must_use]
    pub fn next_index(&self) -> I {
        I::new(self.values.len())
    }

    #[must_use]
    pub fn last_index(&self) -> Option<I> {
        Some(I::new(self.values.len().checked_sub(1)?))
    }

    pub fn insert(&mut self, value: T) -> I {
        let index = self.next_index();
        self.values.push(value);
        index
    }

    /// Insert a value that needs to know its own index.
    pub fn insert_with(&mut self, constructor: impl FnOnce(I) -> T) -> I {
        let value = constructor(self.next_index());
        self.insert(value)
    }

    pub fn get(&self, index: I) -> Option<&T> {
        self.values.get(index.value())
    }

    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.values.get_mut(index.value())
    }

    pub fn iter(&self) -> Iter<'_, I, T> {
        self.values.iter().enumerate().map(entry)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, I, T> {
        self.values.iter_mut().enumerate().map(entry)
    }

    pub fn indices(&self) -> impl Iterator<Item = I> + Clone + use<I, T> {
        (0..self.len()).map(I::new)
    }
}

impl<I, T> Default for IndexMap<I, T> {
    fn default() -> Self {
        Self::bare(Vec::new())
    }
}

impl<I, T: Clone> Clone for IndexMap<I, T> {
    fn clone(&self) -> Self {
        Self::bare(self.values.clone())
    }
}

impl<I, T: PartialEq> PartialEq for IndexMap<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<I, T: Eq> Eq for IndexMap<I, T> {}

impl<I: Index, T> std::ops::Index<I> for IndexMap<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        &self.values[index.value()]
    }
}

impl<I: Index, T> std::ops::IndexMut<I> for IndexMap<I, T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.values[index.value()]
    }
}

impl<I: Index + fmt::Debug, T: fmt::Debug> fmt::Debug for IndexMap<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self).finish()
    }
}

impl<I: Index, T> IntoIterator for IndexMap<I, T> {
    type Item = (I, T);
    type IntoIter = IntoIter<I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter().enumerate().map(entry)
    }
}

impl<'a, I: Index, T> IntoIterator for &'a IndexMap<I, T> {
    type Item = (I, &'a T);
    type IntoIter = Iter<'a, I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, I: Index, T> IntoIterator for &'a mut IndexMap<I, T> {
    type Item = (I, &'a mut T);
    type IntoIter = IterMut<'a, I, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

fn entry<I: Index, T>((index, value): (usize, T)) -> (I, T) {
    (I::new(index), value)
}

pub type IntoIter<I, T> = Map<Enumerate<vec::IntoIter<T>>, fn((usize, T)) -> (I, T)>;
pub type Iter<'a, I, T> = Map<Enumerate<slice::Iter<'a, T>>, fn((usize, &'a T)) -> (I, &'a T)>;
pub type IterMut<'a, I, T> =
    Map<Enumerate<slice::IterMut<'a, T>>, fn((usize, &'a mut T)) -> (I, &'a mut T)>;

/// A strongly typed key into an [`IndexMap`].
///
/// Usually derived on a newtype over an unsigned integer via `#[derive(Index)]`.
pub trait Index: Copy {
    fn new(index: usize) -> Self;

    fn value(self) -> usize;
}

#[cfg(test)]
mod test;
