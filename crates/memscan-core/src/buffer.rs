//! Growable buffer used for candidate address sets.
//!
//! Capacity grows by a factor of 1.5 (at least one slot) whenever an append
//! finds the buffer full, and only shrinks on [`GrowableBuffer::reset`].

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct GrowableBuffer<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Copy> GrowableBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical capacity, following the 1.5x growth policy
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.grow();
        }
        self.items.push(value);
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.items.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.items.len(),
        })
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Drop all elements and storage, starting over at `capacity`
    pub fn reset(&mut self, capacity: usize) {
        *self = Self::with_capacity(capacity);
    }

    /// Move `src`'s storage into `self`, releasing what `self` held.
    ///
    /// `src` is left empty with zero capacity.
    pub fn transfer_from(&mut self, src: &mut Self) {
        self.items = std::mem::take(&mut src.items);
        self.capacity = std::mem::take(&mut src.capacity);
    }

    fn grow(&mut self) {
        let mut new_capacity = self.capacity + self.capacity / 2;
        if new_capacity == self.capacity {
            new_capacity += 1;
        }
        self.items.reserve_exact(new_capacity - self.items.len());
        self.capacity = new_capacity;
    }
}

impl<T: Copy> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<'a, T: Copy> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
