//! Fixed-capacity ring buffer backing the bomb and flame timelines.

use std::ops::{Index, IndexMut};

/// Ordered queue of at most `N` elements stored in a single inline array.
///
/// Elements are addressed by logical index, where `0` is the front. Pushing,
/// popping and indexing are constant time. [`FixedQueue::remove_at`] shifts the
/// tail and is reserved for the uncommon path of removing out of order.
#[derive(Clone, Copy, Debug)]
pub struct FixedQueue<T, const N: usize> {
    slots: [T; N],
    head: usize,
    len: usize,
}

impl<T: Copy + Default, const N: usize> FixedQueue<T, N> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            head: 0,
            len: 0,
        }
    }
}

impl<T: Copy + Default, const N: usize> Default for FixedQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> FixedQueue<T, N> {
    /// Number of queued elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether another push would be rejected.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Number of pushes left before the queue is full.
    #[must_use]
    pub const fn remaining_capacity(&self) -> usize {
        N - self.len
    }

    /// Appends `value` after the last element.
    ///
    /// A full queue hands the value back untouched.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        let slot = self.slot(self.len);
        self.slots[slot] = value;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the front element.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(value)
    }

    /// Removes the element at logical `index`, keeping the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let removed = self.slots[self.slot(index)];
        for offset in index + 1..self.len {
            let from = self.slot(offset);
            let to = self.slot(offset - 1);
            self.slots[to] = self.slots[from];
        }
        self.len -= 1;
        Some(removed)
    }

    /// Front element without consuming it.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Element at logical `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            Some(&self.slots[self.slot(index)])
        } else {
            None
        }
    }

    /// Mutable element at logical `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            let slot = self.slot(index);
            Some(&mut self.slots[slot])
        } else {
            None
        }
    }

    /// Logical index of the first element matching `predicate`.
    pub fn position<P>(&self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        (0..self.len).find(|&index| predicate(&self.slots[self.slot(index)]))
    }

    /// Iterates front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).map(move |index| &self.slots[self.slot(index)])
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    fn slot(&self, index: usize) -> usize {
        (self.head + index) % N
    }
}

impl<T: Copy, const N: usize> Index<usize> for FixedQueue<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(index < self.len, "queue index {index} out of bounds");
        &self.slots[self.slot(index)]
    }
}

impl<T: Copy, const N: usize> IndexMut<usize> for FixedQueue<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.len, "queue index {index} out of bounds");
        let slot = self.slot(index);
        &mut self.slots[slot]
    }
}

impl<T: Copy + PartialEq, const N: usize> PartialEq for FixedQueue<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Copy + Eq, const N: usize> Eq for FixedQueue<T, N> {}
