//! VecDeque-backed FIFO store.

use crate::error::{Result, StoreError};
use crate::store::OrderedStore;
use std::collections::VecDeque;

/// Queue strategy: push_back/pop_front are O(1). A pure FIFO exposes no
/// positional mutation, so replacement rebuilds the backing sequence while
/// keeping the observable order identical to the list strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueStore<T> {
    items: VecDeque<T>,
}

impl<T> QueueStore<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl<T> Default for QueueStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Send> OrderedStore<T> for QueueStore<T> {
    fn insert(&mut self, item: T) {
        self.items.push_back(item);
    }

    fn remove_next(&mut self) -> Result<T> {
        self.items.pop_front().ok_or(StoreError::EmptyCollection)
    }

    fn replace_one(&mut self, old: &T, new: T) -> Result<()> {
        // Checked up front so a miss leaves the queue untouched.
        if !self.items.contains(old) {
            return Err(StoreError::NotFound);
        }

        let mut rebuilt = VecDeque::with_capacity(self.items.len());
        let mut replacement = Some(new);
        for item in self.items.drain(..) {
            match replacement.take() {
                Some(next) if item == *old => rebuilt.push_back(next),
                other => {
                    replacement = other;
                    rebuilt.push_back(item);
                }
            }
        }
        self.items = rebuilt;
        Ok(())
    }

    fn replace_all(&mut self, items: Vec<T>) {
        self.items = items.into();
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.items.iter())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
