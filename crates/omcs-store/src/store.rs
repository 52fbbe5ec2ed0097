//! The ordered-storage contract and the strategy selector.
//!
//! Both concrete strategies must satisfy this contract identically as far as
//! observable order is concerned; they differ only in which operations are
//! cheap. A custom backing container plugs in by implementing [`OrderedStore`].

use crate::error::Result;
use crate::list::ListStore;
use crate::queue::QueueStore;

/// An ordered multiset of items with FIFO removal and positional replacement.
///
/// Implementations are not required to tolerate concurrent mutation during
/// [`iter`](OrderedStore::iter); a wrapping layer owns that guarantee.
pub trait OrderedStore<T: Clone + PartialEq>: Send {
    /// Append `item` at the logical end.
    fn insert(&mut self, item: T);

    /// Remove and return the logically-first item.
    ///
    /// Fails with [`StoreError::EmptyCollection`](crate::StoreError) when
    /// nothing remains.
    fn remove_next(&mut self) -> Result<T>;

    /// Overwrite the first element equal to `old` with `new`, preserving its
    /// position.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError) and leaves the
    /// store untouched when no element matches.
    fn replace_one(&mut self, old: &T, new: T) -> Result<()>;

    /// Discard all current contents and replace them with `items` in order.
    /// An empty input clears the store.
    fn replace_all(&mut self, items: Vec<T>);

    /// Remove every item.
    fn clear(&mut self);

    /// Traverse the current contents in order.
    fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_>;

    /// Copy of the current contents in order.
    fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backing-container strategy selected at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStrategy {
    /// Vec-backed store: positional replacement is an index write, removal
    /// from the front shifts the tail.
    List,
    /// VecDeque-backed FIFO store: cheap front removal, replacement rebuilds
    /// the backing sequence.
    Queue,
}

impl StorageStrategy {
    /// Build a store of this strategy seeded with `initial`.
    pub fn build<T>(self, initial: Vec<T>) -> Box<dyn OrderedStore<T>>
    where
        T: Clone + PartialEq + Send + 'static,
    {
        match self {
            StorageStrategy::List => Box::new(ListStore::from_items(initial)),
            StorageStrategy::Queue => Box::new(QueueStore::from_items(initial)),
        }
    }
}

impl Default for StorageStrategy {
    fn default() -> Self {
        StorageStrategy::List
    }
}
