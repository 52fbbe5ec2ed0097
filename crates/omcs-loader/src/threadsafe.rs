//! Mutex decorator adding mutual exclusion, snapshot isolation and
//! diff-based notification.
//!
//! Every lock scope covers only the read-and-mutate span. The change batch is
//! captured by value before the guard drops and dispatched strictly after, so
//! a subscriber re-entering the collection from its callback cannot deadlock.

use crate::error::{LoaderError, Result};
use crate::facade::AsyncCollection;
use crate::loader::{race_cancellation, Collection, Loader, LoaderState};
use crate::notify::{ChangeBatch, Notifier};
use async_trait::async_trait;
use omcs_diff::{diff_by_eq, ChangeRecord, UpdatePolicy};
use omcs_store::StoreError;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Thread-safe loader: serializes every mutation behind one lock and converts
/// bulk replacements into per-item change events.
///
/// The conservative update policy is deliberate: a bulk [`replace_all`]
/// reports every matched pair as Updated, never Unchanged, so a
/// value-preserving-but-semantically-changed mutation is never silently
/// dropped. Spurious Updated events are the accepted cost.
///
/// [`replace_all`]: ThreadSafeLoader::replace_all
pub struct ThreadSafeLoader<T> {
    inner: Mutex<Loader<T>>,
    notifier: Notifier<T>,
}

impl<T: Clone + PartialEq + Send + 'static> ThreadSafeLoader<T> {
    pub fn new(loader: Loader<T>) -> Self {
        let notifier = loader.notifier().clone();
        Self {
            inner: Mutex::new(loader),
            notifier,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.inner.lock().state()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.inner.lock().cancellation()
    }

    /// Signal the root token; see [`Loader::cancel`].
    pub fn cancel(&self) {
        self.inner.lock().cancel();
    }

    /// Subscribe to change batches.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeBatch<T>> {
        self.notifier.subscribe()
    }

    /// Remove and return the logically-first item. Not observed as a change
    /// event.
    pub fn take(&self) -> Result<T> {
        self.inner.lock().take()
    }

    /// Append an item. Not observed as a change event.
    pub fn insert(&self, item: T) -> Result<()> {
        self.inner.lock().insert(item)
    }

    /// Replace the first item equal to `old` with `new`, then notify with the
    /// single Updated record.
    pub fn replace_one(&self, old: &T, new: T) -> Result<()> {
        let batch = {
            let mut guard = self.inner.lock();
            let mut next = guard.items();
            let index = next
                .iter()
                .position(|item| item == old)
                .ok_or(StoreError::NotFound)?;
            next[index] = new.clone();
            guard.replace_all(next)?;
            vec![ChangeRecord::updated(new)]
        };
        self.notifier.notify(batch);
        Ok(())
    }

    /// Replace the whole contents with `items`, then notify with the
    /// conservative diff against the previous contents.
    pub fn replace_all(&self, items: Vec<T>) -> Result<()> {
        let batch = {
            let mut guard = self.inner.lock();
            let batch = diff_by_eq(&guard.items(), &items, &UpdatePolicy::AlwaysChanged);
            guard.replace_all(items)?;
            batch
        };
        self.notifier.notify(batch);
        Ok(())
    }

    /// Remove everything, then notify with one Removed record per item.
    pub fn clear(&self) -> Result<()> {
        let batch = {
            let mut guard = self.inner.lock();
            let batch: ChangeBatch<T> = guard.items().into_iter().map(ChangeRecord::removed).collect();
            guard.clear()?;
            batch
        };
        self.notifier.notify(batch);
        Ok(())
    }

    /// Snapshot of the current contents.
    pub fn items(&self) -> Vec<T> {
        self.inner.lock().items()
    }

    /// Iterate over an isolated snapshot: the copy happens under the lock,
    /// the iteration does not, so readers never observe a partially-mutated
    /// state and never block writers.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.items().into_iter()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the one-shot initial load. The provider call suspends outside the
    /// lock; only the begin and commit phases hold it.
    pub async fn load(&self) -> Result<usize> {
        let (seed, cancel) = self.inner.lock().begin_load()?;
        match race_cancellation(&cancel, seed.fetch(cancel.clone())).await {
            Ok(items) => {
                let batch = self.inner.lock().complete_load(items);
                let count = batch.len();
                self.notifier.notify(batch);
                Ok(count)
            }
            Err(err) => {
                self.inner.lock().fail_load(&err);
                Err(err)
            }
        }
    }

    /// Run one update-fetch cycle. The provider call suspends outside the
    /// lock; the diff it returned is applied against the store state current
    /// at commit time.
    pub async fn refresh(&self) -> Result<ChangeBatch<T>> {
        let (updates, snapshot, cancel) = self.inner.lock().begin_refresh()?;
        let fetched = race_cancellation(&cancel, updates.fetch_updates(snapshot, cancel.clone())).await;
        let applied = match fetched {
            Ok(records) => {
                let mut guard = self.inner.lock();
                match guard.apply_updates(records) {
                    Ok(batch) => Ok(batch),
                    Err(err) => {
                        guard.fail_refresh(&err);
                        Err(err)
                    }
                }
            }
            Err(err) => {
                self.inner.lock().fail_refresh(&err);
                Err(err)
            }
        };
        let batch = applied?;
        self.notifier.notify(batch.clone());
        Ok(batch)
    }
}

impl<T: Clone + PartialEq + Send + 'static> Collection<T> for ThreadSafeLoader<T> {
    fn take(&mut self) -> Result<T> {
        ThreadSafeLoader::take(self)
    }

    fn insert(&mut self, item: T) -> Result<()> {
        ThreadSafeLoader::insert(self, item)
    }

    fn replace_one(&mut self, old: &T, new: T) -> Result<()> {
        ThreadSafeLoader::replace_one(self, old, new)
    }

    fn replace_all(&mut self, items: Vec<T>) -> Result<()> {
        ThreadSafeLoader::replace_all(self, items)
    }

    fn clear(&mut self) -> Result<()> {
        ThreadSafeLoader::clear(self)
    }

    fn items(&self) -> Vec<T> {
        ThreadSafeLoader::items(self)
    }

    fn len(&self) -> usize {
        ThreadSafeLoader::len(self)
    }
}

/// The asynchronous surface is disabled by design: a blocking-lock loader
/// cannot honor suspension semantics, so both operations fail fast instead of
/// silently blocking a worker thread.
#[async_trait]
impl<T: Clone + PartialEq + Send + 'static> AsyncCollection<T> for ThreadSafeLoader<T> {
    async fn take_async(&mut self, _cancel: CancellationToken) -> Result<T> {
        Err(LoaderError::Unsupported(
            "take_async on a lock-based loader",
        ))
    }

    async fn insert_async(&mut self, _item: T, _cancel: CancellationToken) -> Result<()> {
        Err(LoaderError::Unsupported(
            "insert_async on a lock-based loader",
        ))
    }
}
