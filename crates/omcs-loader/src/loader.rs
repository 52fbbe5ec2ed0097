//! Unsynchronized loader: load/poll lifecycle orchestration plus the unified
//! collection surface.
//!
//! This baseline assumes single-threaded or externally-serialized access. It
//! exists to host the lifecycle and notification wiring; the thread-safe
//! decorator in [`crate::threadsafe`] adds mutual exclusion and diff-based
//! notification on top.

use crate::error::{LoaderError, ProviderError, Result};
use crate::notify::{ChangeBatch, DispatchContext, Notifier};
use crate::provider::{SeedProvider, UpdateProvider};
use omcs_diff::{ChangeKind, ChangeRecord};
use omcs_store::{OrderedStore, StorageStrategy, StoreError};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a loader instance.
///
/// `Uninitialized → Loading → Ready → (Polling ⇄ Ready)`, with `Cancelled`
/// reachable from any state once the root token fires. No store mutation or
/// notification happens after `Cancelled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderState {
    Uninitialized,
    Loading,
    Ready,
    Polling,
    Cancelled,
}

impl LoaderState {
    pub fn name(self) -> &'static str {
        match self {
            LoaderState::Uninitialized => "uninitialized",
            LoaderState::Loading => "loading",
            LoaderState::Ready => "ready",
            LoaderState::Polling => "polling",
            LoaderState::Cancelled => "cancelled",
        }
    }
}

/// The synchronous collection surface shared by the loader flavors.
pub trait Collection<T: Clone + PartialEq>: Send {
    /// Remove and return the logically-first item.
    fn take(&mut self) -> Result<T>;

    /// Append an item at the logical end.
    fn insert(&mut self, item: T) -> Result<()>;

    /// Replace the first item equal to `old` with `new`, preserving position.
    fn replace_one(&mut self, old: &T, new: T) -> Result<()>;

    /// Replace the whole contents with `items` in order.
    fn replace_all(&mut self, items: Vec<T>) -> Result<()>;

    /// Remove everything.
    fn clear(&mut self) -> Result<()>;

    /// Snapshot of the current contents in order.
    fn items(&self) -> Vec<T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Race a provider future against the cancellation handle. Cancellation wins
/// even when the provider finishes with an error at the same time.
pub(crate) async fn race_cancellation<R, F>(cancel: &CancellationToken, fut: F) -> Result<R>
where
    F: Future<Output = std::result::Result<R, ProviderError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LoaderError::Cancelled),
        result = fut => {
            if cancel.is_cancelled() {
                Err(LoaderError::Cancelled)
            } else {
                result.map_err(LoaderError::Provider)
            }
        }
    }
}

/// Builder for a [`Loader`].
pub struct LoaderBuilder<T> {
    strategy: StorageStrategy,
    store: Option<Box<dyn OrderedStore<T>>>,
    initial: Vec<T>,
    seed: Option<Arc<dyn SeedProvider<T>>>,
    updates: Option<Arc<dyn UpdateProvider<T>>>,
    context: Option<Arc<dyn DispatchContext>>,
    cancel: Option<CancellationToken>,
}

impl<T: Clone + PartialEq + Send + 'static> LoaderBuilder<T> {
    pub fn new() -> Self {
        Self {
            strategy: StorageStrategy::default(),
            store: None,
            initial: Vec::new(),
            seed: None,
            updates: None,
            context: None,
            cancel: None,
        }
    }

    /// Select the backing-storage strategy.
    pub fn strategy(mut self, strategy: StorageStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use a custom store instead of a built-in strategy.
    pub fn store(mut self, store: Box<dyn OrderedStore<T>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Seed the store with `items` at construction.
    pub fn initial_items(mut self, items: Vec<T>) -> Self {
        self.initial = items;
        self
    }

    /// Configure the one-shot initial-data provider.
    pub fn seed_provider(mut self, provider: Arc<dyn SeedProvider<T>>) -> Self {
        self.seed = Some(provider);
        self
    }

    /// Configure the update-fetch provider.
    pub fn update_provider(mut self, provider: Arc<dyn UpdateProvider<T>>) -> Self {
        self.updates = Some(provider);
        self
    }

    /// Marshal notifications through `context` instead of delivering them on
    /// the mutating thread.
    pub fn dispatch_context(mut self, context: Arc<dyn DispatchContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach an externally-owned root cancellation token.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Loader<T> {
        let store = match self.store {
            Some(store) => store,
            None => self.strategy.build(self.initial),
        };
        // With no seed provider there is nothing to load; the loader is
        // immediately usable.
        let state = if self.seed.is_some() {
            LoaderState::Uninitialized
        } else {
            LoaderState::Ready
        };
        Loader {
            store,
            seed: self.seed,
            updates: self.updates,
            notifier: Notifier::new(self.context),
            state,
            cancel: self.cancel.unwrap_or_default(),
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Default for LoaderBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates one-time initial load and repeated update-fetch cycles
/// against an exclusively-owned [`OrderedStore`], and raises change
/// notifications.
pub struct Loader<T> {
    store: Box<dyn OrderedStore<T>>,
    seed: Option<Arc<dyn SeedProvider<T>>>,
    updates: Option<Arc<dyn UpdateProvider<T>>>,
    notifier: Notifier<T>,
    state: LoaderState,
    cancel: CancellationToken,
}

impl<T: Clone + PartialEq + Send + 'static> Loader<T> {
    pub fn builder() -> LoaderBuilder<T> {
        LoaderBuilder::new()
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Clone of the root cancellation token.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signal the root token: in-flight provider calls abort promptly and no
    /// further cycles start.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.state = LoaderState::Cancelled;
        tracing::debug!("loader cancelled");
    }

    /// Subscribe to change batches.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeBatch<T>> {
        self.notifier.subscribe()
    }

    pub(crate) fn notifier(&self) -> &Notifier<T> {
        &self.notifier
    }

    /// Live traversal of the current contents.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        self.store.iter()
    }

    // --- split-phase load/refresh -------------------------------------------
    //
    // The suspending provider call sits between a sync `begin_*` and a sync
    // `complete/apply` step, so a decorating wrapper can run it without
    // holding any lock.

    /// Begin the one-shot initial load, returning the provider and token to
    /// await with.
    pub fn begin_load(&mut self) -> Result<(Arc<dyn SeedProvider<T>>, CancellationToken)> {
        if self.cancel.is_cancelled() {
            self.state = LoaderState::Cancelled;
            return Err(LoaderError::Cancelled);
        }
        if self.state != LoaderState::Uninitialized {
            return Err(LoaderError::Lifecycle(self.state.name()));
        }
        let seed = self
            .seed
            .clone()
            .ok_or(LoaderError::Unsupported("no seed provider configured"))?;
        self.state = LoaderState::Loading;
        tracing::debug!("initial load started");
        Ok((seed, self.cancel.clone()))
    }

    /// Commit a successful initial load and return the Added batch to notify
    /// with.
    pub fn complete_load(&mut self, items: Vec<T>) -> ChangeBatch<T> {
        let batch: ChangeBatch<T> = items.iter().cloned().map(ChangeRecord::added).collect();
        self.store.replace_all(items);
        self.state = LoaderState::Ready;
        tracing::debug!(items = batch.len(), "initial load complete");
        batch
    }

    /// Record a failed load attempt. Cancellation is terminal; a provider
    /// failure leaves the lifecycle in Loading for the initiator to retry.
    pub fn fail_load(&mut self, err: &LoaderError) {
        if err.is_cancelled() {
            self.state = LoaderState::Cancelled;
        } else {
            tracing::warn!(error = %err, "initial load failed");
        }
    }

    /// Begin one update-fetch cycle, returning the provider, the snapshot it
    /// must diff against, and the token.
    #[allow(clippy::type_complexity)]
    pub fn begin_refresh(
        &mut self,
    ) -> Result<(Arc<dyn UpdateProvider<T>>, Vec<T>, CancellationToken)> {
        if self.cancel.is_cancelled() {
            self.state = LoaderState::Cancelled;
            return Err(LoaderError::Cancelled);
        }
        if self.state != LoaderState::Ready {
            return Err(LoaderError::Lifecycle(self.state.name()));
        }
        let updates = self
            .updates
            .clone()
            .ok_or(LoaderError::Unsupported("no update provider configured"))?;
        self.state = LoaderState::Polling;
        Ok((updates, self.store.snapshot(), self.cancel.clone()))
    }

    /// Apply a fetched diff and return the records to notify with.
    ///
    /// The next contents are computed in full before the store is touched, so
    /// a failed record leaves the store exactly as it was.
    pub fn apply_updates(&mut self, records: Vec<ChangeRecord<T>>) -> Result<ChangeBatch<T>> {
        let next = Self::project(self.store.snapshot(), &records)?;
        self.store.replace_all(next);
        self.state = LoaderState::Ready;
        let batch: ChangeBatch<T> = records.into_iter().filter(ChangeRecord::is_change).collect();
        tracing::debug!(records = batch.len(), "update cycle applied");
        Ok(batch)
    }

    /// Record a failed refresh cycle. Cancellation is terminal; otherwise the
    /// loader returns to Ready so the external driver can retry on its own
    /// schedule.
    pub fn fail_refresh(&mut self, err: &LoaderError) {
        if err.is_cancelled() {
            self.state = LoaderState::Cancelled;
        } else {
            self.state = LoaderState::Ready;
            tracing::warn!(error = %err, "update cycle failed");
        }
    }

    /// Project `records` onto `current`: Added appends, Updated overwrites
    /// the first match, Removed deletes the first match, Unchanged is a
    /// no-op.
    fn project(mut current: Vec<T>, records: &[ChangeRecord<T>]) -> Result<Vec<T>> {
        for record in records {
            match record.kind {
                ChangeKind::Added => current.push(record.item.clone()),
                ChangeKind::Updated => {
                    let index = current
                        .iter()
                        .position(|item| item == &record.item)
                        .ok_or(StoreError::NotFound)?;
                    current[index] = record.item.clone();
                }
                ChangeKind::Removed => {
                    let index = current
                        .iter()
                        .position(|item| item == &record.item)
                        .ok_or(StoreError::NotFound)?;
                    current.remove(index);
                }
                ChangeKind::Unchanged => {}
            }
        }
        Ok(current)
    }

    // --- whole-cycle entry points -------------------------------------------

    /// Run the one-shot initial load to completion, including notification.
    /// Returns the number of loaded items.
    pub async fn load(&mut self) -> Result<usize> {
        let (seed, cancel) = self.begin_load()?;
        match race_cancellation(&cancel, seed.fetch(cancel.clone())).await {
            Ok(items) => {
                let batch = self.complete_load(items);
                let count = batch.len();
                self.notifier.notify(batch);
                Ok(count)
            }
            Err(err) => {
                self.fail_load(&err);
                Err(err)
            }
        }
    }

    /// Run one update-fetch cycle to completion, including notification.
    /// Returns the emitted (non-Unchanged) records.
    pub async fn refresh(&mut self) -> Result<ChangeBatch<T>> {
        let (updates, snapshot, cancel) = self.begin_refresh()?;
        let applied = race_cancellation(&cancel, updates.fetch_updates(snapshot, cancel.clone()))
            .await
            .and_then(|records| self.apply_updates(records));
        match applied {
            Ok(batch) => {
                self.notifier.notify(batch.clone());
                Ok(batch)
            }
            Err(err) => {
                self.fail_refresh(&err);
                Err(err)
            }
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Collection<T> for Loader<T> {
    fn take(&mut self) -> Result<T> {
        Ok(self.store.remove_next()?)
    }

    fn insert(&mut self, item: T) -> Result<()> {
        self.store.insert(item);
        Ok(())
    }

    fn replace_one(&mut self, old: &T, new: T) -> Result<()> {
        Ok(self.store.replace_one(old, new)?)
    }

    fn replace_all(&mut self, items: Vec<T>) -> Result<()> {
        self.store.replace_all(items);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.store.clear();
        Ok(())
    }

    fn items(&self) -> Vec<T> {
        self.store.snapshot()
    }

    fn len(&self) -> usize {
        self.store.len()
    }
}
