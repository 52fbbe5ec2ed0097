//! Change-notification dispatch.

use omcs_diff::ChangeRecord;
use std::sync::Arc;
use tokio::sync::broadcast;

/// The ordered change records emitted by one mutation.
pub type ChangeBatch<T> = Vec<ChangeRecord<T>>;

/// Marshals notification callbacks onto a designated execution context, e.g.
/// a UI thread. Without one, delivery runs synchronously on the mutating
/// thread.
pub trait DispatchContext: Send + Sync {
    fn post(&self, callback: Box<dyn FnOnce() + Send>);
}

/// Fan-out point for change batches. Subscribers attach through a broadcast
/// channel and receive one batch per mutation.
pub struct Notifier<T> {
    event_tx: broadcast::Sender<ChangeBatch<T>>,
    context: Option<Arc<dyn DispatchContext>>,
}

impl<T: Clone + Send + 'static> Notifier<T> {
    pub fn new(context: Option<Arc<dyn DispatchContext>>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self { event_tx, context }
    }

    /// Subscribe to change batches.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeBatch<T>> {
        self.event_tx.subscribe()
    }

    /// Deliver one batch. Unchanged records are dropped first; a batch with
    /// nothing left is not delivered at all.
    pub fn notify(&self, batch: ChangeBatch<T>) {
        let batch: ChangeBatch<T> = batch.into_iter().filter(ChangeRecord::is_change).collect();
        if batch.is_empty() {
            return;
        }
        tracing::debug!(records = batch.len(), "dispatching change batch");

        match &self.context {
            Some(context) => {
                let event_tx = self.event_tx.clone();
                context.post(Box::new(move || {
                    let _ = event_tx.send(batch);
                }));
            }
            None => {
                let _ = self.event_tx.send(batch);
            }
        }
    }
}

impl<T> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self {
            event_tx: self.event_tx.clone(),
            context: self.context.clone(),
        }
    }
}
