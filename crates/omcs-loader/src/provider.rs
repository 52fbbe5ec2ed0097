//! Asynchronous data-provider contracts consumed by the loader.

use crate::error::ProviderError;
use async_trait::async_trait;
use omcs_diff::ChangeRecord;
use tokio_util::sync::CancellationToken;

/// One-shot source of the initial dataset. Invoked at most once per loader.
#[async_trait]
pub trait SeedProvider<T>: Send + Sync {
    /// Fetch the full initial dataset. Implementations should observe
    /// `cancel` and return promptly once it fires.
    async fn fetch(&self, cancel: CancellationToken) -> Result<Vec<T>, ProviderError>;
}

/// Repeatedly-polled source of incremental changes.
///
/// The provider receives the current snapshot of items and must return a
/// diff relative to it, not raw items. Unchanged records are accepted and
/// discarded before notification.
#[async_trait]
pub trait UpdateProvider<T>: Send + Sync {
    async fn fetch_updates(
        &self,
        current: Vec<T>,
        cancel: CancellationToken,
    ) -> Result<Vec<ChangeRecord<T>>, ProviderError>;
}
