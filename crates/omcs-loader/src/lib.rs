//! Load/poll orchestration and thread-safe observable decoration for the
//! Larimar observable mirror collection store.
//!
//! A [`Loader`] owns an [`omcs_store::OrderedStore`], runs the one-shot
//! initial load and repeated update-fetch cycles against it, and raises one
//! change batch per mutation. [`ThreadSafeLoader`] decorates it with a
//! mutual-exclusion lock, snapshot-isolated iteration and conservative
//! diff-based notification for concurrent callers.
//!
//! # Quick Start
//!
//! ```rust
//! use omcs_loader::{Loader, ThreadSafeLoader};
//! use omcs_store::StorageStrategy;
//!
//! let loader = ThreadSafeLoader::new(
//!     Loader::builder()
//!         .strategy(StorageStrategy::List)
//!         .initial_items(vec!["a", "b", "c"])
//!         .build(),
//! );
//!
//! let mut events = loader.subscribe();
//! loader.replace_all(vec!["b", "d"]).unwrap();
//!
//! // One batch per mutation: b Updated, d Added, a and c Removed.
//! let batch = events.try_recv().unwrap();
//! assert_eq!(batch.len(), 4);
//! ```
//!
//! # Architecture
//!
//! - [`loader`] - lifecycle, builder and the unsynchronized baseline
//! - [`threadsafe`] - the lock-scoped decorator
//! - [`facade`] - asynchronous calling convention over non-blocking stores
//! - [`provider`] - seed and update-fetch provider contracts
//! - [`notify`] - change-batch dispatch and the execution-context seam
//! - [`poll`] - default fixed-interval polling driver
//! - [`error`] - error types

pub mod error;
pub mod facade;
pub mod loader;
pub mod notify;
pub mod poll;
pub mod provider;
pub mod threadsafe;

pub use error::{LoaderError, ProviderError, Result};
pub use facade::{AsyncCollection, AsyncFacade};
pub use loader::{Collection, Loader, LoaderBuilder, LoaderState};
pub use notify::{ChangeBatch, DispatchContext, Notifier};
pub use poll::{PollConfig, PollConfigBuilder, PollDriver};
pub use provider::{SeedProvider, UpdateProvider};
pub use threadsafe::ThreadSafeLoader;

// Re-export the record types change batches are made of.
pub use omcs_diff::{ChangeKind, ChangeRecord, UpdatePolicy};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::LoaderError;
    pub use crate::facade::{AsyncCollection, AsyncFacade};
    pub use crate::loader::{Collection, Loader, LoaderState};
    pub use crate::poll::{PollConfig, PollDriver};
    pub use crate::provider::{SeedProvider, UpdateProvider};
    pub use crate::threadsafe::ThreadSafeLoader;
    pub use omcs_diff::{ChangeKind, ChangeRecord};
    pub use omcs_store::StorageStrategy;
}
