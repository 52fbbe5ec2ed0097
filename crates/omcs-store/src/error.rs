//! Error types for the storage layer.

use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("cannot remove from an empty collection")]
    EmptyCollection,

    #[error("no element matches the replacement target")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, StoreError>;
