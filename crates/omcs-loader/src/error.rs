//! Error types for the loader layer.

use omcs_store::StoreError;
use thiserror::Error;

/// Opaque failure type providers may surface.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by loader operations.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Store-level failure, surfaced synchronously and never retried.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The root cancellation handle was signaled. Takes precedence over a
    /// concurrent provider error.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation is not available on this loader.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The operation is not valid in the current lifecycle state.
    #[error("operation invalid in lifecycle state `{0}`")]
    Lifecycle(&'static str),

    /// Failure surfaced verbatim from a data provider. The caller owns
    /// retry/backoff policy.
    #[error("provider error: {0}")]
    Provider(#[source] ProviderError),
}

impl LoaderError {
    /// Whether this error came from the cancellation handle.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoaderError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
