//! Adapter giving a synchronous collection an asynchronous calling
//! convention.

use crate::error::Result;
use crate::loader::Collection;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// The asynchronous-flavored collection surface.
///
/// Whether the operations actually suspend is an implementation capability:
/// the [`AsyncFacade`] completes immediately, while the lock-based loader
/// rejects these calls outright with `Unsupported`.
#[async_trait]
pub trait AsyncCollection<T: Clone + PartialEq>: Send {
    /// Remove and return the logically-first item.
    async fn take_async(&mut self, cancel: CancellationToken) -> Result<T>;

    /// Append an item at the logical end.
    async fn insert_async(&mut self, item: T, cancel: CancellationToken) -> Result<()>;
}

/// Wraps a non-blocking synchronous collection so callers written against the
/// asynchronous convention can use it without branching. Pure adaptation
/// layer with no state of its own; every operation completes immediately.
pub struct AsyncFacade<C> {
    inner: C,
}

impl<C> AsyncFacade<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<T, C> AsyncCollection<T> for AsyncFacade<C>
where
    T: Clone + PartialEq + Send + 'static,
    C: Collection<T>,
{
    /// Completes immediately. The token is accepted but ignored since the
    /// backing collection never blocks.
    async fn take_async(&mut self, _cancel: CancellationToken) -> Result<T> {
        self.inner.take()
    }

    async fn insert_async(&mut self, item: T, _cancel: CancellationToken) -> Result<()> {
        self.inner.insert(item)
    }
}
