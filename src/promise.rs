//! The single-assignment [`Promise`] cell and its settle/wait primitives.
//!
//! A promise is backed by a capacity-1 slot. Settling puts one
//! [`Result`] into the slot; waiting takes it out again, so each settled
//! value is observed by exactly one reader. Clones of a `Promise` share the
//! same slot and therefore compete for that value.
use crate::cancel::CancelSignal;
use crate::result::Result;
use crate::slot::Slot;
use crate::Error;
use futures::executor::block_on;
use futures::future::{self, Either};
use std::fmt;
use std::sync::Arc;

/// A one-shot cell that eventually holds exactly one [`Result`].
///
/// # Examples
///
/// ```
/// use promise_chain::{CancelSignal, Promise};
/// use std::thread;
///
/// let promise = Promise::<String>::new();
/// let producer = promise.clone();
/// let task = thread::spawn(move || {
///     producer.resolve(&CancelSignal::never(), "🍓".to_owned());
/// });
/// assert_eq!(promise.wait().unwrap(), "🍓");
/// task.join().expect("The task thread has panicked.");
/// ```
pub struct Promise<T> {
    slot: Arc<Slot<Result<T>>>,
}

impl<T> Promise<T> {
    /// A pending promise.
    pub fn new() -> Self {
        Promise {
            slot: Arc::new(Slot::new()),
        }
    }

    /// A promise already settled with `Ok(value)`.
    pub fn resolved(value: T) -> Self {
        let promise = Self::new();
        promise.settle(Ok(value));
        promise
    }

    /// A promise already settled with `Err(err)`.
    pub fn rejected(err: impl Into<Error>) -> Self {
        let promise = Self::new();
        promise.settle(Err(err.into()));
        promise
    }

    /// Delivers `Ok(value)` unless `cancel` fires first. Returns `self`
    /// either way; an abandoned delivery is not retried.
    pub fn resolve(&self, cancel: &CancelSignal, value: T) -> &Self {
        self.try_settle(cancel, Ok(value));
        self
    }

    /// Delivers `Err(err)` unless `cancel` fires first.
    pub fn reject(&self, cancel: &CancelSignal, err: impl Into<Error>) -> &Self {
        self.try_settle(cancel, Err(err.into()));
        self
    }

    /// Delivers `result`, blocking while the slot still holds an undrained
    /// value.
    pub fn settle(&self, result: Result<T>) {
        tracing::trace!(ok = result.is_ok(), "settling promise");
        block_on(self.slot.put(result));
    }

    /// Delivers `result` unless `cancel` fires first, returning whether it
    /// landed. A signal that has already fired always wins.
    pub fn try_settle(&self, cancel: &CancelSignal, result: Result<T>) -> bool {
        let ok = result.is_ok();
        match block_on(future::select(cancel.cancelled(), self.slot.put(result))) {
            Either::Left(_) => {
                tracing::debug!(ok = ok, "delivery abandoned, signal fired first");
                false
            }
            Either::Right(_) => {
                tracing::trace!(ok = ok, "settled promise");
                true
            }
        }
    }

    /// Blocks until a value is available and takes it. Waits forever if
    /// nobody ever settles the promise.
    pub fn wait(&self) -> Result<T> {
        block_on(self.recv())
    }

    /// Blocks until a value is available or `cancel` fires, whichever comes
    /// first. Losing to the signal yields [`Error::Timeout`].
    pub fn wait_with_cancellation(&self, cancel: &CancelSignal) -> Result<T> {
        block_on(self.recv_with_cancellation(cancel))
    }

    /// Async form of [`wait`](Self::wait).
    pub async fn recv(&self) -> Result<T> {
        self.slot.take().await
    }

    /// Async form of [`wait_with_cancellation`](Self::wait_with_cancellation).
    pub async fn recv_with_cancellation(&self, cancel: &CancelSignal) -> Result<T> {
        match future::select(cancel.cancelled(), self.slot.take()).await {
            Either::Left(_) => {
                tracing::debug!("wait abandoned, signal fired first");
                Err(Error::Timeout)
            }
            Either::Right((result, _)) => result,
        }
    }

    /// Whether a settled value is sitting in the slot, not yet taken.
    pub fn is_ready(&self) -> bool {
        self.slot.is_occupied()
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Promise {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("ready", &self.is_ready())
            .finish()
    }
}
