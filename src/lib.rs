//! Cancellable, chainable one-shot promises.
//!
//! A [`Promise`] is a single-assignment cell that eventually holds one
//! [`Result`]. Producers settle it with [`Promise::resolve`] or
//! [`Promise::reject`], racing a [`CancelSignal`]. Consumers block with
//! [`Promise::wait`], chain with [`Promise::then`], observe failures with
//! [`Promise::catch`], or gather many promises with [`all`].
//!
//! # Examples
//!
//! ```
//! use promise_chain::{CancelSignal, Promise};
//! use std::time::Duration;
//!
//! let signal = CancelSignal::with_timeout(Duration::from_secs(1));
//! let doubled = Promise::new()
//!     .resolve(&signal, 21)
//!     .then(&signal, |_, x| Ok(x * 2));
//! assert_eq!(doubled.wait().unwrap(), 42);
//! ```
use std::sync::Arc;

pub mod all;
pub mod cancel;
pub mod chain;
pub mod promise;
pub mod result;
mod slot;
mod task;

pub use all::all;
pub use cancel::{CancelSignal, Cancelled};
pub use promise::Promise;
pub use result::{Result, ResultExt};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A race against a [`CancelSignal`] was lost.
    #[error("timeout exceeded")]
    Timeout,
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Source(Arc<dyn std::error::Error + Send + Sync>),
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("failed to spawn task: {0}")]
    Spawn(Arc<std::io::Error>),
}

impl Error {
    /// An error carrying only `message`.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }

    /// Wraps a foreign error, keeping it reachable through `source()`.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Source(Arc::new(err))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Message(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Message(message.to_owned())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::other(err)
    }
}
