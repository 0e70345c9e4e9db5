use crate::Error;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Spawns `f` on a named OS thread.
pub(crate) fn spawn<F, R>(name: impl Into<String>, f: F) -> Result<JoinHandle<R>, Error>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let name = name.into();
    #[cfg(test)]
    {
        if failing::matches(&name) {
            let err = std::io::Error::new(std::io::ErrorKind::Other, "spawn refused");
            tracing::warn!(task = %name, error = %err, "failed to spawn task");
            return Err(Error::Spawn(Arc::new(err)));
        }
    }
    thread::Builder::new().name(name.clone()).spawn(f).map_err(|err| {
        tracing::warn!(task = %name, error = %err, "failed to spawn task");
        Error::Spawn(Arc::new(err))
    })
}

/// Runs `f`, turning a panic into [`Error::Panicked`].
pub(crate) fn guarded<T>(f: impl FnOnce() -> crate::Result<T>) -> crate::Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(panicked(payload)))
}

pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Error {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    };
    tracing::warn!(message = %message, "task panicked");
    Error::Panicked(message)
}
