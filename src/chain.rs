//! Sequential transformation and failure observation on top of [`Promise`].
use crate::cancel::CancelSignal;
use crate::promise::Promise;
use crate::result::Result;
use crate::{task, Error};

impl<T: Send + 'static> Promise<T> {
    /// Feeds the settled value of `self` through `transform`.
    ///
    /// The caller blocks until `self` settles or `cancel` fires. An upstream
    /// error, or the signal firing first, yields an already rejected
    /// promise and `transform` never runs. Otherwise `transform` runs on its
    /// own thread and the returned promise receives its result, unless
    /// `cancel` fires before that result arrives, in which case it receives
    /// [`Error::Timeout`].
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{CancelSignal, Promise};
    /// use std::time::Duration;
    ///
    /// let signal = CancelSignal::with_timeout(Duration::from_secs(1));
    /// let out = Promise::resolved(10).then(&signal, |_, x| Ok(x * 10));
    /// assert_eq!(out.wait().unwrap(), 100);
    /// ```
    pub fn then<U, F>(&self, cancel: &CancelSignal, transform: F) -> Promise<U>
    where
        U: Send + 'static,
        F: FnOnce(&CancelSignal, T) -> Result<U> + Send + 'static,
    {
        let value = match self.wait_with_cancellation(cancel) {
            Ok(value) => value,
            Err(err) => return Promise::rejected(err),
        };

        let out = Promise::new();
        let staged = Promise::new();
        let producer = staged.clone();
        let transform_cancel = cancel.clone();
        let spawned = task::spawn("promise-transform", move || {
            let result = task::guarded(|| transform(&transform_cancel, value));
            producer.settle(result);
        });
        if let Err(err) = spawned {
            return Promise::rejected(err);
        }

        let consumer = out.clone();
        let cancel = cancel.clone();
        let spawned = task::spawn("promise-then", move || {
            consumer.settle(staged.wait_with_cancellation(&cancel));
        });
        match spawned {
            Ok(_) => out,
            Err(err) => Promise::rejected(err),
        }
    }

    /// Calls `on_error` once if `self` settles with an error.
    ///
    /// The observer takes the settled value out of the slot, so it competes
    /// with every other reader of `self`; a value it takes is not put back.
    /// Only attach `catch` to a promise nobody else waits on.
    ///
    /// The observer runs on its own thread. If that thread cannot be
    /// spawned the failure is logged at `warn` level and `on_error` is
    /// never called.
    pub fn catch<F>(&self, on_error: F) -> &Self
    where
        F: FnOnce(Error) + Send + 'static,
    {
        let observed = self.clone();
        let _ = task::spawn("promise-catch", move || {
            if let Err(err) = observed.wait() {
                on_error(err);
            }
        });
        self
    }
}
