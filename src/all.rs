//! Fan-in of many promises into one.
use crate::cancel::CancelSignal;
use crate::promise::Promise;
use crate::result::Result;
use crate::task;

/// Gathers the outcomes of `promises` into a single promise.
///
/// One worker per input waits on it unconditionally. Once every worker is
/// done, the output is resolved with the outcomes in input order, racing
/// `cancel`. Individual failures stay inside the vector; the aggregate
/// itself is always `Ok`. If `cancel` wins that final race the output is
/// never settled, so bound any wait on it with
/// [`Promise::wait_with_cancellation`].
///
/// # Examples
///
/// ```
/// use promise_chain::{all, CancelSignal, Error, Promise};
///
/// let signal = CancelSignal::never();
/// let inputs = [
///     Promise::resolved(1),
///     Promise::rejected(Error::msg("e")),
///     Promise::resolved(3),
/// ];
/// let outcomes = all(&signal, &inputs).wait().unwrap();
/// assert_eq!(outcomes.len(), 3);
/// assert!(outcomes[1].is_err());
/// ```
pub fn all<T: Send + 'static>(cancel: &CancelSignal, promises: &[Promise<T>]) -> Promise<Vec<Result<T>>> {
    let out = Promise::new();
    let inputs = promises.to_vec();
    let producer = out.clone();
    let cancel = cancel.clone();
    // Workers start from the coordinator, so a coordinator that never runs
    // leaves every input untouched.
    let spawned = task::spawn("promise-all", move || {
        let workers: Vec<_> = inputs
            .into_iter()
            .enumerate()
            .map(|(i, promise)| task::spawn(format!("promise-all-worker-{i}"), move || promise.wait()))
            .collect();
        let outcomes: Vec<Result<T>> = workers
            .into_iter()
            .map(|worker| match worker {
                Ok(handle) => handle.join().unwrap_or_else(|payload| Err(task::panicked(payload))),
                Err(err) => Err(err),
            })
            .collect();
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        tracing::trace!(total = outcomes.len(), failed = failed, "all workers done");
        producer.resolve(&cancel, outcomes);
    });
    match spawned {
        Ok(_) => out,
        Err(err) => Promise::rejected(err),
    }
}
