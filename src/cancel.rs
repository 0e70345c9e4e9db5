//! Cancellation signals shared by every stage of a promise pipeline.
//!
//! A [`CancelSignal`] fires at most once and stays fired. Any number of
//! clones may observe it, either by blocking on [`CancelSignal::wait`] or
//! by awaiting [`CancelSignal::cancelled`].
use parking_lot::Mutex;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Waker};
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};

/// A cloneable, idempotent "abandon this work" notification.
///
/// # Examples
///
/// ```
/// use promise_chain::CancelSignal;
///
/// let signal = CancelSignal::new();
/// let observer = signal.clone();
/// signal.cancel();
/// signal.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancelSignal {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    fired: bool,
    deadline: Option<Instant>,
    next_waiter: u64,
    wakers: Vec<(u64, Waker)>,
    children: Vec<Weak<Mutex<Inner>>>,
    timer: Option<Thread>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Lets a parked timer notice that nobody can observe it any more.
        if let Some(timer) = self.timer.take() {
            timer.unpark();
        }
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::with_inner(None)
    }

    /// A signal that is only fired by an explicit [`cancel`](Self::cancel).
    /// The non-cancellable constructors use one nobody else can reach.
    pub fn never() -> Self {
        Self::new()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Fires on its own once `deadline` passes.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::armed(deadline).0
    }

    /// A signal fired together with `self`. Cancelling the child leaves
    /// the parent untouched.
    pub fn child(&self) -> Self {
        let mut parent = self.inner.lock();
        let child = Self::with_inner(parent.deadline);
        if parent.fired {
            drop(parent);
            child.cancel();
        } else {
            parent.children.retain(|c| c.strong_count() > 0);
            parent.children.push(Arc::downgrade(&child.inner));
        }
        child
    }

    pub fn cancel(&self) {
        fire(&self.inner);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().fired
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.lock().deadline
    }

    /// Resolves once the signal has fired.
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            inner: self.inner.clone(),
            waiter: None,
        }
    }

    /// Blocks the calling thread until the signal fires.
    pub fn wait(&self) {
        futures::executor::block_on(self.cancelled())
    }

    fn with_inner(deadline: Option<Instant>) -> Self {
        CancelSignal {
            inner: Arc::new(Mutex::new(Inner {
                fired: false,
                deadline,
                next_waiter: 0,
                wakers: vec![],
                children: vec![],
                timer: None,
            })),
        }
    }

    /// A deadline signal together with its timer thread, if one started.
    /// The timer exits once the signal fires or the last handle is dropped.
    fn armed(deadline: Instant) -> (Self, Option<JoinHandle<()>>) {
        let signal = Self::with_inner(Some(deadline));
        let weak = Arc::downgrade(&signal.inner);
        let spawned = thread::Builder::new()
            .name("cancel-timer".into())
            .spawn(move || run_timer(weak, deadline));
        match spawned {
            Ok(handle) => {
                let mut inner = signal.inner.lock();
                if !inner.fired {
                    inner.timer = Some(handle.thread().clone());
                }
                drop(inner);
                (signal, Some(handle))
            }
            Err(err) => {
                // Without a timer the deadline could never be observed.
                tracing::warn!(error = %err, "failed to spawn cancel timer, firing now");
                signal.cancel();
                (signal, None)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn waiter_count(&self) -> usize {
        self.inner.lock().wakers.len()
    }
}

fn run_timer(weak: Weak<Mutex<Inner>>, deadline: Instant) {
    loop {
        let inner = match weak.upgrade() {
            Some(inner) => inner,
            None => return,
        };
        if inner.lock().fired {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::trace!("deadline reached");
            fire(&inner);
            return;
        }
        drop(inner);
        thread::park_timeout(deadline - now);
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

fn fire(inner: &Mutex<Inner>) {
    let mut state = inner.lock();
    if state.fired {
        return;
    }
    state.fired = true;
    let wakers = mem::take(&mut state.wakers);
    let children = mem::take(&mut state.children);
    let timer = state.timer.take();
    drop(state);
    wakers.into_iter().for_each(|(_, waker)| waker.wake());
    if let Some(timer) = timer {
        timer.unpark();
    }
    for child in children.iter().filter_map(Weak::upgrade) {
        fire(&child);
    }
}

/// Future returned by [`CancelSignal::cancelled`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Cancelled {
    inner: Arc<Mutex<Inner>>,
    waiter: Option<u64>,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let mut inner = this.inner.lock();
        if inner.fired {
            return Poll::Ready(());
        }
        let registered = this
            .waiter
            .and_then(|id| inner.wakers.iter_mut().find(|(waiter, _)| *waiter == id));
        match registered {
            Some((_, waker)) => {
                if !waker.will_wake(cx.waker()) {
                    *waker = cx.waker().clone();
                }
            }
            None => {
                let id = inner.next_waiter;
                inner.next_waiter += 1;
                inner.wakers.push((id, cx.waker().clone()));
                this.waiter = Some(id);
            }
        }
        Poll::Pending
    }
}

impl Drop for Cancelled {
    fn drop(&mut self) {
        if let Some(id) = self.waiter {
            self.inner.lock().wakers.retain(|(waiter, _)| *waiter != id);
        }
    }
}
