//! A bounded cell holding at most one value. Senders wait for room,
//! receivers wait for a value; taking the value empties the cell again.
use parking_lot::Mutex;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

#[derive(Debug)]
pub(crate) struct Slot<T> {
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    value: Option<T>,
    receivers: Vec<Waker>,
    senders: Vec<Waker>,
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Slot {
            inner: Mutex::new(Inner {
                value: None,
                receivers: vec![],
                senders: vec![],
            }),
        }
    }

    /// Resolves once `value` has been placed in the slot.
    pub(crate) fn put(&self, value: T) -> Put<'_, T> {
        Put {
            slot: self,
            value: Some(value),
        }
    }

    /// Resolves with the value, leaving the slot empty.
    pub(crate) fn take(&self) -> Take<'_, T> {
        Take { slot: self }
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.inner.lock().value.is_some()
    }
}

fn register(wakers: &mut Vec<Waker>, waker: &Waker) {
    if !wakers.iter().any(|w| w.will_wake(waker)) {
        wakers.push(waker.clone());
    }
}

#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub(crate) struct Put<'a, T> {
    slot: &'a Slot<T>,
    value: Option<T>,
}

// `value` is never pinned structurally.
impl<T> Unpin for Put<'_, T> {}

impl<T> Future for Put<'_, T> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let value = match this.value.take() {
            Some(value) => value,
            None => return Poll::Ready(()),
        };
        let mut inner = this.slot.inner.lock();
        if inner.value.is_some() {
            register(&mut inner.senders, cx.waker());
            this.value = Some(value);
            return Poll::Pending;
        }
        inner.value = Some(value);
        let receivers = mem::take(&mut inner.receivers);
        drop(inner);
        receivers.into_iter().for_each(Waker::wake);
        Poll::Ready(())
    }
}

#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub(crate) struct Take<'a, T> {
    slot: &'a Slot<T>,
}

impl<T> Future for Take<'_, T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.slot.inner.lock();
        match inner.value.take() {
            Some(value) => {
                let senders = mem::take(&mut inner.senders);
                drop(inner);
                senders.into_iter().for_each(Waker::wake);
                Poll::Ready(value)
            }
            None => {
                register(&mut inner.receivers, cx.waker());
                Poll::Pending
            }
        }
    }
}
