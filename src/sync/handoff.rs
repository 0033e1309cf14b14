//! Blocking hand-off queue for cross-thread value transport.
//!
//! A mutex + condition-variable protected queue with blocking receive and
//! notify-on-send. Built for the traffic-light actor's producer/consumer
//! hand-off, but generic over the payload type.
//!
//! # Overview
//!
//! - [`HandoffQueue::send`] - Appends a value and wakes one blocked receiver.
//!   Never blocks beyond an O(1) critical section.
//! - [`HandoffQueue::recv`] - Blocks until a value is available (or the queue
//!   is closed) and takes ownership of it.
//! - [`HandoffQueue::close`] - Wakes every blocked receiver; subsequent
//!   receives drain remaining values, then report [`RecvError::Closed`].
//!
//! # Ordering
//!
//! Removal takes the **most recently sent** value first (stack discipline),
//! reproducing the reference traffic-light behavior. With a single in-flight
//! value per cycle, which is how the actor uses the queue, this is
//! indistinguishable from FIFO.
//!
//! # Liveness
//!
//! `recv` waits unboundedly: if nothing is ever sent and the queue is never
//! closed, the call never returns. Callers that cannot tolerate that should
//! use [`HandoffQueue::recv_timeout`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use crossing::sync::handoff::HandoffQueue;
//!
//! let queue = Arc::new(HandoffQueue::new());
//!
//! let receiver = {
//!     let queue = Arc::clone(&queue);
//!     std::thread::spawn(move || queue.recv())
//! };
//!
//! queue.send(42u64);
//! assert_eq!(receiver.join().unwrap(), Ok(42));
//! ```

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use minstant::Instant;
use thiserror::Error;

use crate::trace::trace;

/// Error returned by [`HandoffQueue::recv`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The queue was closed and all pending values have been drained.
    #[error("hand-off queue closed")]
    Closed,
}

/// Error returned by [`HandoffQueue::recv_timeout`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeoutError {
    /// No value arrived within the timeout.
    #[error("timed out waiting for a value")]
    Timeout,
    /// The queue was closed and all pending values have been drained.
    #[error("hand-off queue closed")]
    Closed,
}

/// Error returned by [`HandoffQueue::try_recv`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// The queue holds no value right now.
    #[error("hand-off queue empty")]
    Empty,
    /// The queue was closed and all pending values have been drained.
    #[error("hand-off queue closed")]
    Closed,
}

/// Lock-protected queue state.
struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Thread-safe blocking hand-off queue.
///
/// Any number of threads may send and receive concurrently. With more than
/// one blocked receiver, which receiver obtains which value is unspecified;
/// each value is delivered to exactly one receiver.
pub struct HandoffQueue<T> {
    inner: Mutex<Inner<T>>,
    /// Signaled when the queue transitions to non-empty, or on close.
    available: Condvar,
}

impl<T> HandoffQueue<T> {
    /// Creates an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Acquires the state lock, recovering from poisoning.
    ///
    /// Every mutation leaves `Inner` structurally valid, so a receiver can
    /// safely continue after a sender panicked while holding the lock.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `value` and wakes one blocked receiver.
    ///
    /// Ownership of `value` transfers into the queue. Sending never blocks
    /// beyond the append itself. Values sent after [`close`](Self::close)
    /// are discarded.
    pub fn send(&self, value: T) {
        let mut inner = self.lock();
        if inner.closed {
            trace!("send on closed queue discarded");
            return;
        }
        inner.items.push_back(value);
        drop(inner);
        self.available.notify_one();
    }

    /// Blocks until a value is available, then takes the most recent one.
    ///
    /// The wait re-checks its predicate on every wakeup, so spurious
    /// condition-variable wakeups are harmless. The wait is unbounded; see
    /// the module docs on liveness.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Closed`] once the queue is closed and empty.
    pub fn recv(&self) -> Result<T, RecvError> {
        let mut inner = self.lock();
        loop {
            if let Some(value) = inner.items.pop_back() {
                return Ok(value);
            }
            if inner.closed {
                return Err(RecvError::Closed);
            }
            inner = self
                .available
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`recv`](Self::recv), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RecvTimeoutError::Timeout`] if no value arrived in time,
    /// or [`RecvTimeoutError::Closed`] once the queue is closed and empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        loop {
            if let Some(value) = inner.items.pop_back() {
                return Ok(value);
            }
            if inner.closed {
                return Err(RecvTimeoutError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RecvTimeoutError::Timeout);
            }
            let (guard, _timed_out) = self
                .available
                .wait_timeout(inner, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
        }
    }

    /// Takes the most recent value without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] if no value is pending, or
    /// [`TryRecvError::Closed`] once the queue is closed and empty.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut inner = self.lock();
        match inner.items.pop_back() {
            Some(value) => Ok(value),
            None if inner.closed => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Closes the queue and wakes every blocked receiver.
    ///
    /// Pending values remain receivable; once drained, receives report
    /// `Closed`. Idempotent.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        drop(inner);
        self.available.notify_all();
    }

    /// Number of values currently pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether no values are currently pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
