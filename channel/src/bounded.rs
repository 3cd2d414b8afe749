use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sluice_types::FullPolicy;
use tokio::sync::Notify;

use crate::error::{ChannelClosed, ChannelConfigError, EnqueueError, TryEnqueueError};

/// Result of a suspending write that did not hit a closed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued<T> {
    /// The item is in the buffer.
    Stored,
    /// The buffer was full under `DropWrite`; the item was not stored.
    Dropped(T),
}

struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
}

/// Fixed-capacity FIFO shared by one producer and one consumer.
///
/// All mutation goes through one mutex, which is never held across an
/// await point. Waiters park on two `Notify`s: `items` is signalled when an
/// item is pushed, `space` when one is popped. Closing signals both.
///
/// Every wait registers for a wakeup *before* inspecting the state, so a
/// push, pop or close that happens between the check and the await cannot
/// be missed.
pub struct BoundedChannel<T> {
    capacity: NonZeroUsize,
    policy: FullPolicy,
    state: Mutex<State<T>>,
    items: Notify,
    space: Notify,
}

impl<T> BoundedChannel<T> {
    /// Create a channel, rejecting a zero capacity.
    pub fn new(capacity: usize, policy: FullPolicy) -> Result<Self, ChannelConfigError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ChannelConfigError::ZeroCapacity)?;
        Ok(Self::with_capacity(capacity, policy))
    }

    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize, policy: FullPolicy) -> Self {
        Self {
            capacity,
            policy,
            // Grows on demand; `capacity` is only a bound.
            state: Mutex::new(State {
                buffer: VecDeque::new(),
                closed: false,
            }),
            items: Notify::new(),
            space: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // The state is consistent after every statement that touches it, so
        // a panic elsewhere cannot leave it half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    #[must_use]
    pub const fn policy(&self) -> FullPolicy {
        self.policy
    }

    /// Number of buffered items. Never exceeds `capacity`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Append without suspending.
    ///
    /// A full buffer yields `Full` under either policy. Under `DropWrite`
    /// that is the drop; under `Wait` the caller still owns the item and
    /// should use [`enqueue`](Self::enqueue) instead.
    pub fn try_enqueue(&self, item: T) -> Result<(), TryEnqueueError<T>> {
        {
            let mut state = self.lock();
            if state.closed {
                return Err(TryEnqueueError::Closed(item));
            }
            if state.buffer.len() >= self.capacity.get() {
                return Err(TryEnqueueError::Full(item));
            }
            state.buffer.push_back(item);
        }
        self.items.notify_one();
        Ok(())
    }

    /// Append, suspending while the buffer is full under `Wait`.
    ///
    /// Under `DropWrite` this never suspends: a full buffer returns
    /// `Enqueued::Dropped` with the item. A close while waiting wakes the
    /// writer and returns the item in `EnqueueError`.
    pub async fn enqueue(&self, item: T) -> Result<Enqueued<T>, EnqueueError<T>> {
        if self.policy == FullPolicy::DropWrite {
            return match self.try_enqueue(item) {
                Ok(()) => Ok(Enqueued::Stored),
                Err(TryEnqueueError::Full(item)) => Ok(Enqueued::Dropped(item)),
                Err(TryEnqueueError::Closed(item)) => Err(EnqueueError(item)),
            };
        }

        let mut item = item;
        loop {
            let mut notified = pin!(self.space.notified());
            notified.as_mut().enable();

            match self.try_enqueue(item) {
                Ok(()) => return Ok(Enqueued::Stored),
                Err(TryEnqueueError::Closed(rejected)) => return Err(EnqueueError(rejected)),
                Err(TryEnqueueError::Full(rejected)) => item = rejected,
            }

            tracing::trace!("enqueue waiting for capacity");
            notified.await;
        }
    }

    /// Wait until a write could succeed.
    ///
    /// Returns `true` when there is room and `false` once the channel is
    /// closed. Does not insert anything. Under `DropWrite` every write
    /// completes, so this resolves immediately.
    pub async fn wait_for_capacity(&self) -> bool {
        if self.policy == FullPolicy::DropWrite {
            return !self.is_closed();
        }

        loop {
            let mut notified = pin!(self.space.notified());
            notified.as_mut().enable();

            {
                let state = self.lock();
                if state.closed {
                    return false;
                }
                if state.buffer.len() < self.capacity.get() {
                    return true;
                }
            }

            notified.await;
        }
    }

    /// Remove the oldest item, suspending while the buffer is empty.
    ///
    /// Fails with `ChannelClosed` only when the channel is closed *and* the
    /// buffer has been drained.
    pub async fn dequeue(&self) -> Result<T, ChannelClosed> {
        loop {
            let mut notified = pin!(self.items.notified());
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(item) = state.buffer.pop_front() {
                    drop(state);
                    self.space.notify_one();
                    return Ok(item);
                }
                if state.closed {
                    return Err(ChannelClosed);
                }
            }

            tracing::trace!("dequeue waiting for an item");
            notified.await;
        }
    }

    /// Wait until an item is available.
    ///
    /// Returns `true` when an item is buffered and `false` when the channel
    /// is closed and drained. Never fails.
    pub async fn wait_for_item(&self) -> bool {
        loop {
            let mut notified = pin!(self.items.notified());
            notified.as_mut().enable();

            {
                let state = self.lock();
                if !state.buffer.is_empty() {
                    return true;
                }
                if state.closed {
                    return false;
                }
            }

            notified.await;
        }
    }

    /// Remove the oldest item without suspending.
    pub fn try_dequeue(&self) -> Option<T> {
        let item = self.lock().buffer.pop_front()?;
        self.space.notify_one();
        Some(item)
    }

    /// Throw away everything still buffered and return how many items
    /// that was. The channel stays open or closed as it was.
    pub fn discard(&self) -> usize {
        let discarded = {
            let mut state = self.lock();
            let discarded = state.buffer.len();
            state.buffer.clear();
            discarded
        };
        if discarded > 0 {
            tracing::debug!(discarded, "buffered items discarded");
            self.space.notify_waiters();
        }
        discarded
    }

    /// Close the channel and wake every waiter.
    ///
    /// Returns `true` for the call that actually closed it. Later calls are
    /// no-ops and return `false`.
    pub fn close(&self) -> bool {
        let remaining = {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.buffer.len()
        };

        tracing::debug!(remaining, "channel closed");
        self.items.notify_waiters();
        self.space.notify_waiters();
        true
    }
}
