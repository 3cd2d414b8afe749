use thiserror::Error;

/// A read found the channel closed and its buffer empty.
///
/// This is the end-of-stream signal, not a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel closed")]
pub struct ChannelClosed;

/// A suspending write found the channel closed. The item is handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("channel closed")]
pub struct EnqueueError<T>(pub T);

impl<T> EnqueueError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// A non-suspending write could not store its item. The item is handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryEnqueueError<T> {
    #[error("channel full")]
    Full(T),
    #[error("channel closed")]
    Closed(T),
}

impl<T> TryEnqueueError<T> {
    pub fn into_inner(self) -> T {
        match self {
            TryEnqueueError::Full(item) | TryEnqueueError::Closed(item) => item,
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, TryEnqueueError::Full(_))
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, TryEnqueueError::Closed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelConfigError {
    #[error("channel capacity must be at least 1")]
    ZeroCapacity,
}
