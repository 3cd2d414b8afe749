//! Bounded handoff channel between one producer task and one consumer task.
//!
//! The buffer holds at most `capacity` items in FIFO order. What happens to
//! a write when the buffer is full is decided by the channel's
//! [`FullPolicy`](sluice_types::FullPolicy):
//!
//! - `Wait`: the suspending write waits for room. Nothing is lost.
//! - `DropWrite`: writes never suspend. The newest item is handed back to
//!   the caller so it can report the drop.
//!
//! Closing is one-way. Items buffered before the close stay readable; once
//! the buffer is empty, reads observe end of stream instead of waiting.

mod bounded;
mod error;

pub use bounded::{BoundedChannel, Enqueued};
pub use error::{ChannelClosed, ChannelConfigError, EnqueueError, TryEnqueueError};
