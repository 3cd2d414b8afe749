//! Producer/consumer strategies and the pipeline driver for Sluice.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run(shutdown)
//!     |
//!     +-- tokio::spawn(Producer::run)  --write-->  BoundedChannel<Item>
//!     +-- tokio::spawn(Consumer::run)  <--read---  BoundedChannel<Item>
//!     |
//!     v
//! RunSummary
//! ```
//!
//! The two tasks share nothing but the channel and a [`Reporter`]. Each
//! strategy exposes one capability (`write` or `read`) returning an outcome;
//! the loops around them are identical for every strategy.
//!
//! [`Reporter`]: sluice_types::Reporter

mod consumer;
mod pipeline;
mod producer;

pub use consumer::{Consumer, ConsumerStats, ReadOutcome};
pub use pipeline::{Pipeline, PipelineError, RunSummary};
pub use producer::{Producer, ProducerStats, WriteOutcome};
