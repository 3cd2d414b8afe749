//! Resolved run settings.
//!
//! These types represent fully-validated configuration. Raw TOML structs
//! with `Option` fields stay private in `sluice-config`, which resolves them
//! into these types at the parse boundary. A `RunSettings` value cannot hold
//! a zero capacity.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::Item;
use crate::kinds::{ConsumerKind, FullPolicy, ProducerKind};

const DEFAULT_PRODUCER_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_CONSUMER_DELAY: Duration = Duration::from_millis(500);

/// Inter-item delays for both sides of the pipeline.
///
/// Whichever side is slower becomes the bottleneck, which decides whether
/// the queue is observed full or empty in steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    producer_delay: Duration,
    consumer_delay: Duration,
}

impl Timing {
    #[must_use]
    pub const fn new(producer_delay: Duration, consumer_delay: Duration) -> Self {
        Self {
            producer_delay,
            consumer_delay,
        }
    }

    #[must_use]
    pub const fn producer_delay(&self) -> Duration {
        self.producer_delay
    }

    #[must_use]
    pub const fn consumer_delay(&self) -> Duration {
        self.consumer_delay
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCER_DELAY, DEFAULT_CONSUMER_DELAY)
    }
}

/// Everything the pipeline driver needs to run one producer/consumer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    capacity: NonZeroUsize,
    policy: FullPolicy,
    producer: ProducerKind,
    consumer: ConsumerKind,
    timing: Timing,
    close_after: Option<Item>,
}

impl RunSettings {
    #[must_use]
    pub fn new(capacity: NonZeroUsize, policy: FullPolicy) -> Self {
        Self {
            capacity,
            policy,
            producer: ProducerKind::default(),
            consumer: ConsumerKind::default(),
            timing: Timing::default(),
            close_after: None,
        }
    }

    pub fn with_producer(mut self, producer: ProducerKind) -> Self {
        self.producer = producer;
        self
    }

    pub fn with_consumer(mut self, consumer: ConsumerKind) -> Self {
        self.consumer = consumer;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Close the channel right after this item has been written.
    pub fn with_close_after(mut self, item: Option<Item>) -> Self {
        self.close_after = item;
        self
    }

    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    #[must_use]
    pub const fn policy(&self) -> FullPolicy {
        self.policy
    }

    #[must_use]
    pub const fn producer(&self) -> ProducerKind {
        self.producer
    }

    #[must_use]
    pub const fn consumer(&self) -> ConsumerKind {
        self.consumer
    }

    #[must_use]
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    /// The close threshold, if the selected producer honours one.
    #[must_use]
    pub fn close_after(&self) -> Option<Item> {
        self.close_after
            .filter(|_| self.producer.honours_close_after())
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::new(NonZeroUsize::MIN, FullPolicy::default())
    }
}
