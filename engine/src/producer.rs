//! Producer side: one write capability per strategy, one loop for all.

use std::sync::Arc;
use std::time::Duration;

use sluice_channel::{BoundedChannel, Enqueued, TryEnqueueError};
use sluice_types::{Item, ProducerKind, Report, Reporter};

/// What happened to a single item handed to [`Producer::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The buffer was full and the item was discarded.
    Dropped,
    /// The channel is closed; the producer must stop.
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub written: u64,
    pub dropped: u64,
    /// The producer closed the channel itself after its threshold item.
    pub closed_channel: bool,
}

pub struct Producer {
    kind: ProducerKind,
    channel: Arc<BoundedChannel<Item>>,
    reporter: Arc<dyn Reporter>,
    delay: Duration,
    close_after: Option<Item>,
}

impl Producer {
    pub fn new(
        kind: ProducerKind,
        channel: Arc<BoundedChannel<Item>>,
        reporter: Arc<dyn Reporter>,
        delay: Duration,
    ) -> Self {
        Self {
            kind,
            channel,
            reporter,
            delay,
            close_after: None,
        }
    }

    /// Close the channel once `item` has been attempted.
    ///
    /// Ignored by `TryWrite`, which only stops when the channel is closed
    /// from outside.
    pub fn with_close_after(mut self, item: Option<Item>) -> Self {
        self.close_after = item.filter(|_| self.kind.honours_close_after());
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ProducerKind {
        self.kind
    }

    /// Hand one item to the channel the way this strategy does it.
    pub async fn write(&self, item: Item) -> WriteOutcome {
        match self.kind {
            ProducerKind::TryWrite => self.try_write(item),
            ProducerKind::BlockingWrite => match self.channel.enqueue(item).await {
                Ok(Enqueued::Stored) => WriteOutcome::Written,
                Ok(Enqueued::Dropped(_)) => WriteOutcome::Dropped,
                Err(_) => WriteOutcome::Closed,
            },
            ProducerKind::ProbeThenWrite => {
                if !self.channel.wait_for_capacity().await {
                    return WriteOutcome::Closed;
                }
                // Single producer: the slot the probe saw is still free unless
                // the policy drops or the channel closed in between.
                self.try_write(item)
            }
        }
    }

    fn try_write(&self, item: Item) -> WriteOutcome {
        match self.channel.try_enqueue(item) {
            Ok(()) => WriteOutcome::Written,
            Err(TryEnqueueError::Full(_)) => WriteOutcome::Dropped,
            Err(TryEnqueueError::Closed(_)) => WriteOutcome::Closed,
        }
    }

    fn reached_threshold(&self, item: Item) -> bool {
        self.close_after.is_some_and(|last| item >= last)
    }

    /// Emit the item sequence until the channel is closed.
    ///
    /// Written items are reported after the delay; drops are reported
    /// before it. The delay applies either way.
    pub async fn run(self) -> ProducerStats {
        let mut stats = ProducerStats::default();
        let mut item = self.kind.first_item();
        tracing::info!(strategy = %self.kind, first = item, "Producer started");

        loop {
            match self.write(item).await {
                WriteOutcome::Written => {
                    stats.written += 1;
                    tokio::time::sleep(self.delay).await;
                    self.reporter.report(&Report::written(item));
                }
                WriteOutcome::Dropped => {
                    stats.dropped += 1;
                    self.reporter.report(&Report::dropped(item));
                    tokio::time::sleep(self.delay).await;
                }
                WriteOutcome::Closed => {
                    tracing::debug!(item, "Producer observed closed channel");
                    break;
                }
            }

            if self.reached_threshold(item) {
                // Shutdown may have closed the channel during the delay.
                stats.closed_channel = self.channel.close();
                if stats.closed_channel {
                    self.reporter
                        .report(&Report::info(format!("Closing channel after {item}")));
                }
                break;
            }

            item += 1;
        }

        tracing::info!(
            strategy = %self.kind,
            written = stats.written,
            dropped = stats.dropped,
            "Producer stopped"
        );
        stats
    }
}
