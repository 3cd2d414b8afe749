//! Consumer side: one read capability per strategy, one loop for all.

use std::sync::Arc;
use std::time::Duration;

use sluice_channel::{BoundedChannel, ChannelClosed};
use sluice_types::{ConsumerKind, Item, Report, Reporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Item(Item),
    /// A probe saw an item but a non-suspending read found nothing.
    ///
    /// Only another reader can cause this, so it never happens with the
    /// single consumer this crate runs.
    AlreadyConsumed,
    /// The channel is closed and drained.
    EndOfStream,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub read: u64,
    pub already_consumed: u64,
}

pub struct Consumer {
    kind: ConsumerKind,
    channel: Arc<BoundedChannel<Item>>,
    reporter: Arc<dyn Reporter>,
    delay: Duration,
}

impl Consumer {
    pub fn new(
        kind: ConsumerKind,
        channel: Arc<BoundedChannel<Item>>,
        reporter: Arc<dyn Reporter>,
        delay: Duration,
    ) -> Self {
        Self {
            kind,
            channel,
            reporter,
            delay,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ConsumerKind {
        self.kind
    }

    /// Take one item from the channel the way this strategy does it.
    pub async fn read(&self) -> ReadOutcome {
        match self.kind {
            ConsumerKind::BlockingRead => match self.channel.dequeue().await {
                Ok(item) => ReadOutcome::Item(item),
                Err(ChannelClosed) => ReadOutcome::EndOfStream,
            },
            ConsumerKind::ProbeThenRead => {
                if !self.channel.wait_for_item().await {
                    return ReadOutcome::EndOfStream;
                }
                match self.channel.try_dequeue() {
                    Some(item) => ReadOutcome::Item(item),
                    None => ReadOutcome::AlreadyConsumed,
                }
            }
        }
    }

    /// Drain the channel until end of stream.
    pub async fn run(self) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        tracing::info!(strategy = %self.kind, "Consumer started");

        loop {
            match self.read().await {
                ReadOutcome::Item(item) => {
                    stats.read += 1;
                    self.reporter.report(&Report::read(item));
                    tokio::time::sleep(self.delay).await;
                }
                ReadOutcome::AlreadyConsumed => {
                    stats.already_consumed += 1;
                    self.reporter.report(&Report::info("Item already consumed"));
                }
                ReadOutcome::EndOfStream => {
                    self.reporter
                        .report(&Report::info("Channel closed, no more items"));
                    break;
                }
            }
        }

        tracing::info!(strategy = %self.kind, read = stats.read, "Consumer stopped");
        stats
    }
}
