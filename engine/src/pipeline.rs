//! Pipeline driver: one channel, one producer task, one consumer task.
//!
//! Construction does nothing; `run()` creates the channel, spawns both
//! strategies and waits for the consumer to observe end of stream. The
//! producer stops only when the channel closes, so shutdown is expressed as
//! a close: in-flight suspends wake up, buffered items still drain.
//!
//! The shutdown source stays armed while the buffer drains. A shutdown
//! request during the drain discards what is left, so the consumer sees end
//! of stream at its next read.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use sluice_channel::BoundedChannel;
use sluice_types::{Item, Phase, PhaseTransitionError, Report, Reporter, RunSettings};
use thiserror::Error;
use tokio::task::JoinError;

use crate::consumer::{Consumer, ConsumerStats};
use crate::producer::{Producer, ProducerStats};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline task failed: {0}")]
    Task(#[from] JoinError),
    #[error(transparent)]
    Phase(#[from] PhaseTransitionError),
}

/// Totals for one run, reported as the final line.
///
/// `read + discarded == written` once the run has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: u64,
    pub dropped: u64,
    pub read: u64,
    pub already_consumed: u64,
    /// Buffered items thrown away by a shutdown during the drain.
    pub discarded: u64,
    /// The producer closed the channel itself rather than being shut down.
    pub closed_by_producer: bool,
}

impl RunSummary {
    fn new(producer: ProducerStats, consumer: ConsumerStats, discarded: u64) -> Self {
        Self {
            written: producer.written,
            dropped: producer.dropped,
            read: consumer.read,
            already_consumed: consumer.already_consumed,
            discarded,
            closed_by_producer: producer.closed_channel,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: written {}, dropped {}, read {}",
            self.written, self.dropped, self.read
        )?;
        if self.already_consumed > 0 {
            write!(f, ", already consumed {}", self.already_consumed)?;
        }
        if self.discarded > 0 {
            write!(f, ", discarded {}", self.discarded)?;
        }
        Ok(())
    }
}

pub struct Pipeline {
    settings: RunSettings,
    reporter: Arc<dyn Reporter>,
}

impl Pipeline {
    pub fn new(settings: RunSettings, reporter: Arc<dyn Reporter>) -> Self {
        Self { settings, reporter }
    }

    #[must_use]
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    fn advance(&self, phase: Phase, next: Phase) -> Result<Phase, PipelineError> {
        let next = phase.transition(next)?;
        tracing::info!(from = %phase, to = %next, "Pipeline phase changed");
        self.reporter
            .report(&Report::info(format!("Phase: {phase} -> {next}")));
        Ok(next)
    }

    /// Run until the consumer observes end of stream.
    ///
    /// `shutdown` is called once for the running phase and once more for
    /// the drain. A request while running closes the channel on the
    /// producer's behalf and lets the consumer drain. A request during the
    /// drain discards the remaining buffered items.
    pub async fn run<S, F>(self, mut shutdown: S) -> Result<RunSummary, PipelineError>
    where
        S: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let settings = &self.settings;
        let timing = settings.timing();
        let channel: Arc<BoundedChannel<Item>> = Arc::new(BoundedChannel::with_capacity(
            settings.capacity(),
            settings.policy(),
        ));

        tracing::info!(
            producer = %settings.producer(),
            consumer = %settings.consumer(),
            capacity = settings.capacity().get(),
            policy = %settings.policy(),
            producer_delay_ms = timing.producer_delay().as_millis() as u64,
            consumer_delay_ms = timing.consumer_delay().as_millis() as u64,
            "Starting pipeline"
        );
        self.reporter.report(&Report::info(format!(
            "Starting {} -> {} (capacity {}, policy {})",
            settings.producer(),
            settings.consumer(),
            settings.capacity(),
            settings.policy(),
        )));

        let producer = Producer::new(
            settings.producer(),
            Arc::clone(&channel),
            Arc::clone(&self.reporter),
            timing.producer_delay(),
        )
        .with_close_after(settings.close_after());
        let consumer = Consumer::new(
            settings.consumer(),
            Arc::clone(&channel),
            Arc::clone(&self.reporter),
            timing.consumer_delay(),
        );

        let mut producer_task = tokio::spawn(producer.run());
        let mut consumer_task = tokio::spawn(consumer.run());
        let mut phase = Phase::Running;

        let produced = tokio::select! {
            result = &mut producer_task => result,
            () = shutdown() => {
                tracing::info!("Shutdown requested, closing channel");
                channel.close();
                producer_task.await
            }
        };
        let producer_stats = match produced {
            Ok(stats) => stats,
            Err(err) => {
                tracing::error!("Producer task failed: {err}");
                channel.close();
                consumer_task.abort();
                // Cancelled or finished, the consumer has let go of the channel.
                let _ = consumer_task.await;
                return Err(err.into());
            }
        };

        // A producer only returns once the channel is closed; this is a no-op
        // unless the task ended some other way.
        channel.close();
        phase = self.advance(phase, Phase::Closing)?;
        let buffered = channel.len();
        if buffered > 0 {
            phase = self.advance(phase, Phase::Draining)?;
            tracing::debug!(buffered, "Draining buffered items");
        }

        let mut discarded = 0;
        let consumed = tokio::select! {
            result = &mut consumer_task => result,
            () = shutdown() => {
                discarded = channel.discard() as u64;
                tracing::warn!(discarded, "Shutdown requested while draining");
                self.reporter.report(&Report::info(format!(
                    "Shutdown requested, discarded {discarded} buffered items"
                )));
                consumer_task.await
            }
        };
        let consumer_stats = consumed?;
        phase = self.advance(phase, Phase::Terminated)?;
        debug_assert!(phase.is_terminal());

        let summary = RunSummary::new(producer_stats, consumer_stats, discarded);
        tracing::info!(
            written = summary.written,
            dropped = summary.dropped,
            read = summary.read,
            discarded = summary.discarded,
            "Pipeline finished"
        );
        self.reporter.report(&Report::info(summary.to_string()));
        Ok(summary)
    }
}
