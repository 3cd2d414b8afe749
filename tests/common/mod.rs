//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::future::{Future, pending};
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sluice_engine::{Pipeline, RunSummary};
use sluice_types::{
    Category, ConsumerKind, FullPolicy, Item, ProducerKind, Report, Reporter, RunSettings, Timing,
};

/// Reporter that keeps every line in memory.
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl Reporter for RecordingReporter {
    fn report(&self, report: &Report) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    /// Item values reported under `category`, in report order.
    pub fn items(&self, category: Category) -> Vec<Item> {
        self.reports()
            .iter()
            .filter(|r| r.category() == category)
            .filter_map(|r| r.text().rsplit(' ').next()?.parse().ok())
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.reports()
            .iter()
            .filter(|r| r.category() == Category::Info)
            .map(|r| r.text().to_string())
            .collect()
    }
}

/// Settings with the default 100ms/500ms timing.
pub fn settings(
    capacity: usize,
    policy: FullPolicy,
    producer: ProducerKind,
    consumer: ConsumerKind,
) -> RunSettings {
    RunSettings::new(NonZeroUsize::new(capacity).unwrap(), policy)
        .with_producer(producer)
        .with_consumer(consumer)
        .with_timing(Timing::default())
}

pub type ShutdownFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Shutdown source whose `n`th call resolves after `delays[n]`. Calls past
/// the end never resolve.
pub fn shutdown_after(delays: &[Duration]) -> impl FnMut() -> ShutdownFuture {
    let mut delays = delays.to_vec().into_iter();
    move || -> ShutdownFuture {
        match delays.next() {
            Some(delay) => Box::pin(tokio::time::sleep(delay)),
            None => Box::pin(pending()),
        }
    }
}

pub async fn run_with<S, F>(settings: RunSettings, shutdown: S) -> (RunSummary, Arc<RecordingReporter>)
where
    S: FnMut() -> F,
    F: Future<Output = ()>,
{
    let reporter = Arc::new(RecordingReporter::default());
    let summary = Pipeline::new(settings, reporter.clone())
        .run(shutdown)
        .await
        .unwrap();
    (summary, reporter)
}

/// Run until `after` elapses, then shut down and wait for the drain.
pub async fn run_for(settings: RunSettings, after: Duration) -> (RunSummary, Arc<RecordingReporter>) {
    run_with(settings, shutdown_after(&[after])).await
}

/// Run until the producer closes the channel itself.
pub async fn run_to_end(settings: RunSettings) -> (RunSummary, Arc<RecordingReporter>) {
    run_with(settings, pending::<()>).await
}

pub fn strictly_increasing(items: &[Item]) -> bool {
    items.windows(2).all(|w| w[0] < w[1])
}
