//! Config file to finished run

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sluice_config::{ConfigError, POLICY_ENV, SluiceConfig};
use sluice_types::{Category, ConsumerKind, FullPolicy, ProducerKind};
use tempfile::TempDir;

use crate::common::run_to_end;

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

fn load(path: &Path) -> SluiceConfig {
    SluiceConfig::load_from(path).unwrap()
}

#[tokio::test(start_paused = true)]
async fn file_settings_drive_the_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[channel]
capacity = 2
policy = "wait"

[producer]
strategy = "blocking-write"
delay_ms = 20
close_after = 6

[consumer]
strategy = "probe-then-read"
delay_ms = 60

[console]
color = false
"#,
    );

    let settings = load(&path).resolve_with(|_| None).unwrap();
    assert!(!settings.color);
    assert_eq!(settings.run.producer(), ProducerKind::BlockingWrite);
    assert_eq!(settings.run.consumer(), ConsumerKind::ProbeThenRead);
    assert_eq!(
        settings.run.timing().consumer_delay(),
        Duration::from_millis(60)
    );

    let (summary, reporter) = run_to_end(settings.run).await;
    assert!(summary.closed_by_producer);
    assert_eq!(reporter.items(Category::Read), (0..=6).collect::<Vec<u64>>());
}

#[tokio::test(start_paused = true)]
async fn environment_policy_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[channel]
policy = "wait"

[producer]
strategy = "blocking-write"
close_after = 20
"#,
    );

    let settings = load(&path)
        .resolve_with(|key| (key == POLICY_ENV).then(|| "drop-write".to_string()))
        .unwrap();
    assert_eq!(settings.run.policy(), FullPolicy::DropWrite);

    // Under DropWrite the blocking writer no longer waits for the consumer.
    let (summary, _reporter) = run_to_end(settings.run).await;
    assert_eq!(summary.written + summary.dropped, 21);
    assert!(summary.dropped > 0);
}

#[tokio::test(start_paused = true)]
async fn huge_capacity_from_file_runs() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[channel]
capacity = 9223372036854775807

[producer]
strategy = "blocking-write"
delay_ms = 1
close_after = 3
"#,
    );

    let settings = load(&path).resolve_with(|_| None).unwrap();
    assert_eq!(settings.run.capacity().get(), 9_223_372_036_854_775_807);

    let (summary, reporter) = run_to_end(settings.run).await;
    assert_eq!(summary.written, 4);
    assert_eq!(reporter.items(Category::Read), (0..=3).collect::<Vec<u64>>());
}

#[test]
fn unknown_strategy_in_file_is_a_parse_error_with_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[consumer]
strategy = "peek"
"#,
    );

    let err = SluiceConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    assert_eq!(err.path(), Some(path.as_path()));
}

#[test]
fn zero_capacity_in_file_is_rejected_at_resolve() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[channel]\ncapacity = 0\n");

    let err = load(&path).resolve_with(|_| None).unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { field: "capacity", .. }),
        "{err:?}"
    );
}
