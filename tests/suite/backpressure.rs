//! Steady-state behavior under a slow consumer

use std::collections::BTreeSet;
use std::time::Duration;

use sluice_types::{Category, ConsumerKind, FullPolicy, ProducerKind};

use crate::common::{run_for, settings, strictly_increasing};

const RUN: Duration = Duration::from_secs(5);

#[tokio::test(start_paused = true)]
async fn wait_policy_throttles_producer_to_consumer_pace() {
    let (summary, reporter) = run_for(
        settings(
            1,
            FullPolicy::Wait,
            ProducerKind::BlockingWrite,
            ConsumerKind::BlockingRead,
        ),
        RUN,
    )
    .await;

    // Unthrottled, 5s at 100ms per item would be 50 items. At the consumer's
    // 500ms pace it is about ten.
    assert_eq!(summary.dropped, 0);
    assert!(
        (9..=13).contains(&summary.written),
        "written {}",
        summary.written
    );
    assert_eq!(summary.read, summary.written);

    let read = reporter.items(Category::Read);
    let expected: Vec<u64> = (0..summary.read).collect();
    assert_eq!(read, expected);
    assert!(reporter.items(Category::Drop).is_empty());
}

#[tokio::test(start_paused = true)]
async fn wait_policy_probe_writer_is_throttled_too() {
    let (summary, reporter) = run_for(
        settings(
            1,
            FullPolicy::Wait,
            ProducerKind::ProbeThenWrite,
            ConsumerKind::ProbeThenRead,
        ),
        RUN,
    )
    .await;

    assert_eq!(summary.dropped, 0);
    assert!(summary.written <= 13, "written {}", summary.written);
    let read = reporter.items(Category::Read);
    assert_eq!(read.first(), Some(&1));
    assert_eq!(read, (1..=summary.read).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn drop_write_policy_never_blocks_and_drops_most_items() {
    let (summary, reporter) = run_for(
        settings(
            1,
            FullPolicy::DropWrite,
            ProducerKind::TryWrite,
            ConsumerKind::BlockingRead,
        ),
        RUN,
    )
    .await;

    // Roughly four of every five items are dropped.
    let attempted = summary.written + summary.dropped;
    assert!(attempted >= 45, "attempted {attempted}");
    assert!(
        summary.dropped >= 3 * summary.written,
        "written {} dropped {}",
        summary.written,
        summary.dropped
    );

    let written = reporter.items(Category::Write);
    let dropped = reporter.items(Category::Drop);
    let read = reporter.items(Category::Read);

    // The consumer sees exactly the items that were not dropped, in order.
    assert_eq!(read, written);
    assert!(strictly_increasing(&read));

    // Every attempted item is either written or dropped, never both.
    let written_set: BTreeSet<u64> = written.iter().copied().collect();
    let dropped_set: BTreeSet<u64> = dropped.iter().copied().collect();
    assert!(written_set.is_disjoint(&dropped_set));
    let all: Vec<u64> = written_set.union(&dropped_set).copied().collect();
    assert_eq!(all, (0..attempted).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn non_suspending_write_under_wait_policy_reports_drops() {
    let (summary, reporter) = run_for(
        settings(
            1,
            FullPolicy::Wait,
            ProducerKind::TryWrite,
            ConsumerKind::BlockingRead,
        ),
        RUN,
    )
    .await;

    assert!(summary.dropped > summary.written);
    assert_eq!(reporter.items(Category::Read), reporter.items(Category::Write));
}

#[tokio::test(start_paused = true)]
async fn blocking_write_under_drop_policy_is_not_throttled() {
    let (summary, _reporter) = run_for(
        settings(
            1,
            FullPolicy::DropWrite,
            ProducerKind::BlockingWrite,
            ConsumerKind::BlockingRead,
        ),
        RUN,
    )
    .await;

    assert!(summary.written + summary.dropped >= 45);
    assert!(summary.dropped > 0);
    assert_eq!(summary.read, summary.written);
}
