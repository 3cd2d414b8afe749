//! BoundedChannel under real concurrency

use std::collections::BTreeSet;
use std::sync::Arc;

use sluice_channel::{BoundedChannel, ChannelClosed, Enqueued, TryEnqueueError};
use sluice_types::FullPolicy;

const ITEMS: u64 = 500;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wait_policy_delivers_every_item_in_order() {
    let channel = Arc::new(BoundedChannel::new(3, FullPolicy::Wait).unwrap());

    let writer = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            for item in 0..ITEMS {
                assert!(matches!(channel.enqueue(item).await, Ok(Enqueued::Stored)));
            }
            channel.close();
        })
    };
    let reader = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Ok(item) = channel.dequeue().await {
                assert!(channel.len() <= 3);
                seen.push(item);
            }
            seen
        })
    };

    writer.await.unwrap();
    let seen = reader.await.unwrap();
    assert_eq!(seen, (0..ITEMS).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn drop_policy_delivers_or_drops_each_item_exactly_once() {
    let channel = Arc::new(BoundedChannel::new(2, FullPolicy::DropWrite).unwrap());

    let writer = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let mut stored = Vec::new();
            let mut dropped = Vec::new();
            for item in 0..ITEMS {
                match channel.enqueue(item).await {
                    Ok(Enqueued::Stored) => stored.push(item),
                    Ok(Enqueued::Dropped(back)) => {
                        assert_eq!(back, item);
                        dropped.push(item);
                    }
                    Err(_) => panic!("channel closed early"),
                }
                if item % 7 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            channel.close();
            (stored, dropped)
        })
    };
    let reader = {
        let channel = Arc::clone(&channel);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while channel.wait_for_item().await {
                if let Some(item) = channel.try_dequeue() {
                    seen.push(item);
                }
            }
            seen
        })
    };

    let (stored, dropped) = writer.await.unwrap();
    let seen = reader.await.unwrap();

    assert_eq!(seen, stored);
    let stored: BTreeSet<u64> = stored.into_iter().collect();
    let dropped: BTreeSet<u64> = dropped.into_iter().collect();
    assert!(stored.is_disjoint(&dropped));
    assert_eq!(stored.len() + dropped.len(), ITEMS as usize);
}

#[tokio::test]
async fn close_is_idempotent_and_keeps_buffer_drainable() {
    let channel = BoundedChannel::new(2, FullPolicy::Wait).unwrap();
    channel.try_enqueue(1_u64).unwrap();
    channel.try_enqueue(2).unwrap();

    assert!(channel.close());
    assert!(!channel.close());
    assert!(channel.is_closed());

    match channel.try_enqueue(3) {
        Err(TryEnqueueError::Closed(item)) => assert_eq!(item, 3),
        other => panic!("expected Closed, got {other:?}"),
    }
    assert!(!channel.wait_for_capacity().await);

    assert_eq!(channel.dequeue().await, Ok(1));
    assert_eq!(channel.dequeue().await, Ok(2));
    assert_eq!(channel.dequeue().await, Err(ChannelClosed));
    assert_eq!(channel.dequeue().await, Err(ChannelClosed));
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(BoundedChannel::<u64>::new(0, FullPolicy::Wait).is_err());
    assert!(BoundedChannel::<u64>::new(0, FullPolicy::DropWrite).is_err());
}
