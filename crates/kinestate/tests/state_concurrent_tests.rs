//! 状态并发测试
//!
//! 验证合并与快照的线性一致性：快照要么完整反映一次合并，要么完全不反映。

mod common;

use kinestate::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const VARIABLES: [&str; 4] = ["base_joint/x", "base_joint/y", "base_joint/theta", "lift"];

fn all_equal(snapshot: &Snapshot) -> bool {
    let values: Vec<Option<f64>> = VARIABLES.iter().map(|v| snapshot.value(v)).collect();
    values.windows(2).all(|w| w[0] == w[1])
}

/// 摄取线程写入、多个线程读取快照
#[test]
fn test_snapshot_never_observes_partial_merge() {
    let source = ChannelUpdateSource::new();
    let publisher = source.publisher();
    let monitor = Arc::new(StateMonitor::new(
        Arc::new(common::mobile_model()),
        Arc::new(source),
        MonitorConfig::default(),
    ));
    monitor.start().unwrap();

    let updates = 2000u64;
    let writer = thread::spawn(move || {
        for i in 1..=updates {
            let value = i as f64;
            publisher.publish(JointStateUpdate::from_pairs(
                i,
                0,
                VARIABLES.iter().map(|v| (*v, value)),
            ));
        }
    });

    let done = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();
    for _ in 0..8 {
        let monitor = monitor.clone();
        let done = done.clone();
        readers.push(thread::spawn(move || {
            let mut last_version = 0;
            while !done.load(Ordering::Relaxed) {
                let snapshot = monitor.current_snapshot();
                assert!(all_equal(&snapshot), "partial snapshot: {:?}", snapshot);
                assert!(snapshot.version() >= last_version);
                last_version = snapshot.version();
                thread::yield_now();
            }
        }));
    }

    writer.join().unwrap();
    assert!(monitor.wait_for_fresh_state(updates, Duration::from_secs(10)));
    done.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    let snapshot = monitor.current_snapshot();
    assert_eq!(snapshot.value("lift"), Some(updates as f64));
    assert_eq!(monitor.metrics().updates_applied, updates);
}

/// 多个写者并发 ingest，每个事件仍然整体生效
#[test]
fn test_concurrent_ingest_applies_events_atomically() {
    let monitor = Arc::new(StateMonitor::new(
        Arc::new(common::mobile_model()),
        Arc::new(ChannelUpdateSource::new()),
        MonitorConfig::default(),
    ));

    let mut writers = Vec::new();
    for w in 0..4u64 {
        let monitor = monitor.clone();
        writers.push(thread::spawn(move || {
            for i in 0..500u64 {
                // 同一时间戳，由序列号决定胜者
                let seq = i * 4 + w;
                let value = seq as f64;
                monitor.ingest(&JointStateUpdate::from_pairs(
                    1,
                    seq,
                    VARIABLES.iter().map(|v| (*v, value)),
                ));
                assert!(all_equal(&monitor.current_snapshot()));
            }
        }));
    }
    for writer in writers {
        writer.join().unwrap();
    }

    let snapshot = monitor.current_snapshot();
    assert!(all_equal(&snapshot));
    assert_eq!(snapshot.value("lift"), Some((499 * 4 + 3) as f64));
}

/// 多个等待者被同一次完整更新唤醒
#[test]
fn test_multiple_waiters_are_woken() {
    let monitor = Arc::new(StateMonitor::new(
        Arc::new(common::five_joint_model()),
        Arc::new(ChannelUpdateSource::new()),
        MonitorConfig::default(),
    ));

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let monitor = monitor.clone();
            thread::spawn(move || monitor.wait_for_full_state(Duration::from_secs(10)))
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    monitor.ingest(&JointStateUpdate::from_pairs(
        1,
        0,
        [("j1", 0.0), ("j2", 0.0), ("j3", 0.0), ("j4", 0.0), ("j5", 0.0)],
    ));

    for waiter in waiters {
        assert!(waiter.join().unwrap());
    }
}
