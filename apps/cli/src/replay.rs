//! JSON Lines 关节状态回放
//!
//! 每行一个 `JointStateUpdate`：
//!
//! ```text
//! {"timestamp_us": 1000, "sequence": 0, "values": {"shoulder": 0.1}}
//! ```
//!
//! 空行与 `#` 开头的行被忽略。

use anyhow::{Context, Result, bail};
use kinestate::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// 等待摄取线程处理完所有回放事件的上限
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub fn load_updates(path: &Path) -> Result<Vec<JointStateUpdate>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_updates(BufReader::new(file))
}

pub fn parse_updates<R: BufRead>(reader: R) -> Result<Vec<JointStateUpdate>> {
    let mut updates = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let update: JointStateUpdate = serde_json::from_str(line)
            .with_context(|| format!("Invalid joint state update on line {}", index + 1))?;
        updates.push(update);
    }
    Ok(updates)
}

/// 通过更新源发布全部事件，并等待摄取线程处理完毕
pub fn replay(
    robot: &RobotInterface,
    source: &ChannelUpdateSource,
    updates: Vec<JointStateUpdate>,
) -> Result<()> {
    let Some(monitor) = robot.monitor() else {
        bail!("Robot interface has no state monitor");
    };
    monitor.start()?;

    let count = updates.len() as u64;
    let expected = monitor.metrics().updates_received + count;
    let publisher = source.publisher();
    for update in updates {
        publisher.publish(update);
    }

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while monitor.metrics().updates_received < expected {
        if Instant::now() >= deadline {
            bail!("Timed out while replaying {} joint state update(s)", count);
        }
        thread::sleep(Duration::from_millis(1));
    }

    let metrics = monitor.metrics();
    info!(
        "Replayed {} update(s): {} applied, {} stale, {} unknown variable(s)",
        count, metrics.updates_applied, metrics.stale_variables, metrics.unknown_variables
    );
    Ok(())
}
