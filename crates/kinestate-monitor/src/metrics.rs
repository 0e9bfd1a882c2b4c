//! 摄取指标
//!
//! 原子计数器，摄取线程写入，任意线程读取，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 状态监控实时指标
#[derive(Debug, Default)]
pub struct MonitorMetrics {
    /// 收到的更新事件总数
    pub updates_received: AtomicU64,

    /// 至少写入了一个变量的更新事件数
    pub updates_applied: AtomicU64,

    /// 写入的变量总数
    pub variables_applied: AtomicU64,

    /// 因时间戳/序列号较旧被丢弃的变量数
    pub stale_variables: AtomicU64,

    /// 模型中不存在的变量数（忽略）
    pub unknown_variables: AtomicU64,

    /// 非有限值（NaN/Inf）被拒绝的变量数
    pub rejected_values: AtomicU64,
}

impl MonitorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取所有计数器
    ///
    /// 各计数器之间可能存在微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            updates_received: self.updates_received.load(Ordering::Relaxed),
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            variables_applied: self.variables_applied.load(Ordering::Relaxed),
            stale_variables: self.stale_variables.load(Ordering::Relaxed),
            unknown_variables: self.unknown_variables.load(Ordering::Relaxed),
            rejected_values: self.rejected_values.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.updates_received.store(0, Ordering::Relaxed);
        self.updates_applied.store(0, Ordering::Relaxed);
        self.variables_applied.store(0, Ordering::Relaxed);
        self.stale_variables.store(0, Ordering::Relaxed);
        self.unknown_variables.store(0, Ordering::Relaxed);
        self.rejected_values.store(0, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub updates_received: u64,
    pub updates_applied: u64,
    pub variables_applied: u64,
    pub stale_variables: u64,
    pub unknown_variables: u64,
    pub rejected_values: u64,
}

impl MetricsSnapshot {
    /// 被丢弃的变量总数（过期 + 未知 + 非法值）
    pub fn dropped_variables(&self) -> u64 {
        self.stale_variables + self.unknown_variables + self.rejected_values
    }
}
