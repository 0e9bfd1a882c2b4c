//! 关节值表与快照
//!
//! `JointValueTable` 是实时状态的可变核心：变量名 → (值, 时间戳, 序列号)。
//! 只有 `StateMonitor` 的摄取路径会修改它；其他组件只能拿到 `Snapshot`
//! （不可变的值拷贝）。
//!
//! # 合并规则
//!
//! 对每个变量，当 `(timestamp_us, sequence) >= (已存 timestamp_us, 已存 sequence)`
//! 时覆盖，否则视为过期样本丢弃。即同一变量按时间戳后写者胜，时间戳相同时
//! 序列号大者胜，完全相同时覆盖。
//!
//! # 写时复制
//!
//! 表内部以 `Arc<BTreeMap>` 存储，`snapshot()` 只克隆 `Arc`；合并时若仍有快照
//! 引用旧数据，则通过 `Arc::make_mut` 复制后再修改，已发出的快照永远不会被改写。

use crate::update::JointStateUpdate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 表实例标识分配器（用于区分不同表产生的快照版本）
static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// 单个变量的最新样本
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSample {
    /// 变量值
    pub value: f64,
    /// 采样时间戳（微秒）
    pub timestamp_us: u64,
    /// 来源序列号
    pub sequence: u64,
}

impl VariableSample {
    /// 新样本是否应覆盖当前样本
    fn superseded_by(&self, timestamp_us: u64, sequence: u64) -> bool {
        (timestamp_us, sequence) >= (self.timestamp_us, self.sequence)
    }
}

/// 单次合并结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// 写入的变量数
    pub applied: usize,
    /// 因时间戳/序列号较旧而丢弃的变量数
    pub stale: usize,
    /// 因非有限值（NaN/Inf）而拒绝的变量数
    pub rejected: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// 关节值表
#[derive(Debug)]
pub struct JointValueTable {
    table_id: u64,
    version: u64,
    samples: Arc<BTreeMap<String, VariableSample>>,
}

impl Default for JointValueTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JointValueTable {
    pub fn new() -> Self {
        JointValueTable {
            table_id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            version: 0,
            samples: Arc::new(BTreeMap::new()),
        }
    }

    /// 合并一个更新事件（整体作为一次合并）
    pub fn merge(&mut self, update: &JointStateUpdate) -> MergeReport {
        let mut report = MergeReport::default();

        // 先判定，避免没有变化时触发写时复制
        let accepted: Vec<(&String, f64)> = update
            .values
            .iter()
            .filter_map(|(name, &value)| {
                if !value.is_finite() {
                    report.rejected += 1;
                    return None;
                }
                match self.samples.get(name) {
                    Some(s) if !s.superseded_by(update.timestamp_us, update.sequence) => {
                        report.stale += 1;
                        None
                    },
                    _ => Some((name, value)),
                }
            })
            .collect();

        if accepted.is_empty() {
            return report;
        }

        let samples = Arc::make_mut(&mut self.samples);
        for (name, value) in accepted {
            samples.insert(
                name.clone(),
                VariableSample {
                    value,
                    timestamp_us: update.timestamp_us,
                    sequence: update.sequence,
                },
            );
            report.applied += 1;
        }
        self.version += 1;

        report
    }

    /// 生成一致性快照
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            table_id: self.table_id,
            version: self.version,
            samples: self.samples.clone(),
        }
    }

    /// 是否所有必需变量都至少设置过一次
    pub fn is_complete<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().all(|v| self.samples.contains_key(v.as_ref()))
    }

    /// 尚未设置过的必需变量
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(|v| v.as_ref())
            .filter(|v| !self.samples.contains_key(*v))
            .map(str::to_string)
            .collect()
    }

    /// 是否所有必需变量的时间戳都不早于 `since_us`
    pub fn is_fresh_since<S: AsRef<str>>(&self, required: &[S], since_us: u64) -> bool {
        required.iter().all(|v| {
            self.samples
                .get(v.as_ref())
                .is_some_and(|s| s.timestamp_us >= since_us)
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// 不可变的时间点状态拷贝
///
/// 克隆开销为一次 `Arc` 引用计数递增。
#[derive(Debug, Clone)]
pub struct Snapshot {
    table_id: u64,
    version: u64,
    samples: Arc<BTreeMap<String, VariableSample>>,
}

impl Default for Snapshot {
    /// 空快照（不属于任何表）
    fn default() -> Self {
        Snapshot {
            table_id: 0,
            version: 0,
            samples: Arc::new(BTreeMap::new()),
        }
    }
}

impl Snapshot {
    /// 快照版本（每次有效合并递增）
    pub fn version(&self) -> u64 {
        self.version
    }

    /// 缓存键：(表标识, 版本)
    pub fn cache_key(&self) -> (u64, u64) {
        (self.table_id, self.version)
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.samples.get(variable).map(|s| s.value)
    }

    pub fn sample(&self, variable: &str) -> Option<&VariableSample> {
        self.samples.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.samples.contains_key(variable)
    }

    /// 变量名 → 值（按名称排序）
    pub fn variable_values(&self) -> BTreeMap<String, f64> {
        self.samples
            .iter()
            .map(|(k, s)| (k.clone(), s.value))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableSample)> {
        self.samples.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// 最新样本的时间戳（空快照返回 `None`）
    pub fn latest_timestamp_us(&self) -> Option<u64> {
        self.samples.values().map(|s| s.timestamp_us).max()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
