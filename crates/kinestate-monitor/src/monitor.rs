//! StateMonitor - 后台状态摄取线程
//!
//! 订阅更新源，把关节状态更新合并进 `JointValueTable`，并向读者发布一致性快照。
//!
//! # 并发模型
//!
//! - 单一写者：摄取线程（以及测试/回放使用的 `ingest`）在表锁内合并
//! - 读者：`current_snapshot()` 通过 `ArcSwap` 无锁读取，永远不会看到半合并的状态
//! - 等待者：`wait_for_full_state()` 在条件变量上阻塞，每次有效合并后被唤醒
//!
//! # 生命周期
//!
//! 状态只有 Inactive → Active 一个方向。`start()` 幂等，只订阅一次；
//! Drop 时设置关闭标志并 join 摄取线程。

use crate::error::MonitorError;
use crate::hooks::{HookManager, StateUpdateCallback};
use crate::metrics::{MetricsSnapshot, MonitorMetrics};
use crate::table::{JointValueTable, MergeReport, Snapshot};
use crate::update::{JointStateUpdate, UpdateSource};
use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use kinestate_model::KinematicModel;
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// StateMonitor 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 摄取线程的接收超时（毫秒），决定关闭标志的响应延迟
    pub poll_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval_ms: 10,
        }
    }
}

impl MonitorConfig {
    /// 接收超时（至少 1ms，避免忙等）
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// 摄取线程与监控器共享的状态
struct Shared {
    model: Arc<KinematicModel>,
    table: Mutex<JointValueTable>,
    /// 每次有效合并后 notify_all
    state_changed: Condvar,
    published: ArcSwap<Snapshot>,
    last_update: Mutex<Option<Instant>>,
    active: AtomicBool,
    shutdown: AtomicBool,
    hooks: RwLock<HookManager>,
    metrics: MonitorMetrics,
}

impl Shared {
    fn ingest(&self, update: &JointStateUpdate) -> MergeReport {
        self.metrics.updates_received.fetch_add(1, Ordering::Relaxed);

        // 过滤模型未知的变量
        let unknown = update
            .values
            .keys()
            .filter(|name| !self.model.has_variable(name))
            .count();
        let filtered;
        let update = if unknown > 0 {
            self.metrics
                .unknown_variables
                .fetch_add(unknown as u64, Ordering::Relaxed);
            debug!(
                "Ignoring {} variable(s) unknown to model '{}'",
                unknown,
                self.model.name()
            );
            filtered = JointStateUpdate {
                timestamp_us: update.timestamp_us,
                sequence: update.sequence,
                values: update
                    .values
                    .iter()
                    .filter(|(name, _)| self.model.has_variable(name))
                    .map(|(name, &value)| (name.clone(), value))
                    .collect(),
            };
            &filtered
        } else {
            update
        };

        let (report, snapshot) = {
            let mut table = self.table.lock();
            let report = table.merge(update);
            if report.changed() {
                let snapshot = table.snapshot();
                // 在表锁内发布，保证发布顺序与合并顺序一致
                self.published.store(Arc::new(snapshot.clone()));
                *self.last_update.lock() = Some(Instant::now());
                self.state_changed.notify_all();
                (report, Some(snapshot))
            } else {
                (report, None)
            }
        };

        self.metrics
            .stale_variables
            .fetch_add(report.stale as u64, Ordering::Relaxed);
        self.metrics
            .rejected_values
            .fetch_add(report.rejected as u64, Ordering::Relaxed);
        if report.rejected > 0 {
            warn!(
                "Rejected {} non-finite value(s) in update at {}us",
                report.rejected, update.timestamp_us
            );
        }
        if report.stale > 0 {
            trace!(
                "Dropped {} stale sample(s) at {}us (seq {})",
                report.stale, update.timestamp_us, update.sequence
            );
        }

        // 回调在锁外执行
        if let Some(snapshot) = snapshot {
            self.metrics.updates_applied.fetch_add(1, Ordering::Relaxed);
            self.metrics
                .variables_applied
                .fetch_add(report.applied as u64, Ordering::Relaxed);
            self.hooks.read().trigger_all(&snapshot);
        }

        report
    }

    /// 在表锁上等待条件成立，超时返回最后一次判定结果
    fn wait_until<F>(&self, timeout: Duration, condition: F) -> bool
    where
        F: Fn(&MutexGuard<'_, JointValueTable>) -> bool,
    {
        let mut table = self.table.lock();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            // 超时不可表示时视为无限等待
            while !condition(&table) {
                self.state_changed.wait(&mut table);
            }
            return true;
        };

        while !condition(&table) {
            if self.state_changed.wait_until(&mut table, deadline).timed_out() {
                return condition(&table);
            }
        }
        true
    }
}

/// 状态监控器
///
/// 持有关节值表、摄取线程与完整性条件。所有方法都可以跨线程调用。
pub struct StateMonitor {
    shared: Arc<Shared>,
    source: Arc<dyn UpdateSource>,
    config: MonitorConfig,
    /// 摄取线程句柄；同时作为 `start()` 的串行化锁
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StateMonitor {
    /// 创建监控器（Inactive，未订阅）
    pub fn new(
        model: Arc<KinematicModel>,
        source: Arc<dyn UpdateSource>,
        config: MonitorConfig,
    ) -> Self {
        let table = JointValueTable::new();
        let initial = table.snapshot();
        StateMonitor {
            shared: Arc::new(Shared {
                model,
                table: Mutex::new(table),
                state_changed: Condvar::new(),
                published: ArcSwap::from_pointee(initial),
                last_update: Mutex::new(None),
                active: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                hooks: RwLock::new(HookManager::new()),
                metrics: MonitorMetrics::new(),
            }),
            source,
            config,
            worker: Mutex::new(None),
        }
    }

    /// 启动监控：订阅更新源并启动摄取线程
    ///
    /// 幂等：已激活时直接返回 `Ok(())`，不会重复订阅。
    /// 订阅失败时保持 Inactive 并返回错误。
    pub fn start(&self) -> Result<(), MonitorError> {
        let mut worker = self.worker.lock();
        if self.shared.active.load(Ordering::Acquire) {
            return Ok(());
        }

        let rx = self.source.subscribe()?;
        let shared = self.shared.clone();
        let poll_interval = self.config.poll_interval();
        let handle = thread::Builder::new()
            .name("kinestate-ingest".into())
            .spawn(move || ingest_loop(shared, rx, poll_interval))?;

        *worker = Some(handle);
        self.shared.active.store(true, Ordering::Release);
        info!(
            "State monitor started for model '{}' ({} variables)",
            self.shared.model.name(),
            self.shared.model.variable_count()
        );
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// 等待所有模型变量至少被设置一次
    ///
    /// 超时返回 `false`，不产生其他副作用。
    pub fn wait_for_full_state(&self, timeout: Duration) -> bool {
        let required = self.shared.model.variable_names();
        self.shared
            .wait_until(timeout, |table| table.is_complete(required))
    }

    /// 等待所有模型变量的时间戳都不早于 `since_us`
    pub fn wait_for_fresh_state(&self, since_us: u64, timeout: Duration) -> bool {
        let required = self.shared.model.variable_names();
        self.shared
            .wait_until(timeout, |table| table.is_fresh_since(required, since_us))
    }

    /// 当前一致性快照（可能为空）
    pub fn current_snapshot(&self) -> Snapshot {
        Snapshot::clone(&self.shared.published.load())
    }

    /// 尚未收到过值的模型变量
    pub fn missing_variables(&self) -> Vec<String> {
        self.shared
            .table
            .lock()
            .missing(self.shared.model.variable_names())
    }

    pub fn have_complete_state(&self) -> bool {
        self.shared
            .table
            .lock()
            .is_complete(self.shared.model.variable_names())
    }

    /// 最近一次有效合并的时刻
    pub fn last_update(&self) -> Option<Instant> {
        *self.shared.last_update.lock()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// 注册状态更新回调（每次有效合并后在摄取线程中调用）
    pub fn add_update_callback(&self, callback: Arc<dyn StateUpdateCallback>) {
        self.shared.hooks.write().add_callback(callback);
    }

    pub fn clear_update_callbacks(&self) {
        self.shared.hooks.write().clear();
    }

    /// 直接合并一个更新事件（绕过更新源）
    pub fn ingest(&self, update: &JointStateUpdate) -> MergeReport {
        self.shared.ingest(update)
    }

    pub fn model(&self) -> &Arc<KinematicModel> {
        &self.shared.model
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

impl Drop for StateMonitor {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.worker.get_mut().take() {
            // 最后一个引用在回调中释放时，不能 join 自身
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("Ingest thread panicked");
            }
        }
    }
}

/// 摄取循环
///
/// `recv_timeout` 保证关闭标志在一个轮询周期内被观察到。
fn ingest_loop(shared: Arc<Shared>, rx: Receiver<JointStateUpdate>, poll_interval: Duration) {
    debug!("Ingest thread started");
    while !shared.shutdown.load(Ordering::Acquire) {
        match rx.recv_timeout(poll_interval) {
            Ok(update) => {
                shared.ingest(&update);
            },
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Update source disconnected, ingest thread exiting");
                break;
            },
        }
    }
    debug!("Ingest thread stopped");
}
