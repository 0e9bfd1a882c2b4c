//! 状态更新钩子
//!
//! 在每次有效合并之后，摄取线程会以新快照触发所有已注册的回调。
//!
//! # 使用示例
//!
//! ```rust
//! use kinestate_monitor::hooks::{HookManager, StateUpdateCallback};
//! use kinestate_monitor::Snapshot;
//! use crossbeam_channel::{Sender, bounded};
//! use std::sync::Arc;
//!
//! struct Forwarder {
//!     tx: Sender<Snapshot>,
//! }
//!
//! impl StateUpdateCallback for Forwarder {
//!     fn on_state_update(&self, snapshot: &Snapshot) {
//!         // ✅ 使用 try_send，非阻塞
//!         let _ = self.tx.try_send(snapshot.clone());
//!     }
//! }
//!
//! let (tx, _rx) = bounded(16);
//! let mut hooks = HookManager::new();
//! hooks.add_callback(Arc::new(Forwarder { tx }));
//! hooks.trigger_all(&Snapshot::default());
//! ```

use crate::table::Snapshot;
use std::sync::Arc;

/// 状态更新回调 Trait
///
/// 回调在摄取线程中同步执行，必须非阻塞；耗时处理应转发到其他线程。
pub trait StateUpdateCallback: Send + Sync {
    /// 有效合并后调用，参数为合并后的快照
    fn on_state_update(&self, snapshot: &Snapshot);
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，需要外部同步（`StateMonitor` 使用 `RwLock<HookManager>`）。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn StateUpdateCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn StateUpdateCallback>) {
        self.callbacks.push(callback);
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有回调
    pub fn trigger_all(&self, snapshot: &Snapshot) {
        for callback in self.callbacks.iter() {
            callback.on_state_update(snapshot);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingCallback {
        count: Arc<AtomicU64>,
    }

    impl StateUpdateCallback for CountingCallback {
        fn on_state_update(&self, _snapshot: &Snapshot) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_hook_manager_add_and_trigger() {
        let mut hooks = HookManager::new();
        assert!(hooks.is_empty());

        let count = Arc::new(AtomicU64::new(0));
        hooks.add_callback(Arc::new(CountingCallback {
            count: count.clone(),
        }));
        hooks.add_callback(Arc::new(CountingCallback {
            count: count.clone(),
        }));
        assert_eq!(hooks.len(), 2);

        hooks.trigger_all(&Snapshot::default());
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_hook_manager_clear() {
        let mut hooks = HookManager::new();
        let count = Arc::new(AtomicU64::new(0));
        hooks.add_callback(Arc::new(CountingCallback {
            count: count.clone(),
        }));
        hooks.clear();
        hooks.trigger_all(&Snapshot::default());
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
