//! 实时状态层
//!
//! 本 crate 负责：
//! - 关节值表的合并规则与一致性快照（`table`）
//! - 更新源抽象与进程内实现（`update`）
//! - 后台摄取线程与完整性等待（`monitor`）
//! - 基于快照的正运动学缓存（`fk`）
//!
//! # 使用示例
//!
//! ```rust
//! use kinestate_model::{JointDescription, LinkDescription, ModelDescription};
//! use kinestate_monitor::{ChannelUpdateSource, JointStateUpdate, MonitorConfig, StateMonitor};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let model = ModelDescription::new("arm")
//!     .with_link(LinkDescription::new("base"))
//!     .with_link(LinkDescription::new("hand"))
//!     .with_joint(JointDescription::revolute("shoulder", "base", "hand").with_limits(-1.0, 1.0))
//!     .build()
//!     .unwrap();
//!
//! let source = ChannelUpdateSource::new();
//! let publisher = source.publisher();
//! let monitor = StateMonitor::new(Arc::new(model), Arc::new(source), MonitorConfig::default());
//! monitor.start().unwrap();
//!
//! publisher.publish(JointStateUpdate::new(1, 0).with_value("shoulder", 0.5));
//! assert!(monitor.wait_for_full_state(Duration::from_secs(1)));
//! assert_eq!(monitor.current_snapshot().value("shoulder"), Some(0.5));
//! ```

mod error;
pub mod fk;
pub mod hooks;
pub mod metrics;
pub mod monitor;
pub mod table;
pub mod update;

pub use error::MonitorError;
pub use fk::{ForwardKinematicsCache, LinkPose};
pub use hooks::{HookManager, StateUpdateCallback};
pub use metrics::{MetricsSnapshot, MonitorMetrics};
pub use monitor::{MonitorConfig, StateMonitor};
pub use table::{JointValueTable, MergeReport, Snapshot, VariableSample};
pub use update::{ChannelUpdateSource, JointStateUpdate, UpdatePublisher, UpdateSource};
