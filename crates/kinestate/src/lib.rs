//! kinestate - 机器人运动学实时状态库
//!
//! 在不可变的运动学模型之上维护实时关节状态，并提供一致性快照、
//! 正运动学与只读查询接口。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **模型层** (`model`): 关节、连杆、分组与限位，构造后只读
//! - **监控层** (`monitor`): 关节值表、摄取线程、快照与正运动学缓存
//! - **客户端层** (`client`): `RobotInterface` 查询接口
//!
//! # 快速开始
//!
//! ```rust
//! use kinestate::prelude::*;
//! use std::sync::Arc;
//!
//! let model = ModelDescription::from_toml_str(r#"
//!     name = "arm"
//!
//!     [[links]]
//!     name = "base"
//!
//!     [[links]]
//!     name = "hand"
//!
//!     [[joints]]
//!     name = "shoulder"
//!     type = "revolute"
//!     parent = "base"
//!     child = "hand"
//!     origin = { xyz = [0.0, 0.0, 0.3] }
//!     limits = { lower = -1.0, upper = 1.0 }
//! "#).unwrap().build().unwrap();
//!
//! let updates = ChannelUpdateSource::new();
//! let robot = RobotInterfaceBuilder::new("arm")
//!     .model_source(Arc::new(InMemoryModelSource::new().with_model("arm", model)))
//!     .update_source(Arc::new(updates.clone()))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(robot.get_joint_limits("shoulder"), vec![[-1.0, 1.0]]);
//! ```

pub mod prelude;

pub use kinestate_client as client;
pub use kinestate_model as model;
pub use kinestate_monitor as monitor;

pub use kinestate_client::{ClientError, InterfaceConfig, RobotInterface, RobotInterfaceBuilder};
pub use kinestate_model::{KinematicModel, ModelDescription, ModelError, ModelSource};
pub use kinestate_monitor::{
    ForwardKinematicsCache, JointStateUpdate, LinkPose, MonitorConfig, MonitorError, Snapshot,
    StateMonitor, UpdateSource,
};

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static LOGGER_INIT: Once = Once::new();

/// 初始化日志
///
/// 安装 `tracing-subscriber` 的 fmt 输出，过滤规则取自 `RUST_LOG`（默认 `info`），
/// 并把 `log` crate 的记录桥接到 `tracing`。可重复调用；若进程已设置全局订阅者则不覆盖。
pub fn init_logger() {
    LOGGER_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            let _ = tracing_log::LogTracer::init();
        }
    });
}
