//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use kinestate::prelude::*;
//! ```

// 客户端层（推荐入口）
pub use kinestate_client::{ClientError, InterfaceConfig, RobotInterface, RobotInterfaceBuilder};

// 模型层
pub use kinestate_model::{
    GroupDescription, InMemoryModelSource, JointDescription, JointKind, KinematicModel,
    LinkDescription, ModelDescription, ModelError, ModelSource, TomlModelSource, VariableBounds,
};

// 监控层
pub use kinestate_monitor::{
    ChannelUpdateSource, ForwardKinematicsCache, JointStateUpdate, LinkPose, MonitorConfig,
    MonitorError, Snapshot, StateMonitor, StateUpdateCallback, UpdatePublisher, UpdateSource,
};
