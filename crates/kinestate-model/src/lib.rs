//! 运动学模型层
//!
//! 本 crate 提供机器人静态结构的不可变表示，包括：
//! - 关节（类型、变量、限位、轴）
//! - 连杆（父关节与固定偏移）
//! - 关节分组
//! - 模型描述的校验与构造（TOML）
//! - 模型来源（`ModelSource`）
//!
//! 模型构造完成后只读，通过 `Arc<KinematicModel>` 在监控层与查询层之间共享。

pub mod description;
mod error;
pub mod joint;
pub mod model;
pub mod source;

pub use description::{
    GroupDescription, JointDescription, LimitsDescription, LinkDescription, ModelDescription,
    OriginDescription,
};
pub use error::ModelError;
pub use joint::{Joint, JointKind, VariableBounds};
pub use model::{Group, KinematicModel, Link};
pub use source::{InMemoryModelSource, ModelSource, TomlModelSource};
