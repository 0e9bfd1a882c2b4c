//! 查询接口层
//!
//! 在静态模型与实时状态之上提供只读查询：
//! - 结构查询（关节/连杆/分组名、限位、规划坐标系、最小包含分组）
//! - 实时查询（变量值、关节值、连杆位姿），按需启动状态监控并等待完整状态
//!
//! 唯一的致命错误是构造阶段模型无法解析；其余情况均以空结果加日志表达。

mod builder;
mod config;
mod error;
mod interface;

pub use builder::RobotInterfaceBuilder;
pub use config::InterfaceConfig;
pub use error::ClientError;
pub use interface::RobotInterface;
