//! 客户端层错误类型定义

use kinestate_model::ModelError;
use thiserror::Error;

/// 客户端层错误类型
///
/// 查询接口本身从不返回错误（未知名称 → 空结果），
/// 只有构造阶段的模型解析与配置加载会失败。
#[derive(Error, Debug)]
pub enum ClientError {
    /// 模型无法解析（致命）
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// 共享监控器跟踪的不是该接口解析出的模型实例
    #[error("Shared state monitor tracks model '{monitor}', interface resolved '{interface}'")]
    MonitorModelMismatch { interface: String, monitor: String },

    /// 配置解析失败
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// 配置文件读取失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
