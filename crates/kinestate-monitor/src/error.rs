//! 监控层错误类型定义

use thiserror::Error;

/// 监控层错误类型
#[derive(Error, Debug)]
pub enum MonitorError {
    /// 订阅更新源失败
    #[error("Failed to subscribe to update source: {0}")]
    Subscribe(String),

    /// 更新源已关闭
    #[error("Update source closed")]
    SourceClosed,

    /// 启动摄取线程失败
    #[error("Failed to spawn ingest thread: {0}")]
    Spawn(#[from] std::io::Error),
}
