//! # 查询接口配置
//!
//! ```toml
//! wait_timeout_ms = 1000
//!
//! [monitor]
//! poll_interval_ms = 10
//! ```
//!
//! 缺失的键取默认值。

use crate::error::ClientError;
use kinestate_monitor::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// `RobotInterface` 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// 实时查询等待完整状态的超时（毫秒）
    pub wait_timeout_ms: u64,

    /// 状态监控配置
    pub monitor: MonitorConfig,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        InterfaceConfig {
            wait_timeout_ms: 1000,
            monitor: MonitorConfig::default(),
        }
    }
}

impl InterfaceConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ClientError> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
