//! 命令执行上下文
//!
//! 模型文件 `<dir>/<id>.toml` 通过 `TomlModelSource` 以 `<id>` 解析。

use anyhow::{Context, Result};
use kinestate::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Session {
    model_root: PathBuf,
    model_id: String,
    config: InterfaceConfig,
}

impl Session {
    pub fn new(model_path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let model_id = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid model path: {}", model_path.display()))?
            .to_string();
        let model_root = match model_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let config = match config_path {
            Some(path) => InterfaceConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => InterfaceConfig::default(),
        };

        Ok(Session {
            model_root,
            model_id,
            config,
        })
    }

    fn builder(&self) -> RobotInterfaceBuilder {
        RobotInterfaceBuilder::new(self.model_id.clone())
            .model_source(Arc::new(TomlModelSource::new(self.model_root.clone())))
            .config(self.config.clone())
    }

    /// 仅模型（实时查询返回空结果）
    pub fn interface(&self) -> Result<RobotInterface> {
        self.builder()
            .build()
            .with_context(|| format!("Failed to load model '{}'", self.model_id))
    }

    /// 模型 + 进程内更新源
    pub fn live_interface(&self) -> Result<(RobotInterface, ChannelUpdateSource)> {
        let updates = ChannelUpdateSource::new();
        let robot = self
            .builder()
            .update_source(Arc::new(updates.clone()))
            .build()
            .with_context(|| format!("Failed to load model '{}'", self.model_id))?;
        Ok((robot, updates))
    }
}
