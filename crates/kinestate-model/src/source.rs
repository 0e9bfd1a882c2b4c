//! 模型来源（外部协作者）
//!
//! 给定一个不透明的模型描述标识，返回已校验的共享模型。
//! 解析失败是致命错误：调用方不能在没有模型的情况下继续构造。

use crate::description::ModelDescription;
use crate::error::ModelError;
use crate::model::KinematicModel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// 模型来源 Trait
pub trait ModelSource: Send + Sync {
    /// 按描述标识加载模型
    ///
    /// 同一标识应返回同一个共享模型实例。
    fn load(&self, description_id: &str) -> Result<Arc<KinematicModel>, ModelError>;
}

/// 内存模型注册表
///
/// 测试与嵌入式场景使用：模型在外部构造后按标识注册。
#[derive(Default)]
pub struct InMemoryModelSource {
    models: RwLock<HashMap<String, Arc<KinematicModel>>>,
}

impl InMemoryModelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模型（覆盖同名标识）
    pub fn register(&self, description_id: impl Into<String>, model: Arc<KinematicModel>) {
        self.models.write().insert(description_id.into(), model);
    }

    /// 链式注册
    pub fn with_model(self, description_id: impl Into<String>, model: KinematicModel) -> Self {
        self.register(description_id, Arc::new(model));
        self
    }
}

impl ModelSource for InMemoryModelSource {
    fn load(&self, description_id: &str) -> Result<Arc<KinematicModel>, ModelError> {
        self.models
            .read()
            .get(description_id)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(description_id.to_string()))
    }
}

/// 基于目录的 TOML 模型来源
///
/// 标识 `foo` 对应 `<root>/foo.toml`。首次加载后缓存，之后返回同一个 `Arc`。
pub struct TomlModelSource {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<KinematicModel>>>,
}

impl TomlModelSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TomlModelSource {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 标识只能是根目录下的单一文件名
    fn path_for(&self, description_id: &str) -> Result<PathBuf, ModelError> {
        let invalid = description_id.is_empty()
            || description_id.contains("..")
            || description_id.contains(['/', '\\']);
        if invalid {
            return Err(ModelError::InvalidId(description_id.to_string()));
        }
        Ok(self.root.join(format!("{}.toml", description_id)))
    }
}

impl ModelSource for TomlModelSource {
    fn load(&self, description_id: &str) -> Result<Arc<KinematicModel>, ModelError> {
        if let Some(model) = self.cache.read().get(description_id) {
            debug!("Model '{}' served from cache", description_id);
            return Ok(model.clone());
        }

        let path = self.path_for(description_id)?;
        if !path.is_file() {
            return Err(ModelError::NotFound(description_id.to_string()));
        }

        let model = Arc::new(ModelDescription::load_from_file(&path)?.build()?);
        info!(
            "Loaded robot model '{}' from {} ({} variables)",
            model.name(),
            path.display(),
            model.variable_count()
        );

        // 并发加载时保留先写入的实例
        let mut cache = self.cache.write();
        Ok(cache
            .entry(description_id.to_string())
            .or_insert(model)
            .clone())
    }
}
