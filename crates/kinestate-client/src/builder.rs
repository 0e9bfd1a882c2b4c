//! Builder 模式实现
//!
//! 提供链式构造 `RobotInterface` 实例的便捷方式。

use crate::config::InterfaceConfig;
use crate::error::ClientError;
use crate::interface::RobotInterface;
use kinestate_model::{ModelError, ModelSource};
use kinestate_monitor::{StateMonitor, UpdateSource};
use std::sync::Arc;
use tracing::info;

/// RobotInterface Builder（链式构造）
///
/// # Example
///
/// ```
/// use kinestate_client::RobotInterfaceBuilder;
/// use kinestate_model::{InMemoryModelSource, LinkDescription, ModelDescription};
/// use kinestate_monitor::ChannelUpdateSource;
/// use std::sync::Arc;
///
/// let model = ModelDescription::new("cell")
///     .with_link(LinkDescription::new("world"))
///     .build()
///     .unwrap();
///
/// let robot = RobotInterfaceBuilder::new("cell")
///     .model_source(Arc::new(InMemoryModelSource::new().with_model("cell", model)))
///     .update_source(Arc::new(ChannelUpdateSource::new()))
///     .build()
///     .unwrap();
/// assert_eq!(robot.get_planning_frame(), "world");
/// ```
pub struct RobotInterfaceBuilder {
    /// 模型描述标识
    description_id: String,
    model_source: Option<Arc<dyn ModelSource>>,
    update_source: Option<Arc<dyn UpdateSource>>,
    /// 共享的监控器（优先于 `update_source`）
    monitor: Option<Arc<StateMonitor>>,
    config: InterfaceConfig,
}

impl RobotInterfaceBuilder {
    pub fn new(description_id: impl Into<String>) -> Self {
        Self {
            description_id: description_id.into(),
            model_source: None,
            update_source: None,
            monitor: None,
            config: InterfaceConfig::default(),
        }
    }

    /// 设置模型来源（必需）
    pub fn model_source(mut self, source: Arc<dyn ModelSource>) -> Self {
        self.model_source = Some(source);
        self
    }

    /// 设置更新源；不设置时实时查询返回空结果
    pub fn update_source(mut self, source: Arc<dyn UpdateSource>) -> Self {
        self.update_source = Some(source);
        self
    }

    /// 复用已有的状态监控器（多个接口共享一条摄取线程）
    pub fn monitor(mut self, monitor: Arc<StateMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn config(mut self, config: InterfaceConfig) -> Self {
        self.config = config;
        self
    }

    /// 构建 `RobotInterface`
    ///
    /// 模型无法解析时返回 `ClientError::Model`；共享监控器必须跟踪同一个模型实例，
    /// 否则返回 `ClientError::MonitorModelMismatch`。
    pub fn build(self) -> Result<RobotInterface, ClientError> {
        let source = self
            .model_source
            .ok_or_else(|| ModelError::NotFound(self.description_id.clone()))?;
        let model = source.load(&self.description_id)?;

        let monitor = match (self.monitor, self.update_source) {
            (Some(monitor), _) => {
                if !Arc::ptr_eq(monitor.model(), &model) {
                    return Err(ClientError::MonitorModelMismatch {
                        interface: model.name().to_string(),
                        monitor: monitor.model().name().to_string(),
                    });
                }
                Some(monitor)
            },
            (None, Some(updates)) => Some(Arc::new(StateMonitor::new(
                model.clone(),
                updates,
                self.config.monitor.clone(),
            ))),
            (None, None) => None,
        };

        info!(
            "Robot interface ready: model '{}' ({} joints, {} links, {} groups), planning frame '{}'",
            model.name(),
            model.joints().len(),
            model.links().len(),
            model.groups().len(),
            model.planning_frame()
        );

        Ok(RobotInterface::new(model, monitor, self.config))
    }
}
