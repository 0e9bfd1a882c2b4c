//! RobotInterface - 只读查询接口
//!
//! 组合静态模型、状态监控与正运动学缓存，对外提供与绑定层一一对应的查询方法。
//! 方法只接收/返回基础类型（字符串、浮点数及其序列、名称 → 值映射）。
//!
//! # 查询分类
//!
//! - **静态查询**：直接读取 `KinematicModel`，不会阻塞
//! - **实时查询**：先调用 [`RobotInterface::ensure_current_state`]，再从快照应答
//!
//! # 状态策略
//!
//! 所有实时查询遵循同一策略：
//! 1. 未接入监控器 → `error!`，返回空结果
//! 2. 监控器未激活 → 启动；启动失败同样按"状态不可用"处理
//! 3. 在配置的超时内等待完整状态；超时 → `warn!`，以部分快照继续

use crate::config::InterfaceConfig;
use kinestate_model::KinematicModel;
use kinestate_monitor::{ForwardKinematicsCache, Snapshot, StateMonitor};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

/// 机器人查询接口
pub struct RobotInterface {
    model: Arc<KinematicModel>,
    monitor: Option<Arc<StateMonitor>>,
    fk: ForwardKinematicsCache,
    config: InterfaceConfig,
}

impl RobotInterface {
    pub(crate) fn new(
        model: Arc<KinematicModel>,
        monitor: Option<Arc<StateMonitor>>,
        config: InterfaceConfig,
    ) -> Self {
        RobotInterface {
            fk: ForwardKinematicsCache::new(model.clone()),
            model,
            monitor,
            config,
        }
    }

    // ==================== 静态查询 ====================

    /// 所有关节名（声明顺序）
    pub fn get_joint_names(&self) -> Vec<String> {
        self.model.joint_names()
    }

    pub fn get_group_names(&self) -> Vec<String> {
        self.model.group_names()
    }

    pub fn get_link_names(&self) -> Vec<String> {
        self.model.link_names()
    }

    /// 关节限位，每个变量一个 `[min, max]`；未知关节返回空
    pub fn get_joint_limits(&self, joint: &str) -> Vec<[f64; 2]> {
        self.model
            .joint_limits(joint)
            .into_iter()
            .map(|b| b.to_pair())
            .collect()
    }

    /// 规划坐标系（根连杆名）
    pub fn get_planning_frame(&self) -> String {
        self.model.planning_frame().to_string()
    }

    /// 包含该关节且变量数最少的分组
    pub fn find_min_containing_group(&self, joint: &str) -> Option<String> {
        self.model.min_containing_group(joint).map(str::to_string)
    }

    // ==================== 实时查询 ====================

    /// 连杆位姿 `[x, y, z, qx, qy, qz, qw]`
    ///
    /// 未知连杆、状态不可用或链上关节缺值时返回 `None`。
    pub fn get_link_pose(&self, link: &str) -> Option<[f64; 7]> {
        self.model.link(link)?;
        let snapshot = self.live_snapshot()?;
        self.fk.link_pose(&snapshot, link).map(|pose| pose.to_array())
    }

    /// 当前所有已知变量的值
    pub fn get_current_variable_values(&self) -> BTreeMap<String, f64> {
        self.live_snapshot()
            .map(|snapshot| snapshot.variable_values())
            .unwrap_or_default()
    }

    /// 关节或分组的当前值（声明的变量顺序）
    ///
    /// 名称未知、状态不可用或任一变量缺值时返回空。
    pub fn get_current_joint_values(&self, joint_or_group: &str) -> Vec<f64> {
        if self.model.variables_of(joint_or_group).is_none() {
            return Vec::new();
        }
        match self.live_snapshot() {
            Some(snapshot) => self.fk.joint_values(&snapshot, joint_or_group),
            None => Vec::new(),
        }
    }

    /// 确保实时状态可用
    ///
    /// 返回 `false` 表示状态不可用（调用方应返回空结果）；
    /// 状态不完整只记录警告，仍返回 `true`。
    pub fn ensure_current_state(&self) -> bool {
        let Some(monitor) = &self.monitor else {
            error!("Unable to get current robot state: no state monitor");
            return false;
        };

        if !monitor.is_active() {
            if let Err(e) = monitor.start() {
                error!("Unable to get current robot state: {}", e);
                return false;
            }
        }

        if !monitor.wait_for_full_state(self.config.wait_timeout()) {
            warn!(
                "Joint values for monitored state are requested but the full state is not known (missing: {:?})",
                monitor.missing_variables()
            );
        }
        true
    }

    fn live_snapshot(&self) -> Option<Snapshot> {
        if !self.ensure_current_state() {
            return None;
        }
        self.monitor.as_ref().map(|m| m.current_snapshot())
    }

    // ==================== 访问器 ====================

    pub fn model(&self) -> &Arc<KinematicModel> {
        &self.model
    }

    pub fn monitor(&self) -> Option<&Arc<StateMonitor>> {
        self.monitor.as_ref()
    }

    pub fn config(&self) -> &InterfaceConfig {
        &self.config
    }
}
