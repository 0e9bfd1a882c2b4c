//! 关节类型定义
//!
//! 每个关节拥有 0 个或多个标量变量（variable）。单变量关节的变量名即关节名，
//! 多变量关节的变量名为 `<joint>/<suffix>`。

use nalgebra::{Isometry3, Quaternion, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// 四元数归一化阈值（避免除零）
///
/// 当浮动关节给出的四元数模平方小于此值时，使用单位旋转。
const QUATERNION_NORM_THRESHOLD: f64 = 1e-10;

/// 关节类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    /// 固定关节（无变量）
    Fixed,
    /// 旋转关节（有限位）
    Revolute,
    /// 连续旋转关节（限位固定为 [-π, π]）
    Continuous,
    /// 移动关节
    Prismatic,
    /// 平面关节（x, y, theta）
    Planar,
    /// 浮动关节（平移 + 四元数）
    Floating,
}

impl JointKind {
    /// 变量名后缀（单变量关节为空）
    pub fn variable_suffixes(self) -> &'static [&'static str] {
        match self {
            JointKind::Fixed => &[],
            JointKind::Revolute | JointKind::Continuous | JointKind::Prismatic => &[""],
            JointKind::Planar => &["x", "y", "theta"],
            JointKind::Floating => &[
                "trans_x", "trans_y", "trans_z", "rot_x", "rot_y", "rot_z", "rot_w",
            ],
        }
    }

    /// 变量个数
    pub fn variable_count(self) -> usize {
        self.variable_suffixes().len()
    }

    /// 是否需要描述中给出限位
    pub fn requires_limits(self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute => "revolute",
            JointKind::Continuous => "continuous",
            JointKind::Prismatic => "prismatic",
            JointKind::Planar => "planar",
            JointKind::Floating => "floating",
        };
        f.write_str(name)
    }
}

/// 单个变量的位置限位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// 位置下限
    pub min_position: f64,
    /// 位置上限
    pub max_position: f64,
}

impl VariableBounds {
    /// 创建新的限位
    pub const fn new(min_position: f64, max_position: f64) -> Self {
        VariableBounds {
            min_position,
            max_position,
        }
    }

    /// 无界限位
    pub const UNBOUNDED: Self = VariableBounds::new(f64::NEG_INFINITY, f64::INFINITY);

    /// 检查值是否在限位内（含边界）
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_position && value <= self.max_position
    }

    /// 转换为 `[min, max]`
    pub fn to_pair(self) -> [f64; 2] {
        [self.min_position, self.max_position]
    }
}

/// 关节定义
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) name: String,
    pub(crate) kind: JointKind,
    pub(crate) parent_link: String,
    pub(crate) child_link: String,
    pub(crate) axis: Unit<Vector3<f64>>,
    pub(crate) variable_names: Vec<String>,
    pub(crate) bounds: Vec<VariableBounds>,
}

impl Joint {
    /// 构造关节，按类型推导变量名与默认限位
    ///
    /// `limits` 仅对旋转/移动关节生效；其余类型使用固定限位。
    pub(crate) fn new(
        name: String,
        kind: JointKind,
        parent_link: String,
        child_link: String,
        axis: Unit<Vector3<f64>>,
        limits: Option<VariableBounds>,
    ) -> Self {
        let variable_names = kind
            .variable_suffixes()
            .iter()
            .map(|suffix| {
                if suffix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", name, suffix)
                }
            })
            .collect();

        let bounds = match kind {
            JointKind::Fixed => Vec::new(),
            JointKind::Revolute | JointKind::Prismatic => {
                vec![limits.unwrap_or(VariableBounds::UNBOUNDED)]
            },
            JointKind::Continuous => vec![VariableBounds::new(-PI, PI)],
            JointKind::Planar => vec![
                VariableBounds::UNBOUNDED,
                VariableBounds::UNBOUNDED,
                VariableBounds::new(-PI, PI),
            ],
            JointKind::Floating => {
                let mut bounds = vec![VariableBounds::UNBOUNDED; 3];
                bounds.extend([VariableBounds::new(-1.0, 1.0); 4]);
                bounds
            },
        };

        Joint {
            name,
            kind,
            parent_link,
            child_link,
            axis,
            variable_names,
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    pub fn parent_link(&self) -> &str {
        &self.parent_link
    }

    pub fn child_link(&self) -> &str {
        &self.child_link
    }

    pub fn axis(&self) -> &Unit<Vector3<f64>> {
        &self.axis
    }

    /// 变量名（按声明顺序）
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    /// 变量个数
    pub fn variable_count(&self) -> usize {
        self.variable_names.len()
    }

    /// 每个变量的限位（与 `variable_names` 一一对应）
    pub fn bounds(&self) -> &[VariableBounds] {
        &self.bounds
    }

    /// 计算关节变量对应的刚体变换（关节坐标系 → 子连杆坐标系）
    ///
    /// 变量个数与关节不匹配时返回 `None`。
    pub fn transform(&self, values: &[f64]) -> Option<Isometry3<f64>> {
        if values.len() != self.variable_count() {
            return None;
        }

        let iso = match self.kind {
            JointKind::Fixed => Isometry3::identity(),
            JointKind::Revolute | JointKind::Continuous => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, values[0]),
            ),
            JointKind::Prismatic => Isometry3::from_parts(
                Translation3::from(self.axis.into_inner() * values[0]),
                UnitQuaternion::identity(),
            ),
            JointKind::Planar => Isometry3::from_parts(
                Translation3::new(values[0], values[1], 0.0),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), values[2]),
            ),
            JointKind::Floating => {
                let q = Quaternion::new(values[6], values[3], values[4], values[5]);
                let rotation = if q.norm_squared() < QUATERNION_NORM_THRESHOLD {
                    UnitQuaternion::identity()
                } else {
                    UnitQuaternion::from_quaternion(q)
                };
                Isometry3::from_parts(Translation3::new(values[0], values[1], values[2]), rotation)
            },
        };

        Some(iso)
    }
}
