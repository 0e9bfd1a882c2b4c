//! 模型描述（已校验的最小结构化描述）
//!
//! 描述文件使用 TOML 格式，结构上与 URDF 的 link/joint 对应，但不包含几何与惯量信息：
//!
//! ```toml
//! name = "arm"
//!
//! [[links]]
//! name = "base"
//!
//! [[links]]
//! name = "hand"
//!
//! [[joints]]
//! name = "shoulder"
//! type = "revolute"
//! parent = "base"
//! child = "hand"
//! axis = [0.0, 0.0, 1.0]
//! origin = { xyz = [0.0, 0.0, 0.5], rpy = [0.0, 0.0, 0.0] }
//! limits = { lower = -1.0, upper = 1.0 }
//!
//! [[groups]]
//! name = "arm"
//! joints = ["shoulder"]
//! ```
//!
//! `ModelDescription::build()` 完成全部结构校验，成功后得到不可变的 [`KinematicModel`]。

use crate::error::ModelError;
use crate::joint::{Joint, JointKind, VariableBounds};
use crate::model::{Group, KinematicModel, Link};
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::debug;

/// 关节轴的最小模长
const AXIS_NORM_THRESHOLD: f64 = 1e-9;

/// 完整模型描述
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDescription {
    /// 模型名称
    pub name: String,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
    #[serde(default)]
    pub joints: Vec<JointDescription>,
    #[serde(default)]
    pub groups: Vec<GroupDescription>,
}

/// 连杆描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
}

impl LinkDescription {
    pub fn new(name: impl Into<String>) -> Self {
        LinkDescription { name: name.into() }
    }
}

/// 固定偏移（平移 + RPY 欧拉角，弧度）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginDescription {
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl OriginDescription {
    pub fn is_finite(&self) -> bool {
        self.xyz.iter().chain(&self.rpy).all(|v| v.is_finite())
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.xyz[0], self.xyz[1], self.xyz[2]),
            UnitQuaternion::from_euler_angles(self.rpy[0], self.rpy[1], self.rpy[2]),
        )
    }
}

/// 关节限位描述
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitsDescription {
    pub lower: f64,
    pub upper: f64,
}

fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// 关节描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
    #[serde(default)]
    pub origin: OriginDescription,
    #[serde(default)]
    pub limits: Option<LimitsDescription>,
}

impl JointDescription {
    pub fn new(
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        JointDescription {
            name: name.into(),
            kind,
            parent: parent.into(),
            child: child.into(),
            axis: default_axis(),
            origin: OriginDescription::default(),
            limits: None,
        }
    }

    pub fn fixed(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(name, JointKind::Fixed, parent, child)
    }

    pub fn revolute(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self::new(name, JointKind::Revolute, parent, child)
    }

    pub fn prismatic(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self::new(name, JointKind::Prismatic, parent, child)
    }

    pub fn planar(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(name, JointKind::Planar, parent, child)
    }

    pub fn with_axis(mut self, x: f64, y: f64, z: f64) -> Self {
        self.axis = [x, y, z];
        self
    }

    pub fn with_origin(mut self, xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        self.origin = OriginDescription { xyz, rpy };
        self
    }

    pub fn with_limits(mut self, lower: f64, upper: f64) -> Self {
        self.limits = Some(LimitsDescription { lower, upper });
        self
    }
}

/// 分组描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDescription {
    pub name: String,
    pub joints: Vec<String>,
}

impl GroupDescription {
    pub fn new<I, S>(name: impl Into<String>, joints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupDescription {
            name: name.into(),
            joints: joints.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModelDescription {
    /// 创建空描述
    pub fn new(name: impl Into<String>) -> Self {
        ModelDescription {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_joint(mut self, joint: JointDescription) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn with_group(mut self, group: GroupDescription) -> Self {
        self.groups.push(group);
        self
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ModelError> {
        Ok(toml::from_str(content)?)
    }

    /// 从 TOML 文件解析
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 校验并构造不可变模型
    pub fn build(&self) -> Result<KinematicModel, ModelError> {
        // 1. 连杆
        let mut link_index: HashMap<&str, usize> = HashMap::new();
        for (i, link) in self.links.iter().enumerate() {
            if link_index.insert(link.name.as_str(), i).is_some() {
                return Err(ModelError::DuplicateName {
                    kind: "link",
                    name: link.name.clone(),
                });
            }
        }

        // 2. 关节
        let mut joint_names = HashSet::new();
        let mut parent_of: Vec<Option<usize>> = vec![None; self.links.len()];
        let mut joints = Vec::with_capacity(self.joints.len());
        for (i, desc) in self.joints.iter().enumerate() {
            if !joint_names.insert(desc.name.as_str()) {
                return Err(ModelError::DuplicateName {
                    kind: "joint",
                    name: desc.name.clone(),
                });
            }
            for link in [&desc.parent, &desc.child] {
                if !link_index.contains_key(link.as_str()) {
                    return Err(ModelError::UnknownLink {
                        joint: desc.name.clone(),
                        link: link.clone(),
                    });
                }
            }

            let child = link_index[desc.child.as_str()];
            if parent_of[child].replace(i).is_some() {
                return Err(ModelError::MultipleParents {
                    link: desc.child.clone(),
                });
            }

            joints.push(Self::build_joint(desc)?);
        }

        // 3. 根连杆：唯一一个没有父关节的连杆
        let roots: Vec<usize> = (0..self.links.len())
            .filter(|&i| parent_of[i].is_none())
            .collect();
        if roots.len() != 1 {
            return Err(ModelError::InvalidRoot(
                roots.iter().map(|&i| self.links[i].name.clone()).collect(),
            ));
        }
        let root = roots[0];

        // 4. 可达性（单父约束下，环中的连杆必然从根不可达）
        let mut reached = vec![false; self.links.len()];
        let mut queue = VecDeque::from([root]);
        reached[root] = true;
        while let Some(link) = queue.pop_front() {
            for desc in self.joints.iter().filter(|j| link_index[j.parent.as_str()] == link) {
                let child = link_index[desc.child.as_str()];
                if !reached[child] {
                    reached[child] = true;
                    queue.push_back(child);
                }
            }
        }
        if let Some(i) = reached.iter().position(|r| !r) {
            return Err(ModelError::Unreachable(self.links[i].name.clone()));
        }

        let links = self
            .links
            .iter()
            .enumerate()
            .map(|(i, desc)| Link {
                name: desc.name.clone(),
                parent_joint: parent_of[i],
                joint_origin: parent_of[i]
                    .map(|j| self.joints[j].origin.to_isometry())
                    .unwrap_or_else(Isometry3::identity),
            })
            .collect();

        // 5. 分组
        let mut group_names = HashSet::new();
        let mut groups = Vec::with_capacity(self.groups.len());
        for desc in &self.groups {
            if !group_names.insert(desc.name.as_str()) {
                return Err(ModelError::DuplicateName {
                    kind: "group",
                    name: desc.name.clone(),
                });
            }
            let mut members = HashSet::new();
            let mut variable_count = 0;
            for joint in &desc.joints {
                if !members.insert(joint.as_str()) {
                    return Err(ModelError::DuplicateName {
                        kind: "group member",
                        name: joint.clone(),
                    });
                }
                let Some(j) = joints.iter().find(|j: &&Joint| &j.name == joint) else {
                    return Err(ModelError::UnknownJoint {
                        group: desc.name.clone(),
                        joint: joint.clone(),
                    });
                };
                variable_count += j.variable_count();
            }
            groups.push(Group {
                name: desc.name.clone(),
                joints: desc.joints.clone(),
                variable_count,
            });
        }

        debug!(
            "Built kinematic model '{}': {} links, {} joints, {} groups",
            self.name,
            self.links.len(),
            joints.len(),
            groups.len()
        );

        Ok(KinematicModel::from_validated(
            self.name.clone(),
            joints,
            links,
            groups,
            root,
        ))
    }

    fn build_joint(desc: &JointDescription) -> Result<Joint, ModelError> {
        if !desc.origin.is_finite() {
            return Err(ModelError::InvalidOrigin(desc.name.clone()));
        }

        let axis = Vector3::new(desc.axis[0], desc.axis[1], desc.axis[2]);
        let needs_axis = matches!(
            desc.kind,
            JointKind::Revolute | JointKind::Continuous | JointKind::Prismatic
        );
        let finite = axis.iter().all(|c| c.is_finite());
        let axis = match Unit::try_new(axis, AXIS_NORM_THRESHOLD) {
            _ if !finite && needs_axis => return Err(ModelError::InvalidAxis(desc.name.clone())),
            Some(axis) if finite => axis,
            None if needs_axis => return Err(ModelError::ZeroAxis(desc.name.clone())),
            _ => Vector3::z_axis(),
        };

        let limits = match (desc.kind.requires_limits(), desc.limits) {
            (true, None) => return Err(ModelError::MissingLimits(desc.name.clone())),
            (true, Some(l)) => {
                if !l.lower.is_finite() || !l.upper.is_finite() || l.lower > l.upper {
                    return Err(ModelError::InvalidLimits {
                        joint: desc.name.clone(),
                        min: l.lower,
                        max: l.upper,
                    });
                }
                Some(VariableBounds::new(l.lower, l.upper))
            },
            _ => None,
        };

        Ok(Joint::new(
            desc.name.clone(),
            desc.kind,
            desc.parent.clone(),
            desc.child.clone(),
            axis,
            limits,
        ))
    }
}
