//! 运动学模型
//!
//! `KinematicModel` 在构造后不可变，通过 `Arc<KinematicModel>` 在各组件之间共享。
//! 所有查询都是纯读取；未知名称返回空结果而不是错误。

use crate::joint::{Joint, VariableBounds};
use nalgebra::Isometry3;
use std::collections::HashMap;

/// 连杆定义
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) name: String,
    pub(crate) parent_joint: Option<usize>,
    /// 父连杆坐标系 → 父关节坐标系的固定偏移
    pub(crate) joint_origin: Isometry3<f64>,
}

impl Link {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 父关节相对父连杆的固定偏移（根连杆为单位变换）
    pub fn joint_origin(&self) -> &Isometry3<f64> {
        &self.joint_origin
    }
}

/// 关节分组
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) name: String,
    pub(crate) joints: Vec<String>,
    pub(crate) variable_count: usize,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 成员关节（按声明顺序）
    pub fn joint_names(&self) -> &[String] {
        &self.joints
    }

    /// 所有成员关节的变量总数
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn has_joint(&self, joint: &str) -> bool {
        self.joints.iter().any(|j| j == joint)
    }
}

/// 不可变运动学模型
#[derive(Debug)]
pub struct KinematicModel {
    name: String,
    joints: Vec<Joint>,
    joint_index: HashMap<String, usize>,
    links: Vec<Link>,
    link_index: HashMap<String, usize>,
    groups: Vec<Group>,
    group_index: HashMap<String, usize>,
    root_link: usize,
    variable_names: Vec<String>,
    variable_index: HashMap<String, usize>,
}

impl KinematicModel {
    /// 由已校验的组件构造模型（校验在 `ModelDescription::build` 中完成）
    pub(crate) fn from_validated(
        name: String,
        joints: Vec<Joint>,
        links: Vec<Link>,
        groups: Vec<Group>,
        root_link: usize,
    ) -> Self {
        let joint_index = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.name.clone(), i))
            .collect();
        let link_index = links
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect();
        let group_index = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.clone(), i))
            .collect();
        let variable_names: Vec<String> = joints
            .iter()
            .flat_map(|j| j.variable_names.iter().cloned())
            .collect();
        let variable_index = variable_names
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();

        KinematicModel {
            name,
            joints,
            joint_index,
            links,
            link_index,
            groups,
            group_index,
            root_link,
            variable_names,
            variable_index,
        }
    }

    /// 模型名称
    pub fn name(&self) -> &str {
        &self.name
    }

    // ==================== 结构查询 ====================

    /// 关节名称（声明顺序）
    pub fn joint_names(&self) -> Vec<String> {
        self.joints.iter().map(|j| j.name.clone()).collect()
    }

    /// 连杆名称（声明顺序）
    pub fn link_names(&self) -> Vec<String> {
        self.links.iter().map(|l| l.name.clone()).collect()
    }

    /// 分组名称（声明顺序）
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// 规划坐标系（根连杆名称）
    pub fn planning_frame(&self) -> &str {
        &self.links[self.root_link].name
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joint_index.get(name).map(|&i| &self.joints[i])
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.link_index.get(name).map(|&i| &self.links[i])
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.group_index.get(name).map(|&i| &self.groups[i])
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// 关节各变量的限位
    ///
    /// 未知关节返回空列表（不视为错误）。
    pub fn joint_limits(&self, name: &str) -> Vec<VariableBounds> {
        self.joint(name)
            .map(|j| j.bounds.clone())
            .unwrap_or_default()
    }

    /// 查找包含指定关节且变量数最少的分组
    ///
    /// 变量数相同时取声明顺序中靠前的分组；没有分组包含该关节时返回 `None`。
    pub fn min_containing_group(&self, joint: &str) -> Option<&str> {
        let mut best: Option<&Group> = None;
        for group in self.groups.iter().filter(|g| g.has_joint(joint)) {
            match best {
                Some(b) if b.variable_count <= group.variable_count => {},
                _ => best = Some(group),
            }
        }
        best.map(|g| g.name.as_str())
    }

    // ==================== 变量查询 ====================

    /// 所有活动变量名（按关节声明顺序展开）
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn variable_count(&self) -> usize {
        self.variable_names.len()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variable_index.contains_key(name)
    }

    /// 关节或分组对应的变量名（按声明顺序）
    ///
    /// 先按关节名解析，再按分组名解析；均未找到时返回 `None`。
    pub fn variables_of(&self, joint_or_group: &str) -> Option<Vec<&str>> {
        if let Some(joint) = self.joint(joint_or_group) {
            return Some(joint.variable_names.iter().map(String::as_str).collect());
        }
        let group = self.group(joint_or_group)?;
        Some(
            group
                .joints
                .iter()
                .filter_map(|name| self.joint(name))
                .flat_map(|j| j.variable_names.iter().map(String::as_str))
                .collect(),
        )
    }

    // ==================== 运动链 ====================

    /// 连杆的父关节
    pub fn parent_joint(&self, link: &str) -> Option<&Joint> {
        let link = self.link(link)?;
        link.parent_joint.map(|i| &self.joints[i])
    }

    /// 从根连杆到指定连杆的关节链（根在前）
    ///
    /// 根连杆返回空链；未知连杆返回 `None`。
    pub fn chain_to_root(&self, link: &str) -> Option<Vec<&Joint>> {
        let mut current = self.link(link)?;
        let mut chain = Vec::new();
        while let Some(joint_idx) = current.parent_joint {
            let joint = &self.joints[joint_idx];
            chain.push(joint);
            current = &self.links[self.link_index[&joint.parent_link]];
        }
        chain.reverse();
        Some(chain)
    }
}

#[cfg(test)]
mod tests {
    use crate::description::{GroupDescription, JointDescription, LinkDescription, ModelDescription};
    use crate::joint::VariableBounds;
    use crate::KinematicModel;

    fn arm() -> KinematicModel {
        ModelDescription::new("arm")
            .with_link(LinkDescription::new("base"))
            .with_link(LinkDescription::new("upper"))
            .with_link(LinkDescription::new("lower"))
            .with_link(LinkDescription::new("hand"))
            .with_joint(
                JointDescription::revolute("j1", "base", "upper").with_limits(-1.0, 1.0),
            )
            .with_joint(
                JointDescription::revolute("j2", "upper", "lower").with_limits(-2.0, 2.0),
            )
            .with_joint(JointDescription::planar("j3", "lower", "hand"))
            .with_group(GroupDescription::new("g1", ["j1", "j2", "j3"]))
            .with_group(GroupDescription::new("g2", ["j1", "j2"]))
            .with_group(GroupDescription::new("g3", ["j2", "j1"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_structure_queries() {
        let model = arm();
        assert_eq!(model.joint_names(), vec!["j1", "j2", "j3"]);
        assert_eq!(model.link_names(), vec!["base", "upper", "lower", "hand"]);
        assert_eq!(model.group_names(), vec!["g1", "g2", "g3"]);
        assert_eq!(model.planning_frame(), "base");
        assert_eq!(model.variable_count(), 5);
        assert!(model.has_variable("j3/theta"));
        assert!(!model.has_variable("j3"));
    }

    #[test]
    fn test_joint_limits() {
        let model = arm();
        assert_eq!(model.joint_limits("j1"), vec![VariableBounds::new(-1.0, 1.0)]);
        assert_eq!(model.joint_limits("j3").len(), 3);
        assert!(model.joint_limits("nope").is_empty());
    }

    #[test]
    fn test_min_containing_group_prefers_fewer_variables() {
        let model = arm();
        // g2 与 g3 变量数相同，g2 先声明
        assert_eq!(model.min_containing_group("j1"), Some("g2"));
        assert_eq!(model.min_containing_group("j3"), Some("g1"));
        assert_eq!(model.min_containing_group("nope"), None);
    }

    #[test]
    fn test_variables_of_joint_and_group() {
        let model = arm();
        assert_eq!(model.variables_of("j2"), Some(vec!["j2"]));
        assert_eq!(model.variables_of("g3"), Some(vec!["j2", "j1"]));
        assert_eq!(
            model.variables_of("g1"),
            Some(vec!["j1", "j2", "j3/x", "j3/y", "j3/theta"])
        );
        assert_eq!(model.variables_of("nope"), None);
    }

    #[test]
    fn test_chain_to_root() {
        let model = arm();
        let chain: Vec<&str> = model
            .chain_to_root("hand")
            .unwrap()
            .iter()
            .map(|j| j.name())
            .collect();
        assert_eq!(chain, vec!["j1", "j2", "j3"]);
        assert!(model.chain_to_root("base").unwrap().is_empty());
        assert!(model.chain_to_root("nope").is_none());
        assert_eq!(model.parent_joint("lower").map(|j| j.name()), Some("j2"));
    }
}
