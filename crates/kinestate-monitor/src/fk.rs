//! 正运动学缓存
//!
//! 沿连杆树从根向下组合变换：
//!
//! ```text
//! pose(child) = pose(parent) * joint_origin * joint_transform(values)
//! ```
//!
//! 根连杆位姿为单位变换。结果按快照的缓存键 `(表标识, 版本)` 缓存，
//! 拿到不同版本的快照时整体失效。

use crate::table::Snapshot;
use kinestate_model::KinematicModel;
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// 连杆位姿（相对规划坐标系）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPose {
    isometry: Isometry3<f64>,
}

impl LinkPose {
    pub fn new(isometry: Isometry3<f64>) -> Self {
        LinkPose { isometry }
    }

    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.isometry
    }

    /// 平移 `[x, y, z]`
    pub fn translation(&self) -> [f64; 3] {
        let t = &self.isometry.translation.vector;
        [t.x, t.y, t.z]
    }

    /// 单位四元数 `[qx, qy, qz, qw]`
    pub fn quaternion(&self) -> [f64; 4] {
        let q = self.isometry.rotation.quaternion();
        [q.i, q.j, q.k, q.w]
    }

    /// `[x, y, z, qx, qy, qz, qw]`
    ///
    /// 平移与旋转取自同一个变换。
    pub fn to_array(&self) -> [f64; 7] {
        let [x, y, z] = self.translation();
        let [qx, qy, qz, qw] = self.quaternion();
        [x, y, z, qx, qy, qz, qw]
    }
}

impl From<LinkPose> for Isometry3<f64> {
    fn from(pose: LinkPose) -> Self {
        pose.isometry
    }
}

#[derive(Default)]
struct PoseCache {
    key: Option<(u64, u64)>,
    /// 连杆名 → 位姿（`None` 表示链上有变量缺失）
    poses: HashMap<String, Option<Isometry3<f64>>>,
}

/// 正运动学缓存
///
/// 可跨线程共享；内部缓存由互斥锁保护。
pub struct ForwardKinematicsCache {
    model: Arc<KinematicModel>,
    cache: Mutex<PoseCache>,
}

impl ForwardKinematicsCache {
    pub fn new(model: Arc<KinematicModel>) -> Self {
        ForwardKinematicsCache {
            model,
            cache: Mutex::new(PoseCache::default()),
        }
    }

    pub fn model(&self) -> &Arc<KinematicModel> {
        &self.model
    }

    /// 计算连杆位姿
    ///
    /// 未知连杆、或到根的链上任一关节缺少变量值时返回 `None`。
    pub fn link_pose(&self, snapshot: &Snapshot, link: &str) -> Option<LinkPose> {
        self.model.link(link)?;

        let mut cache = self.cache.lock();
        let key = snapshot.cache_key();
        if cache.key != Some(key) {
            cache.poses.clear();
            cache.key = Some(key);
        }

        self.resolve(snapshot, link, &mut cache.poses)
            .map(LinkPose::new)
    }

    /// 递归求解并写入缓存
    fn resolve(
        &self,
        snapshot: &Snapshot,
        link: &str,
        poses: &mut HashMap<String, Option<Isometry3<f64>>>,
    ) -> Option<Isometry3<f64>> {
        if let Some(&cached) = poses.get(link) {
            return cached;
        }

        let pose = match self.model.parent_joint(link) {
            None => Some(Isometry3::identity()),
            Some(joint) => {
                let parent = self.resolve(snapshot, joint.parent_link(), poses);
                parent.and_then(|parent| {
                    let values: SmallVec<[f64; 7]> = joint
                        .variable_names()
                        .iter()
                        .map(|v| snapshot.value(v))
                        .collect::<Option<_>>()?;
                    let origin = self.model.link(link)?.joint_origin();
                    Some(parent * origin * joint.transform(&values)?)
                })
            },
        };

        poses.insert(link.to_string(), pose.map(renormalize));
        pose.map(renormalize)
    }

    /// 关节或分组的当前值（按声明的变量顺序）
    ///
    /// 先按关节名解析，再按分组名解析；名称未知或任一变量缺失时返回空。
    pub fn joint_values(&self, snapshot: &Snapshot, joint_or_group: &str) -> Vec<f64> {
        let Some(variables) = self.model.variables_of(joint_or_group) else {
            return Vec::new();
        };
        variables
            .iter()
            .map(|v| snapshot.value(v))
            .collect::<Option<Vec<f64>>>()
            .unwrap_or_default()
    }
}

/// 长链累积误差后重新归一化旋转
fn renormalize(iso: Isometry3<f64>) -> Isometry3<f64> {
    let rotation = UnitQuaternion::new_normalize(iso.rotation.into_inner());
    Isometry3::from_parts(Translation3::from(iso.translation.vector), rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::JointValueTable;
    use crate::update::JointStateUpdate;
    use approx::assert_relative_eq;
    use kinestate_model::{GroupDescription, JointDescription, LinkDescription, ModelDescription};
    use std::f64::consts::FRAC_PI_2;

    /// base --shoulder(z)--> upper --elbow(z, x+1)--> fore --wrist(fixed, x+0.5)--> hand
    fn arm() -> Arc<KinematicModel> {
        let desc = ModelDescription::new("arm")
            .with_link(LinkDescription::new("base"))
            .with_link(LinkDescription::new("upper"))
            .with_link(LinkDescription::new("fore"))
            .with_link(LinkDescription::new("hand"))
            .with_joint(JointDescription::revolute("shoulder", "base", "upper").with_limits(-3.0, 3.0))
            .with_joint(
                JointDescription::revolute("elbow", "upper", "fore")
                    .with_origin([1.0, 0.0, 0.0], [0.0, 0.0, 0.0])
                    .with_limits(-3.0, 3.0),
            )
            .with_joint(
                JointDescription::fixed("wrist", "fore", "hand").with_origin([0.5, 0.0, 0.0], [0.0, 0.0, 0.0]),
            )
            .with_group(GroupDescription::new("arm", ["shoulder", "elbow"]));
        Arc::new(desc.build().unwrap())
    }

    fn snapshot_of(values: &[(&str, f64)]) -> Snapshot {
        let mut table = JointValueTable::new();
        table.merge(&JointStateUpdate::from_pairs(1, 0, values.iter().copied()));
        table.snapshot()
    }

    #[test]
    fn test_root_pose_is_identity() {
        let fk = ForwardKinematicsCache::new(arm());
        let pose = fk.link_pose(&Snapshot::default(), "base").unwrap();
        assert_eq!(pose.to_array(), [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_chain_composition() {
        let fk = ForwardKinematicsCache::new(arm());
        let snapshot = snapshot_of(&[("shoulder", FRAC_PI_2), ("elbow", 0.0)]);

        // 肩关节转 90°，手部位于 (0, 1.5, 0)
        let hand = fk.link_pose(&snapshot, "hand").unwrap().to_array();
        assert_relative_eq!(hand[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(hand[1], 1.5, epsilon = 1e-12);
        assert_relative_eq!(hand[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(hand[5], (FRAC_PI_2 / 2.0).sin(), epsilon = 1e-12);
        assert_relative_eq!(hand[6], (FRAC_PI_2 / 2.0).cos(), epsilon = 1e-12);

        let q = &hand[3..];
        let norm: f64 = q.iter().map(|c| c * c).sum::<f64>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_chain_variable_gives_none() {
        let fk = ForwardKinematicsCache::new(arm());
        let snapshot = snapshot_of(&[("shoulder", 0.3)]);
        assert!(fk.link_pose(&snapshot, "upper").is_some());
        assert!(fk.link_pose(&snapshot, "fore").is_none());
        assert!(fk.link_pose(&snapshot, "hand").is_none());
        assert!(fk.link_pose(&snapshot, "no_such_link").is_none());
    }

    #[test]
    fn test_cache_invalidated_by_new_version() {
        let fk = ForwardKinematicsCache::new(arm());
        let mut table = JointValueTable::new();
        table.merge(&JointStateUpdate::from_pairs(1, 0, [("shoulder", 0.0), ("elbow", 0.0)]));
        let first = fk.link_pose(&table.snapshot(), "hand").unwrap();
        assert_relative_eq!(first.translation()[0], 1.5, epsilon = 1e-12);

        table.merge(&JointStateUpdate::from_pairs(2, 0, [("elbow", FRAC_PI_2)]));
        let second = fk.link_pose(&table.snapshot(), "hand").unwrap();
        assert_relative_eq!(second.translation()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(second.translation()[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_joint_values_joint_then_group() {
        let fk = ForwardKinematicsCache::new(arm());
        let snapshot = snapshot_of(&[("shoulder", 0.1), ("elbow", 0.2)]);
        assert_eq!(fk.joint_values(&snapshot, "elbow"), vec![0.2]);
        assert_eq!(fk.joint_values(&snapshot, "arm"), vec![0.1, 0.2]);
        assert!(fk.joint_values(&snapshot, "unknown").is_empty());
        assert!(fk.joint_values(&snapshot, "wrist").is_empty());

        let partial = snapshot_of(&[("shoulder", 0.1)]);
        assert!(fk.joint_values(&partial, "arm").is_empty());
    }
}
