//! 集成测试共用的模型与接口夹具

#![allow(dead_code)]

use kinestate::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// 单关节模型：base --shoulder--> hand，hand 相对 base 偏移 (0.1, 0.2, 0.3)
pub fn hand_model() -> KinematicModel {
    ModelDescription::new("hand_arm")
        .with_link(LinkDescription::new("base"))
        .with_link(LinkDescription::new("hand"))
        .with_joint(
            JointDescription::revolute("shoulder", "base", "hand")
                .with_origin([0.1, 0.2, 0.3], [0.0, 0.0, 0.0])
                .with_limits(-1.0, 1.0),
        )
        .build()
        .unwrap()
}

/// 五关节串联臂（j1..j5），分组 G1={j1,j2,j3}、G2={j1,j2}
pub fn five_joint_model() -> KinematicModel {
    let mut desc = ModelDescription::new("five").with_link(LinkDescription::new("l0"));
    for i in 1..=5 {
        desc = desc.with_link(LinkDescription::new(format!("l{i}"))).with_joint(
            JointDescription::revolute(format!("j{i}"), format!("l{}", i - 1), format!("l{i}"))
                .with_origin([0.0, 0.0, 0.1], [0.0, 0.0, 0.0])
                .with_limits(-2.0, 2.0),
        );
    }
    desc.with_group(GroupDescription::new("G1", ["j1", "j2", "j3"]))
        .with_group(GroupDescription::new("G2", ["j1", "j2"]))
        .build()
        .unwrap()
}

/// 含平面关节的移动底盘：world --base_joint(planar)--> chassis --lift(prismatic)--> mast
pub fn mobile_model() -> KinematicModel {
    ModelDescription::new("mobile")
        .with_link(LinkDescription::new("world"))
        .with_link(LinkDescription::new("chassis"))
        .with_link(LinkDescription::new("mast"))
        .with_joint(JointDescription::planar("base_joint", "world", "chassis"))
        .with_joint(
            JointDescription::prismatic("lift", "chassis", "mast")
                .with_limits(0.0, 0.5),
        )
        .with_group(GroupDescription::new("base", ["base_joint"]))
        .with_group(GroupDescription::new("whole_body", ["base_joint", "lift"]))
        .build()
        .unwrap()
}

/// 构造带进程内更新源的查询接口
pub fn interface(
    model: KinematicModel,
    wait_timeout: Duration,
) -> (RobotInterface, ChannelUpdateSource) {
    let id = model.name().to_string();
    let updates = ChannelUpdateSource::new();
    let robot = RobotInterfaceBuilder::new(id.clone())
        .model_source(Arc::new(InMemoryModelSource::new().with_model(id, model)))
        .update_source(Arc::new(updates.clone()))
        .config(InterfaceConfig::default().with_wait_timeout(wait_timeout))
        .build()
        .unwrap();
    (robot, updates)
}
