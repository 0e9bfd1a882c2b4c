//! 结构查询集成测试

mod common;

use kinestate::prelude::*;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_unknown_joint_limits_are_empty() {
    let model = common::five_joint_model();
    for name in ["", "j6", "J1", "l1", "G1"] {
        assert!(model.joint_limits(name).is_empty(), "{name}");
    }

    let (robot, _updates) = common::interface(common::five_joint_model(), Duration::from_millis(10));
    assert!(robot.get_joint_limits("nope").is_empty());
    assert_eq!(robot.get_joint_limits("j3"), vec![[-2.0, 2.0]]);
}

#[test]
fn test_min_containing_group_prefers_fewer_variables() {
    let (robot, _updates) = common::interface(common::five_joint_model(), Duration::from_millis(10));
    assert_eq!(robot.find_min_containing_group("j1").as_deref(), Some("G2"));
    assert_eq!(robot.find_min_containing_group("j3").as_deref(), Some("G1"));
    assert_eq!(robot.find_min_containing_group("j5"), None);
}

#[test]
fn test_planar_joint_variables_and_limits() {
    let model = common::mobile_model();
    assert_eq!(
        model.variable_names(),
        ["base_joint/x", "base_joint/y", "base_joint/theta", "lift"]
    );

    let limits = model.joint_limits("base_joint");
    assert_eq!(limits.len(), 3);
    assert_eq!(limits[0].min_position, f64::NEG_INFINITY);
    assert_eq!(limits[2].max_position, std::f64::consts::PI);
    assert_eq!(model.min_containing_group("lift"), Some("whole_body"));
    assert_eq!(model.min_containing_group("base_joint"), Some("base"));
}

#[test]
fn test_toml_model_source_shares_models() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("gantry.toml")).unwrap();
    write!(
        file,
        r#"
name = "gantry"

[[links]]
name = "frame"

[[links]]
name = "carriage"

[[joints]]
name = "rail"
type = "prismatic"
parent = "frame"
child = "carriage"
axis = [1.0, 0.0, 0.0]
limits = {{ lower = 0.0, upper = 2.0 }}

[[groups]]
name = "axis_x"
joints = ["rail"]
"#
    )
    .unwrap();

    let source: Arc<dyn ModelSource> = Arc::new(TomlModelSource::new(dir.path()));
    let a = RobotInterfaceBuilder::new("gantry")
        .model_source(source.clone())
        .build()
        .unwrap();
    let b = RobotInterfaceBuilder::new("gantry")
        .model_source(source.clone())
        .build()
        .unwrap();
    assert!(Arc::ptr_eq(a.model(), b.model()));
    assert_eq!(a.get_planning_frame(), "frame");
    assert_eq!(a.get_group_names(), vec!["axis_x"]);

    let missing = RobotInterfaceBuilder::new("portal").model_source(source).build();
    assert!(matches!(missing, Err(ClientError::Model(ModelError::NotFound(_)))));
}
