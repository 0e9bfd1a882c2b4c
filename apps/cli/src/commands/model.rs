//! 结构查询命令（只读取模型，不涉及实时状态）

use crate::session::Session;
use anyhow::Result;
use serde_json::{Value, json};

pub fn joints(session: &Session) -> Result<Value> {
    Ok(json!(session.interface()?.get_joint_names()))
}

pub fn links(session: &Session) -> Result<Value> {
    Ok(json!(session.interface()?.get_link_names()))
}

pub fn groups(session: &Session) -> Result<Value> {
    Ok(json!(session.interface()?.get_group_names()))
}

pub fn frame(session: &Session) -> Result<Value> {
    Ok(json!(session.interface()?.get_planning_frame()))
}

/// 无界限位输出为 `null`
pub fn limits(session: &Session, joint: &str) -> Result<Value> {
    let limits: Vec<[Option<f64>; 2]> = session
        .interface()?
        .get_joint_limits(joint)
        .into_iter()
        .map(|[min, max]| [min.is_finite().then_some(min), max.is_finite().then_some(max)])
        .collect();
    Ok(json!(limits))
}

pub fn min_group(session: &Session, joint: &str) -> Result<Value> {
    Ok(json!(session.interface()?.find_min_containing_group(joint)))
}
