//! 实时状态查询命令
//!
//! 提供 `--updates` 时先回放 JSON Lines 状态；否则没有更新源，结果为空。

use crate::replay;
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use kinestate::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// 变量值查询参数
#[derive(Args, Debug)]
pub struct ValuesCommand {
    /// 关节或分组名（省略时输出全部变量）
    pub joint: Option<String>,

    /// JSON Lines 关节状态文件
    #[arg(short, long)]
    pub updates: Option<PathBuf>,
}

impl ValuesCommand {
    pub fn execute(&self, session: &Session) -> Result<Value> {
        let robot = open(session, self.updates.as_deref())?;
        Ok(match &self.joint {
            Some(joint) => json!(robot.get_current_joint_values(joint)),
            None => json!(robot.get_current_variable_values()),
        })
    }
}

/// 位姿查询参数
#[derive(Args, Debug)]
pub struct PoseCommand {
    /// 连杆名
    pub link: String,

    /// JSON Lines 关节状态文件
    #[arg(short, long)]
    pub updates: Option<PathBuf>,
}

impl PoseCommand {
    /// 输出 `[x, y, z, qx, qy, qz, qw]`，不可用时为 `null`
    pub fn execute(&self, session: &Session) -> Result<Value> {
        let robot = open(session, self.updates.as_deref())?;
        Ok(json!(robot.get_link_pose(&self.link)))
    }
}

fn open(session: &Session, updates: Option<&Path>) -> Result<RobotInterface> {
    let Some(path) = updates else {
        return session.interface();
    };
    let updates = replay::load_updates(path)?;
    let (robot, source) = session.live_interface()?;
    replay::replay(&robot, &source, updates)?;
    Ok(robot)
}
