//! # kinestate CLI
//!
//! 查询机器人模型结构与回放后的关节状态，结果以 JSON 输出到 stdout，日志输出到 stderr。
//!
//! ```bash
//! # 结构查询
//! kinestate-cli --model robots/arm.toml joints
//! kinestate-cli --model robots/arm.toml limits shoulder
//! kinestate-cli --model robots/arm.toml min-group shoulder
//!
//! # 回放 JSON Lines 关节状态后查询
//! kinestate-cli --model robots/arm.toml values --updates states.jsonl arm
//! kinestate-cli --model robots/arm.toml pose hand --updates states.jsonl
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod replay;
mod session;

use commands::{PoseCommand, ValuesCommand};
use session::Session;

/// kinestate CLI - 机器人运动学状态查询工具
#[derive(Parser, Debug)]
#[command(name = "kinestate-cli")]
#[command(about = "Query robot kinematic models and replayed joint state", long_about = None)]
#[command(version)]
struct Cli {
    /// 模型描述文件（TOML）
    #[arg(short, long)]
    model: PathBuf,

    /// 接口配置文件（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 列出关节名
    Joints,

    /// 列出连杆名
    Links,

    /// 列出分组名
    Groups,

    /// 规划坐标系
    Frame,

    /// 关节限位
    Limits {
        /// 关节名
        joint: String,
    },

    /// 包含关节的最小分组
    MinGroup {
        /// 关节名
        joint: String,
    },

    /// 当前变量值 / 关节值
    Values {
        #[command(flatten)]
        args: ValuesCommand,
    },

    /// 连杆位姿
    Pose {
        #[command(flatten)]
        args: PoseCommand,
    },
}

impl Cli {
    fn run(&self) -> Result<serde_json::Value> {
        let session = Session::new(&self.model, self.config.as_deref())?;

        match &self.command {
            Commands::Joints => commands::model::joints(&session),
            Commands::Links => commands::model::links(&session),
            Commands::Groups => commands::model::groups(&session),
            Commands::Frame => commands::model::frame(&session),
            Commands::Limits { joint } => commands::model::limits(&session, joint),
            Commands::MinGroup { joint } => commands::model::min_group(&session, joint),
            Commands::Values { args } => args.execute(&session),
            Commands::Pose { args } => args.execute(&session),
        }
    }
}

fn main() -> Result<()> {
    // 初始化日志（stderr，避免污染 JSON 输出）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = cli.run()?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
