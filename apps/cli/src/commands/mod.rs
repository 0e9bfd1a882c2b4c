//! 命令定义和实现

pub mod model;
pub mod state;

pub use state::{PoseCommand, ValuesCommand};
