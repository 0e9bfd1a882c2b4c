//! 模型层错误类型定义
//!
//! 模型只在构造时可能失败；构造成功后的所有查询都不会返回错误
//! （未知名称返回空结果）。

use thiserror::Error;

/// 模型层错误类型
#[derive(Error, Debug)]
pub enum ModelError {
    /// 模型描述标识无法解析（找不到对应的模型）
    #[error("Robot model not found: {0}")]
    NotFound(String),

    /// 名称重复
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// 关节引用了不存在的连杆
    #[error("Joint '{joint}' references unknown link '{link}'")]
    UnknownLink { joint: String, link: String },

    /// 分组引用了不存在的关节
    #[error("Group '{group}' references unknown joint '{joint}'")]
    UnknownJoint { group: String, joint: String },

    /// 一个连杆被多个关节作为子连杆
    #[error("Link '{link}' has more than one parent joint")]
    MultipleParents { link: String },

    /// 根连杆数量不为 1
    #[error("Expected exactly one root link, found {0:?}")]
    InvalidRoot(Vec<String>),

    /// 连杆从根不可达（存在环或孤立子树）
    #[error("Link '{0}' is not reachable from the root link")]
    Unreachable(String),

    /// 关节限位非法（min > max 或非有限值）
    #[error("Invalid limits for joint '{joint}': [{min}, {max}]")]
    InvalidLimits { joint: String, min: f64, max: f64 },

    /// 旋转/移动关节缺少限位
    #[error("Joint '{0}' requires limits")]
    MissingLimits(String),

    /// 关节轴为零向量
    #[error("Joint '{0}' has a zero-length axis")]
    ZeroAxis(String),

    /// 关节轴含非有限分量
    #[error("Joint '{0}' has a non-finite axis")]
    InvalidAxis(String),

    /// 关节固定偏移含非有限值
    #[error("Joint '{0}' has a non-finite origin")]
    InvalidOrigin(String),

    /// 描述标识不是单一文件名（含路径分隔符或 `..`）
    #[error("Invalid model description id: {0:?}")]
    InvalidId(String),

    /// 模型描述文件读取失败
    #[error("Failed to read model description: {0}")]
    Io(#[from] std::io::Error),

    /// 模型描述解析失败
    #[error("Failed to parse model description: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::ModelError;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::NotFound("robot_description".to_string());
        assert_eq!(format!("{}", err), "Robot model not found: robot_description");

        let err = ModelError::UnknownJoint {
            group: "arm".to_string(),
            joint: "elbow".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("arm") && msg.contains("elbow"));

        let err = ModelError::InvalidRoot(vec!["a".to_string(), "b".to_string()]);
        assert!(format!("{}", err).contains("exactly one root"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ModelError = io.into();
        assert!(matches!(err, ModelError::Io(_)));
    }
}
