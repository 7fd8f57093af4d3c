// crates/bf_physics/src/error.rs

//! 物理层错误类型
//!
//! 包装网格层与配置层错误，并补充边界条件相关的错误。

use bf_config::ConfigError;
use bf_foundation::{BfError, Face};
use bf_mesh::MeshError;
use thiserror::Error;

/// 物理层结果类型
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理层错误
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// 网格层错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 配置层错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 未知的边界条件类型
    #[error("块 {block} 面 {face}: 未知的边界条件类型 '{key}'")]
    UnknownBoundary {
        /// 块编号
        block: usize,
        /// 面
        face: Face,
        /// 类型键
        key: String,
    },

    /// 功能未实现
    #[error("功能未实现: {feature}")]
    NotImplemented {
        /// 功能描述
        feature: String,
    },

    /// 状态或参数不合法
    #[error("状态无效: {message}")]
    InvalidState {
        /// 错误信息
        message: String,
    },
}

impl PhysicsError {
    /// 未知的边界条件类型
    pub fn unknown_boundary(block: usize, face: Face, key: impl Into<String>) -> Self {
        Self::UnknownBoundary {
            block,
            face,
            key: key.into(),
        }
    }

    /// 功能未实现
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// 状态无效
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

/// 转换到 Foundation 层错误
impl From<PhysicsError> for BfError {
    fn from(err: PhysicsError) -> Self {
        match err {
            PhysicsError::Mesh(e) => e.into(),
            PhysicsError::Config(e) => e.into(),
            PhysicsError::UnknownBoundary { .. } => BfError::config(err.to_string()),
            PhysicsError::NotImplemented { feature } => BfError::not_implemented(feature),
            PhysicsError::InvalidState { message } => BfError::invalid_state(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_boundary_message() {
        let err = PhysicsError::unknown_boundary(3, Face::North, "mystery");
        let msg = err.to_string();
        assert!(msg.contains("mystery"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_mesh_error_passes_through() {
        let err: PhysicsError = MeshError::partition("bad").into();
        let bf: BfError = err.into();
        assert!(matches!(bf, BfError::Partition { .. }));
    }
}
