// crates/bf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 各层错误（`MeshError`、`ConfigError`、`PhysicsError`）都转换为 `BfError`，
//! 应用层据此区分启动期致命错误与可恢复的"未找到"，并映射为进程退出码。
//!
//! # 设计原则
//!
//! 1. **按类别汇聚**: 每个变体对应一类处理方式，而不是一个来源 crate
//! 2. **启动期致命**: 拓扑、几何、划分与配置错误都在步进开始前报告
//! 3. **可恢复**: 点定位超出迭代上限只表示"未找到"
//!
//! # 示例
//!
//! ```
//! use bf_foundation::error::{BfError, BfResult};
//!
//! fn locate() -> BfResult<()> {
//!     Err(BfError::SearchBounded { block: 2, iterations: 400 })
//! }
//! let err = locate().unwrap_err();
//! assert!(err.is_recoverable());
//! assert_eq!(err.exit_code(), 5);
//! ```

use thiserror::Error;

/// 统一结果类型
pub type BfResult<T> = Result<T, BfError>;

/// BlockFlow 错误类型
#[derive(Error, Debug)]
pub enum BfError {
    // ========================================================================
    // 输入
    // ========================================================================

    /// 读写配置文件失败
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        /// 底层 IO 错误
        #[source]
        source: Option<std::io::Error>,
    },

    /// 配置无法解析
    #[error("配置解析错误: {message}")]
    Serialization {
        /// 解析失败原因
        message: String,
    },

    /// 配置缺项或边界类型键未知
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    // ========================================================================
    // 网格
    // ========================================================================

    /// 面连接或边界条件不一致
    #[error("无效的块拓扑: {message}")]
    InvalidTopology {
        /// 具体错误信息
        message: String,
    },

    /// 单元形状或跨块方式不受支持
    #[error("不支持的几何: {message}")]
    UnsupportedGeometry {
        /// 具体错误信息
        message: String,
    },

    /// 点定位超出迭代上限
    #[error("点定位未收敛: 块 {block}, 迭代 {iterations} 次")]
    SearchBounded {
        /// 停止时所在块
        block: usize,
        /// 已用迭代次数
        iterations: usize,
    },

    /// 块到 rank 的划分无效
    #[error("块划分错误: {message}")]
    Partition {
        /// 具体错误信息
        message: String,
    },

    /// 块或单元索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    // ========================================================================
    // 运行
    // ========================================================================

    /// 状态与请求的操作不符
    #[error("状态无效: {message}")]
    InvalidState {
        /// 具体错误信息
        message: String,
    },

    /// 已识别但未建模的功能
    #[error("功能未实现: {feature}")]
    NotImplemented {
        /// 未实现的功能描述
        feature: String,
    },
}

impl BfError {
    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 配置解析错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 无效拓扑
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// 不支持的几何
    pub fn unsupported_geometry(message: impl Into<String>) -> Self {
        Self::UnsupportedGeometry {
            message: message.into(),
        }
    }

    /// 划分错误
    pub fn partition(message: impl Into<String>) -> Self {
        Self::Partition {
            message: message.into(),
        }
    }

    /// 状态无效
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// 功能未实现
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// 是否只表示"未找到"，调用者可以继续运行
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SearchBounded { .. })
    }

    /// 进程退出码
    ///
    /// 配置类为 2，拓扑 3，几何 4，点定位 5，划分 6，其余 1。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. }
            | Self::Serialization { .. }
            | Self::Config { .. }
            | Self::InvalidConfig { .. } => 2,
            Self::InvalidTopology { .. } => 3,
            Self::UnsupportedGeometry { .. } => 4,
            Self::SearchBounded { .. } => 5,
            Self::Partition { .. } => 6,
            Self::IndexOutOfBounds { .. } | Self::InvalidState { .. } | Self::NotImplemented { .. } => 1,
        }
    }
}

impl From<std::io::Error> for BfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
