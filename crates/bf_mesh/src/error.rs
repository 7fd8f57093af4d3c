// crates/bf_mesh/src/error.rs
//! 网格拓扑层错误类型
//!
//! 包含块拓扑、几何、点定位与进程划分错误定义。
//! 所有错误可转换为 `bf_foundation::BfError` 向上传播。

use bf_foundation::BfError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// 拓扑错误（面连接不一致、缺失或非法）
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        /// 出错的操作
        operation: &'static str,
        /// 详细信息
        details: String,
    },

    /// 不支持的几何（非四边形/六面体单元，或未启用的 3D 跨块搜索）
    #[error("不支持的几何: {details}")]
    UnsupportedGeometry {
        /// 详细信息
        details: String,
    },

    /// 点定位超出迭代上限
    #[error("点定位超出迭代上限: 块 {block}, 已迭代 {iterations} 次")]
    SearchBounded {
        /// 搜索终止时所在块
        block: usize,
        /// 已执行的迭代次数
        iterations: usize,
    },

    /// 块与进程划分不一致
    #[error("块划分错误: {details}")]
    Partition {
        /// 详细信息
        details: String,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界
        len: usize,
    },
}

/// 便捷构造函数
impl MeshError {
    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 不支持的几何
    pub fn unsupported_geometry(details: impl Into<String>) -> Self {
        Self::UnsupportedGeometry {
            details: details.into(),
        }
    }

    /// 搜索越界
    pub fn search_bounded(block: usize, iterations: usize) -> Self {
        Self::SearchBounded { block, iterations }
    }

    /// 划分错误
    pub fn partition(details: impl Into<String>) -> Self {
        Self::Partition {
            details: details.into(),
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }
}

/// 转换到 Foundation 层错误
impl From<MeshError> for BfError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidTopology { operation, details } => {
                BfError::invalid_topology(format!("[{}] {}", operation, details))
            }
            MeshError::UnsupportedGeometry { details } => BfError::unsupported_geometry(details),
            MeshError::SearchBounded { block, iterations } => {
                BfError::SearchBounded { block, iterations }
            }
            MeshError::Partition { details } => BfError::partition(details),
            MeshError::IndexOutOfBounds {
                index_type,
                index,
                len,
            } => BfError::IndexOutOfBounds {
                index_type,
                index,
                len,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_to_foundation() {
        let err = MeshError::invalid_topology("connect", "face already linked");
        let bf: BfError = err.into();
        assert!(matches!(bf, BfError::InvalidTopology { .. }));
        assert!(bf.to_string().contains("connect"));
    }

    #[test]
    fn test_partition_conversion() {
        let bf: BfError = MeshError::partition("rank count").into();
        assert!(matches!(bf, BfError::Partition { .. }));
    }

    #[test]
    fn test_search_bounded_display() {
        let err = MeshError::search_bounded(3, 42);
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_search_bounded_stays_recoverable() {
        let bf: BfError = MeshError::search_bounded(3, 42).into();
        assert!(matches!(bf, BfError::SearchBounded { block: 3, iterations: 42 }));
        assert!(bf.is_recoverable());
    }
}
