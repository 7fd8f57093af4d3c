// crates/bf_foundation/src/dimension.rs

//! 运行时维度
//!
//! 多块结构网格在配置加载时才确定是 2D 还是 3D，因此维度是运行时值。
//!
//! # 用法
//!
//! ```
//! use bf_foundation::dimension::Dimension;
//!
//! let dim = Dimension::Two;
//! assert_eq!(dim.n_faces(), 4);
//! assert_eq!(dim.vertices_per_cell(), 4);
//! ```
//!
//! # 设计说明
//!
//! - Two: 四边形单元，块面为 N/E/S/W，k 方向退化为单层
//! - Three: 六面体单元，块面增加 T/B

use serde::{Deserialize, Serialize};
use std::fmt;

/// 模拟维度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// 二维
    #[default]
    #[serde(rename = "2", alias = "2d", alias = "two")]
    Two,
    /// 三维
    #[serde(rename = "3", alias = "3d", alias = "three")]
    Three,
}

impl Dimension {
    /// 从整数构造（2 或 3）
    pub fn from_usize(n: usize) -> Option<Self> {
        match n {
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    /// 数值形式
    #[inline]
    pub const fn as_usize(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// 是否为 3D
    #[inline]
    pub const fn is_3d(self) -> bool {
        matches!(self, Self::Three)
    }

    /// 每个块的面数
    #[inline]
    pub const fn n_faces(self) -> usize {
        match self {
            Self::Two => 4,
            Self::Three => 6,
        }
    }

    /// 每个单元的顶点数
    #[inline]
    pub const fn vertices_per_cell(self) -> usize {
        match self {
            Self::Two => 4,
            Self::Three => 8,
        }
    }

    /// 维度名称（用于日志）
    pub const fn name(self) -> &'static str {
        match self {
            Self::Two => "2D",
            Self::Three => "3D",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
