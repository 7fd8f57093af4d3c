// crates/bf_foundation/src/face.rs

//! 块面与索引轴
//!
//! 结构块的每个面用固定编号标识，编号同时作为数组下标和旧式输入文件中的整数代码：
//!
//! | 面 | 编号 | 法向轴 | 所在侧 |
//! |----|------|--------|--------|
//! | North  | 0 | j | max |
//! | East   | 1 | i | max |
//! | South  | 2 | j | min |
//! | West   | 3 | i | min |
//! | Top    | 4 | k | max |
//! | Bottom | 5 | k | min |

use crate::dimension::Dimension;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 索引轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// i 方向
    I,
    /// j 方向
    J,
    /// k 方向
    K,
}

impl Axis {
    /// 作为 [i, j, k] 数组下标
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::I => 0,
            Self::J => 1,
            Self::K => 2,
        }
    }
}

/// 块面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    /// j = jmax 侧
    North = 0,
    /// i = imax 侧
    East = 1,
    /// j = jmin 侧
    South = 2,
    /// i = imin 侧
    West = 3,
    /// k = kmax 侧（仅 3D）
    Top = 4,
    /// k = kmin 侧（仅 3D）
    Bottom = 5,
}

impl Face {
    /// 全部六个面，按编号排序
    pub const ALL: [Face; 6] = [
        Face::North,
        Face::East,
        Face::South,
        Face::West,
        Face::Top,
        Face::Bottom,
    ];

    /// 给定维度下有效的面
    #[inline]
    pub fn faces_for(dim: Dimension) -> &'static [Face] {
        &Self::ALL[..dim.n_faces()]
    }

    /// 数组下标 / 整数代码
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从整数代码构造
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 对面
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// 法向轴
    pub const fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::J,
            Self::East | Self::West => Axis::I,
            Self::Top | Self::Bottom => Axis::K,
        }
    }

    /// 是否位于索引最大侧
    pub const fn is_max_side(self) -> bool {
        matches!(self, Self::North | Self::East | Self::Top)
    }

    /// 该面是否在给定维度下存在
    #[inline]
    pub fn exists_in(self, dim: Dimension) -> bool {
        self.index() < dim.n_faces()
    }

    /// 小写名称
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// 从名称解析，接受全称和首字母，大小写不敏感
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Some(Self::North),
            "east" | "e" => Some(Self::East),
            "south" | "s" => Some(Self::South),
            "west" | "w" => Some(Self::West),
            "top" | "t" => Some(Self::Top),
            "bottom" | "b" => Some(Self::Bottom),
            _ => None,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
