// crates/bf_foundation/src/lib.rs

//! BlockFlow Foundation Layer
//!
//! 基础层，提供整个项目共享的最小抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`dimension`]: 运行时 2D/3D 维度
//! - [`face`]: 块面编号与索引轴
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 serde 和 thiserror
//! 2. **固定编号**: 面编号在所有层保持一致，可直接作为数组下标
//!
//! # 示例
//!
//! ```
//! use bf_foundation::{Dimension, Face};
//!
//! let faces = Face::faces_for(Dimension::Two);
//! assert_eq!(faces, &[Face::North, Face::East, Face::South, Face::West]);
//! assert_eq!(Face::East.opposite(), Face::West);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dimension;
pub mod error;
pub mod face;

// 重导出常用类型
pub use dimension::Dimension;
pub use error::{BfError, BfResult};
pub use face::{Axis, Face};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::dimension::Dimension;
    pub use crate::error::{BfError, BfResult};
    pub use crate::face::{Axis, Face};
}
