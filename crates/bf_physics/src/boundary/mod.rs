// crates/bf_physics/src/boundary/mod.rs

//! 边界条件模块
//!
//! 本模块提供多块网格每个块面上的边界条件处理：
//!
//! # 子模块
//!
//! - [`types`]: 边界条件类型定义（类型键、壁面热行为、用户自定义接口）
//! - [`catalytic`]: 催化壁策略
//! - `apply`: 对流与粘性两个入口的实现
//!
//! # 主要类型
//!
//! - [`BoundaryKind`]: 边界类型键（名称与旧式整数代码）
//! - [`BoundaryCondition`]: 块面边界条件（封闭的变体集合）
//! - [`WallCondition`]: 无滑移壁面条件（热行为 + 催化策略）
//! - [`CatalyticPolicy`]: 催化壁策略
//!
//! # 使用示例
//!
//! ```
//! use bf_foundation::{Dimension, Face};
//! use bf_mesh::BlockDims;
//! use bf_physics::boundary::BoundaryCondition;
//! use bf_physics::{BlockFlow, FlowState, SimContext};
//!
//! let ctx = SimContext { viscous: true, ..Default::default() };
//! let dims = BlockDims::new(Dimension::Two, 4, 4, 1, 2).unwrap();
//! let mut flow = BlockFlow::new(dims, &FlowState::new(1, 1));
//!
//! let bc = BoundaryCondition::fixed_t(300.0);
//! bc.apply_convective(&ctx, &mut flow, Face::South, 0.0).unwrap();
//! bc.apply_viscous(&ctx, &mut flow, Face::South, 0.0).unwrap();
//! assert_eq!(flow.interface(Face::South, 0, 0).unwrap().fs.gas.t[0], 300.0);
//! ```
//!
//! # 设计原则
//!
//! 1. **封闭变体**: 边界类型为枚举，两个入口统一分派
//! 2. **按面泛化**: 遍历逻辑只写一次，以面为参数
//! 3. **正交策略**: 催化策略只附加在无滑移壁面上

pub mod catalytic;
pub mod types;
mod apply;

pub use catalytic::{CatalyticPolicy, EquilibriumTable, MAX_EQUILIBRIUM_TABLE_ROWS};
pub use types::{
    BoundaryCondition, BoundaryKind, ExtrapolationOrder, TemperatureRamp, UserDefinedBoundary,
    WallCondition, WallThermal,
};
