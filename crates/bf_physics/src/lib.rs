// crates/bf_physics/src/lib.rs

//! BlockFlow 物理层
//!
//! 提供多块网格上的边界条件处理，包括：
//! - 流场状态存储 (state)
//! - 模拟上下文 (context)
//! - 边界条件类型、催化壁策略与按面分派 (boundary)
//! - 近壁 omega 修正 (turbulence)
//! - 计算域与连接性检查 (domain)
//! - 由配置构建计算域 (builder)
//!
//! # 数据流
//!
//! ```text
//! SimulationConfig ─> DomainBuilder ─> Domain ─> check_connectivity()
//!                                        │
//!                          每步: apply_convective / apply_viscous
//!                                        │
//!                                apply_menter_correction
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod builder;
pub mod context;
pub mod domain;
pub mod error;
pub mod state;
pub mod turbulence;

// 重导出常用类型
pub use boundary::{
    BoundaryCondition, BoundaryKind, CatalyticPolicy, EquilibriumTable, ExtrapolationOrder,
    TemperatureRamp, UserDefinedBoundary, WallCondition, WallThermal,
};
pub use builder::DomainBuilder;
pub use context::SimContext;
pub use domain::{Block, Domain};
pub use error::{PhysicsError, PhysicsResult};
pub use state::{BlockFlow, FlowState, GasState, InterfaceState, WallInfo};
pub use turbulence::{apply_menter_correction, ideal_omega, ideal_omega_at_wall, NOMINAL_LAYER_DEPTH};
