// crates/bf_config/src/lib.rs

//! BlockFlow Config Layer
//!
//! 配置层，提供多块模拟的配置值：块尺寸、各面边界条件类型与参数、
//! 湍流模型选择以及显式 rank 映射表。
//!
//! # 模块概览
//!
//! - [`simulation`]: SimulationConfig 及其子结构
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! bf_cli      ─> 读取 SimulationConfig
//! bf_physics  ─> 由 SimulationConfig 构建 Domain
//! bf_config   ─> 配置值与验证 (本层)
//! bf_foundation
//! ```
//!
//! # 设计原则
//!
//! 1. **只做解码**: 边界条件名称在物理层解析，本层只保证结构合法
//! 2. **全 f64 配置**: 所有物理量均以 f64 表示
//! 3. **有符号块号**: 块编号以 i64 读入，负值由划分与构建阶段报告

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod simulation;

// 重导出核心类型
pub use error::{ConfigError, ConfigResult};
pub use simulation::{
    BcKey, BlockConfig, EquilibriumTableConfig, FaceConfig, FlowConditionConfig,
    GeometryBoxConfig, RankEntryConfig, RankMapConfig, SimulationConfig, TurbulenceModel,
};
