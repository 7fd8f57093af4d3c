// crates/bf_physics/src/context.rs

//! 模拟上下文
//!
//! 启动时由配置构造一次，之后以引用传入边界条件、湍流修正与划分调用。
//! 本模块不持有任何全局可变状态。

use bf_config::{SimulationConfig, TurbulenceModel};
use bf_foundation::Dimension;

use crate::error::PhysicsResult;

/// 模拟上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimContext {
    /// 维度
    pub dimension: Dimension,
    /// 虚拟单元层数
    pub nghost: usize,
    /// 是否计算粘性项
    pub viscous: bool,
    /// 是否为动网格
    pub moving_grid: bool,
    /// 湍流模型
    pub turbulence: TurbulenceModel,
    /// 温度模态数
    pub n_modes: usize,
    /// 组分数
    pub n_species: usize,
}

impl Default for SimContext {
    fn default() -> Self {
        Self {
            dimension: Dimension::Two,
            nghost: 2,
            viscous: false,
            moving_grid: false,
            turbulence: TurbulenceModel::None,
            n_modes: 1,
            n_species: 1,
        }
    }
}

impl SimContext {
    /// 由配置构造
    pub fn from_config(config: &SimulationConfig) -> PhysicsResult<Self> {
        Ok(Self {
            dimension: config.dimension()?,
            nghost: config.nghost,
            viscous: config.viscous,
            moving_grid: config.moving_grid,
            turbulence: config.turbulence_model,
            n_modes: config.n_modes,
            n_species: config.n_species,
        })
    }

    /// 是否需要近壁 omega 修正
    #[inline]
    pub fn needs_menter_correction(&self) -> bool {
        self.viscous && self.turbulence.is_k_omega()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menter_only_for_viscous_k_omega() {
        let mut ctx = SimContext::default();
        assert!(!ctx.needs_menter_correction());
        ctx.turbulence = TurbulenceModel::KOmega;
        assert!(!ctx.needs_menter_correction());
        ctx.viscous = true;
        assert!(ctx.needs_menter_correction());
        ctx.turbulence = TurbulenceModel::SpalartAllmaras;
        assert!(!ctx.needs_menter_correction());
    }
}
