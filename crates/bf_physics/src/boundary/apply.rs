// crates/bf_physics/src/boundary/apply.rs

//! 边界条件施加
//!
//! 两个入口对每个块面各调用一次：
//! - `apply_convective`: 设置虚拟单元与界面状态
//! - `apply_viscous`: 仅粘性计算时调用，改写无滑移壁面界面状态
//!
//! 所有类型共用同一个按面遍历原语 [`BlockDims::face_cells`]，
//! 先固定法向索引，再遍历两个面内方向，对六个面统一适用。
//!
//! # 虚拟单元约定
//!
//! 第 `layer` 层虚拟单元（`1..=nghost`）对应内侧第 `layer - 1` 层计算单元。
//! 块在法向上薄于 `nghost` 时取最深的计算单元。

use bf_foundation::Face;
use bf_mesh::{BlockDims, CellIjk};
use glam::DVec3;

use super::types::{BoundaryCondition, ExtrapolationOrder, WallCondition, WallThermal};
use crate::context::SimContext;
use crate::error::{PhysicsError, PhysicsResult};
use crate::state::{BlockFlow, FlowState};
use crate::turbulence::ideal_omega_at_wall;

impl BoundaryCondition {
    /// 设置该面的虚拟单元与界面状态
    ///
    /// 面在当前维度下不存在时什么也不做。
    pub fn apply_convective(
        &self,
        ctx: &SimContext,
        flow: &mut BlockFlow,
        face: Face,
        time: f64,
    ) -> PhysicsResult<()> {
        if !face.exists_in(ctx.dimension) {
            return Ok(());
        }
        tracing::trace!("apply_convective: {} on {} (t = {})", self.kind(), face, time);
        match self {
            Self::Adjacent => {}
            Self::SlipWall | Self::Wall(_) => reflect_at_wall(ctx, flow, face),
            Self::SupersonicInflow { inflow } => fill_with(flow, face, inflow),
            Self::ExtrapolateOut { order } => extrapolate(flow, face, *order),
            Self::FixedPressureOut { p_out } => {
                extrapolate(flow, face, ExtrapolationOrder::Copy);
                override_pressure(flow, face, *p_out);
            }
            Self::UserDefined(handler) => handler.apply_convective(ctx, flow, face, time)?,
        }
        Ok(())
    }

    /// 粘性边界处理
    ///
    /// 非粘性计算或非壁面类型时什么也不做。
    pub fn apply_viscous(
        &self,
        ctx: &SimContext,
        flow: &mut BlockFlow,
        face: Face,
        time: f64,
    ) -> PhysicsResult<()> {
        if !ctx.viscous || !face.exists_in(ctx.dimension) {
            return Ok(());
        }
        match self {
            Self::Wall(wall) => {
                tracing::trace!("apply_viscous: {} on {} (t = {})", self.kind(), face, time);
                viscous_wall(ctx, flow, face, time, wall)
            }
            Self::UserDefined(handler) => handler.apply_viscous(ctx, flow, face, time),
            _ => Ok(()),
        }
    }
}

// ============================================================
// 虚拟单元
// ============================================================

/// 第 `layer` 层虚拟单元镜像的内侧计算单元
fn mirror_source(dims: &BlockDims, face: Face, ijk: CellIjk, layer: usize) -> CellIjk {
    let deepest = dims.extent(face.axis()).saturating_sub(1);
    let depth = (layer - 1).min(deepest);
    dims.interior_cell(face, ijk, depth).unwrap_or(ijk)
}

/// 去掉相对网格速度的法向分量，`factor = 2` 为反射
#[inline]
fn remove_normal(vel: DVec3, wall_vel: DVec3, n: DVec3, factor: f64) -> DVec3 {
    vel - factor * (vel - wall_vel).dot(n) * n
}

fn reflect_at_wall(ctx: &SimContext, flow: &mut BlockFlow, face: Face) {
    let dims = *flow.dims();
    for fc in dims.face_cells(face) {
        let Some(iface) = flow.interface(face, fc.p, fc.q) else {
            continue;
        };
        let n = iface.n;
        let wall_vel = if ctx.moving_grid {
            iface.grid_vel
        } else {
            DVec3::ZERO
        };

        for layer in 1..=dims.nghost {
            let src = mirror_source(&dims, face, fc.ijk, layer);
            let ghost = dims.ghost_cell(face, fc.ijk, layer);
            flow.copy_cell(src, ghost);
            let g = flow.cell_mut(ghost);
            g.vel = remove_normal(g.vel, wall_vel, n, 2.0);
        }

        let cell = flow.cell(fc.ijk).clone();
        if let Some(iface) = flow.interface_mut(face, fc.p, fc.q) {
            iface.fs.copy_values_from(&cell);
            iface.fs.vel = remove_normal(cell.vel, wall_vel, n, 1.0);
        }
    }
}

fn fill_with(flow: &mut BlockFlow, face: Face, state: &FlowState) {
    let dims = *flow.dims();
    for fc in dims.face_cells(face) {
        for layer in 1..=dims.nghost {
            let ghost = dims.ghost_cell(face, fc.ijk, layer);
            flow.cell_mut(ghost).copy_values_from(state);
        }
        if let Some(iface) = flow.interface_mut(face, fc.p, fc.q) {
            iface.fs.copy_values_from(state);
        }
    }
}

fn extrapolate(flow: &mut BlockFlow, face: Face, order: ExtrapolationOrder) {
    let dims = *flow.dims();
    for fc in dims.face_cells(face) {
        let c0 = flow.cell(fc.ijk).clone();
        let c1 = match order {
            ExtrapolationOrder::Copy => None,
            ExtrapolationOrder::Linear => dims
                .interior_cell(face, fc.ijk, 1)
                .map(|ijk| flow.cell(ijk).clone()),
        };
        for layer in 1..=dims.nghost {
            let ghost = dims.ghost_cell(face, fc.ijk, layer);
            match &c1 {
                Some(c1) => *flow.cell_mut(ghost) = FlowState::extrapolated(&c0, c1, layer),
                None => flow.cell_mut(ghost).copy_values_from(&c0),
            }
        }
        if let Some(iface) = flow.interface_mut(face, fc.p, fc.q) {
            iface.fs.copy_values_from(&c0);
        }
    }
}

fn override_pressure(flow: &mut BlockFlow, face: Face, p_out: f64) {
    let dims = *flow.dims();
    for fc in dims.face_cells(face) {
        for layer in 1..=dims.nghost {
            let ghost = dims.ghost_cell(face, fc.ijk, layer);
            flow.cell_mut(ghost).gas.p = p_out;
        }
        if let Some(iface) = flow.interface_mut(face, fc.p, fc.q) {
            iface.fs.gas.p = p_out;
        }
    }
}

// ============================================================
// 粘性壁面
// ============================================================

fn viscous_wall(
    ctx: &SimContext,
    flow: &mut BlockFlow,
    face: Face,
    time: f64,
    wall: &WallCondition,
) -> PhysicsResult<()> {
    let dims = *flow.dims();
    if let WallThermal::Coupled { temperatures } = &wall.thermal {
        if !temperatures.is_empty() && temperatures.len() != dims.face_len(face) {
            return Err(PhysicsError::invalid_state(format!(
                "共轭传热壁温数 {} 与面 {} 的界面数 {} 不符",
                temperatures.len(),
                face,
                dims.face_len(face)
            )));
        }
    }

    for fc in dims.face_cells(face) {
        let cell = flow.cell(fc.ijk).clone();
        let omega_wall = ideal_omega_at_wall(flow, fc.ijk);
        let slot = dims.face_slot(face, fc.p, fc.q);
        let Some(iface) = flow.interface_mut(face, fc.p, fc.q) else {
            continue;
        };

        iface.fs.copy_values_from(&cell);
        iface.fs.vel = if ctx.moving_grid {
            let local = iface.to_local(iface.grid_vel);
            iface.to_global(DVec3::new(0.0, local.y, local.z))
        } else {
            DVec3::ZERO
        };
        if let Some(t_wall) = wall.thermal.wall_temperature(time, slot) {
            iface.fs.gas.set_temperature(t_wall);
        }
        iface.fs.tke = 0.0;
        if let Some(omega) = omega_wall {
            iface.fs.omega = omega;
        }
        if wall.catalytic.is_catalytic() {
            wall.catalytic.apply(&cell.gas, &mut iface.fs.gas.massf);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_foundation::Dimension;

    fn flow_2d(nni: usize, nnj: usize) -> BlockFlow {
        let dims = BlockDims::new(Dimension::Two, nni, nnj, 1, 2).unwrap();
        let mut fs = FlowState::new(1, 1);
        fs.vel = DVec3::new(3.0, -2.0, 0.0);
        BlockFlow::new(dims, &fs)
    }

    #[test]
    fn test_slip_wall_reflects_normal_velocity() {
        let ctx = SimContext::default();
        let mut flow = flow_2d(3, 3);
        BoundaryCondition::SlipWall
            .apply_convective(&ctx, &mut flow, Face::South, 0.0)
            .unwrap();
        // 南面虚拟单元 j = 1, 0
        for j in [0, 1] {
            let v = flow.cell([3, j, 0]).vel;
            assert!((v - DVec3::new(3.0, 2.0, 0.0)).length() < 1e-12);
        }
        let iface = flow.interface(Face::South, 1, 0).unwrap();
        assert!(iface.fs.vel.y.abs() < 1e-12);
    }

    #[test]
    fn test_mirror_source_for_thin_block() {
        let dims = BlockDims::new(Dimension::Two, 1, 4, 1, 2).unwrap();
        let ijk = dims.face_cell(Face::East, 0, 0);
        assert_eq!(mirror_source(&dims, Face::East, ijk, 1), ijk);
        assert_eq!(mirror_source(&dims, Face::East, ijk, 2), ijk);
        let ijk = dims.face_cell(Face::North, 0, 0);
        assert_eq!(mirror_source(&dims, Face::North, ijk, 2), [2, 4, 0]);
    }

    #[test]
    fn test_fixed_pressure_out_sets_ghost_pressure() {
        let ctx = SimContext::default();
        let mut flow = flow_2d(3, 2);
        BoundaryCondition::FixedPressureOut { p_out: 5.0e4 }
            .apply_convective(&ctx, &mut flow, Face::East, 0.0)
            .unwrap();
        assert_eq!(flow.cell([5, 2, 0]).gas.p, 5.0e4);
        assert_eq!(flow.cell([6, 3, 0]).gas.p, 5.0e4);
        assert_eq!(flow.cell([4, 2, 0]).gas.p, 101_325.0);
    }

    #[test]
    fn test_viscous_skipped_when_inviscid() {
        let ctx = SimContext::default();
        let mut flow = flow_2d(3, 2);
        let before = flow.interfaces(Face::North).to_vec();
        BoundaryCondition::fixed_t(500.0)
            .apply_viscous(&ctx, &mut flow, Face::North, 0.0)
            .unwrap();
        assert_eq!(flow.interfaces(Face::North), before.as_slice());
    }
}
