// crates/bf_physics/src/turbulence.rs

//! 近壁 omega 修正（Menter 1994）
//!
//! 在一步内全部壁面边界处理完成后，对每个无滑移粘性壁面附近一层单元，
//! 以解析的理想近壁值截断比耗散率：
//!
//! ```text
//! omega_wall  = 60 (mu / rho)_wall / (0.075 d0²)
//! omega_ideal = omega_wall · d0² / (d0 + d)²
//! omega       = min(omega_ideal, omega)      仅湍流区单元
//! ```
//!
//! 其中 `d0` 为最近壁面单元的半宽，`d` 为单元到壁面的距离。
//! 层深取 `min(法向单元数 / 2, 6)`。修正后，滑移壁与外推出流面上的
//! 界面 omega 从相邻单元重新同步。

use bf_foundation::Face;
use bf_mesh::CellIjk;

use crate::boundary::{BoundaryCondition, BoundaryKind};
use crate::context::SimContext;
use crate::state::BlockFlow;

/// 名义修正层深
pub const NOMINAL_LAYER_DEPTH: usize = 6;

/// 壁面理想 omega，单元无近壁信息或壁面单元密度非正时返回 None
pub fn ideal_omega_at_wall(flow: &BlockFlow, ijk: CellIjk) -> Option<f64> {
    let info = flow.wall_info(ijk)?;
    let gas = &flow.get(info.wall_cell)?.gas;
    let d0 = info.half_width;
    if gas.rho <= 0.0 || d0 <= 0.0 {
        return None;
    }
    Some(60.0 * (gas.mu / gas.rho) / (0.075 * d0 * d0))
}

/// 单元处的理想 omega
pub fn ideal_omega(flow: &BlockFlow, ijk: CellIjk) -> Option<f64> {
    let info = flow.wall_info(ijk)?;
    let at_wall = ideal_omega_at_wall(flow, ijk)?;
    let d0 = info.half_width;
    let sum = d0 + info.distance;
    Some(at_wall * (d0 * d0) / (sum * sum))
}

/// 对单块施加近壁 omega 修正，返回被截断的单元数
///
/// 非粘性或非 k-omega 模型时什么也不做。
pub fn apply_menter_correction(
    ctx: &SimContext,
    flow: &mut BlockFlow,
    bcs: &[BoundaryCondition; 6],
) -> usize {
    if !ctx.needs_menter_correction() {
        return 0;
    }
    let dims = *flow.dims();
    let faces = Face::faces_for(ctx.dimension);
    let mut corrected = 0;

    for &face in faces {
        if !bcs[face.index()].is_no_slip_wall() {
            continue;
        }
        let depth = (dims.extent(face.axis()) / 2).min(NOMINAL_LAYER_DEPTH);
        for fc in dims.face_cells(face) {
            for d in 0..depth {
                let Some(ijk) = dims.interior_cell(face, fc.ijk, d) else {
                    break;
                };
                if !flow.is_turbulent(ijk) {
                    continue;
                }
                let Some(ideal) = ideal_omega(flow, ijk) else {
                    continue;
                };
                let cell = flow.cell_mut(ijk);
                if ideal < cell.omega {
                    cell.omega = ideal;
                    corrected += 1;
                }
            }
        }
    }

    for &face in faces {
        if !matches!(
            bcs[face.index()].kind(),
            BoundaryKind::SlipWall | BoundaryKind::ExtrapolateOut
        ) {
            continue;
        }
        for fc in dims.face_cells(face) {
            let omega = flow.cell(fc.ijk).omega;
            if let Some(iface) = flow.interface_mut(face, fc.p, fc.q) {
                iface.fs.omega = omega;
            }
        }
    }

    tracing::debug!("menter correction: {} cells clipped", corrected);
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FlowState, WallInfo};
    use bf_foundation::Dimension;
    use bf_mesh::BlockDims;

    #[test]
    fn test_ideal_omega_formula() {
        let dims = BlockDims::new(Dimension::Two, 2, 2, 1, 2).unwrap();
        let mut fs = FlowState::new(1, 1);
        fs.gas.rho = 2.0;
        fs.gas.mu = 3.0e-5;
        let mut flow = BlockFlow::new(dims, &fs);
        flow.set_wall_info(
            [2, 3, 0],
            Some(WallInfo {
                wall_cell: [2, 2, 0],
                half_width: 0.1,
                distance: 0.3,
            }),
        );
        let at_wall = 60.0 * (3.0e-5 / 2.0) / (0.075 * 0.01);
        let got = ideal_omega_at_wall(&flow, [2, 3, 0]).unwrap();
        assert!((got - at_wall).abs() < 1e-12);
        let ideal = ideal_omega(&flow, [2, 3, 0]).unwrap();
        assert!((ideal - at_wall * 0.01 / 0.16).abs() < 1e-10);
        assert!(ideal_omega(&flow, [3, 3, 0]).is_none());
    }

    #[test]
    fn test_no_effect_when_laminar_model() {
        let ctx = SimContext {
            viscous: true,
            ..Default::default()
        };
        let dims = BlockDims::new(Dimension::Two, 2, 2, 1, 2).unwrap();
        let mut flow = BlockFlow::new(dims, &FlowState::new(1, 1));
        let bcs: [BoundaryCondition; 6] = std::array::from_fn(|_| BoundaryCondition::fixed_t(300.0));
        assert_eq!(apply_menter_correction(&ctx, &mut flow, &bcs), 0);
    }
}
