// crates/bf_physics/src/state.rs

//! 流场状态存储
//!
//! 本模块提供边界条件与湍流修正所作用的状态，包括：
//! - GasState: 热力学状态 (rho, p, T[modes], massf[species], mu)
//! - FlowState: 流动状态 (gas, vel, tke, omega)
//! - InterfaceState: 边界界面状态及其局部坐标系
//! - WallInfo: 近壁几何信息（最近壁面单元、半宽、到壁距离）
//! - BlockFlow: 单块的单元状态（含虚拟层）与六个面的界面状态
//!
//! # 布局设计
//!
//! 单元按 [`BlockDims::flat_index`] 扁平存储（i 最快），
//! 界面按 [`BlockDims::face_slot`] 存储在各面自己的数组中。

use bf_foundation::Face;
use bf_mesh::{BlockDims, CellIjk, MeshResult, StructuredGrid};
use glam::DVec3;
use serde::{Deserialize, Serialize};

// ============================================================
// 热力学与流动状态
// ============================================================

/// 热力学状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasState {
    /// 密度 [kg/m³]
    pub rho: f64,
    /// 压力 [Pa]
    pub p: f64,
    /// 各能量模态温度 [K]
    pub t: Vec<f64>,
    /// 组分质量分数
    pub massf: Vec<f64>,
    /// 分子粘度 [Pa·s]
    pub mu: f64,
}

impl GasState {
    /// 标准大气状态，组分全部为第一种
    pub fn new(n_modes: usize, n_species: usize) -> Self {
        let mut massf = vec![0.0; n_species.max(1)];
        massf[0] = 1.0;
        Self {
            rho: 1.225,
            p: 101_325.0,
            t: vec![288.15; n_modes.max(1)],
            massf,
            mu: 1.789e-5,
        }
    }

    /// 所有温度模态设为同一值
    pub fn set_temperature(&mut self, t: f64) {
        self.t.iter_mut().for_each(|x| *x = t);
    }

    /// 状态是否有效
    pub fn is_valid(&self) -> bool {
        self.rho.is_finite()
            && self.rho > 0.0
            && self.p.is_finite()
            && self.p > 0.0
            && self.t.iter().all(|t| t.is_finite() && *t > 0.0)
            && self.massf.iter().all(|f| f.is_finite())
    }
}

/// 流动状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// 热力学状态
    pub gas: GasState,
    /// 速度 [m/s]
    pub vel: DVec3,
    /// 湍动能 [m²/s²]
    pub tke: f64,
    /// 比耗散率 [1/s]
    pub omega: f64,
}

impl FlowState {
    /// 静止的标准大气状态
    pub fn new(n_modes: usize, n_species: usize) -> Self {
        Self {
            gas: GasState::new(n_modes, n_species),
            vel: DVec3::ZERO,
            tke: 0.0,
            omega: 1.0,
        }
    }

    /// 从另一状态复制全部值，复用已有缓冲
    #[inline]
    pub fn copy_values_from(&mut self, other: &FlowState) {
        self.clone_from(other);
    }

    /// 由边界单元 `c0` 及其内侧单元 `c1` 线性外推 `layer` 层
    ///
    /// 外推结果的密度或压力非正时退化为复制 `c0`。
    pub fn extrapolated(c0: &FlowState, c1: &FlowState, layer: usize) -> FlowState {
        let s = layer as f64;
        let lin = |a: f64, b: f64| a + s * (a - b);
        let mut out = c0.clone();
        out.gas.rho = lin(c0.gas.rho, c1.gas.rho);
        out.gas.p = lin(c0.gas.p, c1.gas.p);
        for (t, (&a, &b)) in out.gas.t.iter_mut().zip(c0.gas.t.iter().zip(&c1.gas.t)) {
            *t = lin(a, b);
        }
        out.vel = c0.vel + s * (c0.vel - c1.vel);
        out.tke = lin(c0.tke, c1.tke).max(0.0);
        out.omega = lin(c0.omega, c1.omega);
        if !out.gas.is_valid() || out.omega <= 0.0 {
            return c0.clone();
        }
        out
    }
}

// ============================================================
// 界面状态
// ============================================================

/// 边界界面状态
///
/// `n` 为外法向，`t1`/`t2` 为切向，三者构成右手正交基。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceState {
    /// 界面流动状态
    pub fs: FlowState,
    /// 外法向
    pub n: DVec3,
    /// 第一切向
    pub t1: DVec3,
    /// 第二切向
    pub t2: DVec3,
    /// 界面网格速度（全局坐标）
    pub grid_vel: DVec3,
}

impl InterfaceState {
    /// 以面轴向为基的静止界面
    pub fn axis_aligned(face: Face, fs: FlowState) -> Self {
        let (n, t1, t2) = axis_frame(face);
        Self {
            fs,
            n,
            t1,
            t2,
            grid_vel: DVec3::ZERO,
        }
    }

    /// 全局矢量 → 局部 (n, t1, t2) 分量
    #[inline]
    pub fn to_local(&self, v: DVec3) -> DVec3 {
        DVec3::new(v.dot(self.n), v.dot(self.t1), v.dot(self.t2))
    }

    /// 局部 (n, t1, t2) 分量 → 全局矢量
    #[inline]
    pub fn to_global(&self, local: DVec3) -> DVec3 {
        local.x * self.n + local.y * self.t1 + local.z * self.t2
    }
}

/// 面的轴向局部基 (n, t1, t2)
pub fn axis_frame(face: Face) -> (DVec3, DVec3, DVec3) {
    match face {
        Face::North => (DVec3::Y, DVec3::NEG_X, DVec3::Z),
        Face::South => (DVec3::NEG_Y, DVec3::X, DVec3::Z),
        Face::East => (DVec3::X, DVec3::Y, DVec3::Z),
        Face::West => (DVec3::NEG_X, DVec3::NEG_Y, DVec3::Z),
        Face::Top => (DVec3::Z, DVec3::X, DVec3::Y),
        Face::Bottom => (DVec3::NEG_Z, DVec3::Y, DVec3::X),
    }
}

// ============================================================
// 近壁信息
// ============================================================

/// 单元的近壁几何信息
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallInfo {
    /// 最近无滑移壁面上的边界单元
    pub wall_cell: CellIjk,
    /// 该壁面单元的半宽（形心到壁面距离）
    pub half_width: f64,
    /// 本单元形心到壁面的距离
    pub distance: f64,
}

// ============================================================
// 单块流场
// ============================================================

/// 单块流场
#[derive(Debug, Clone)]
pub struct BlockFlow {
    dims: BlockDims,
    cells: Vec<FlowState>,
    turbulent: Vec<bool>,
    wall: Vec<Option<WallInfo>>,
    faces: [Vec<InterfaceState>; 6],
}

impl BlockFlow {
    /// 以统一初始状态创建
    pub fn new(dims: BlockDims, initial: &FlowState) -> Self {
        let n = dims.n_total();
        let faces = std::array::from_fn(|f| {
            let face = Face::ALL[f];
            if !face.exists_in(dims.dimension) {
                return Vec::new();
            }
            vec![InterfaceState::axis_aligned(face, initial.clone()); dims.face_len(face)]
        });
        Self {
            dims,
            cells: vec![initial.clone(); n],
            turbulent: vec![true; n],
            wall: vec![None; n],
            faces,
        }
    }

    /// 索引范围
    #[inline]
    pub fn dims(&self) -> &BlockDims {
        &self.dims
    }

    /// 单元状态
    ///
    /// # Panics
    ///
    /// `ijk` 超出存储范围（含虚拟层）时 panic。
    #[inline]
    pub fn cell(&self, ijk: CellIjk) -> &FlowState {
        &self.cells[self.dims.flat_index(ijk)]
    }

    /// 单元状态（可变）
    ///
    /// # Panics
    ///
    /// `ijk` 超出存储范围（含虚拟层）时 panic。
    #[inline]
    pub fn cell_mut(&mut self, ijk: CellIjk) -> &mut FlowState {
        let idx = self.dims.flat_index(ijk);
        &mut self.cells[idx]
    }

    /// 单元状态（越界返回 None）
    pub fn get(&self, ijk: CellIjk) -> Option<&FlowState> {
        if self.dims.in_array(ijk) {
            self.cells.get(self.dims.flat_index(ijk))
        } else {
            None
        }
    }

    /// 将 `src` 单元状态复制到 `dst`
    pub fn copy_cell(&mut self, src: CellIjk, dst: CellIjk) {
        let (s, d) = (self.dims.flat_index(src), self.dims.flat_index(dst));
        if s == d {
            return;
        }
        let value = self.cells[s].clone();
        self.cells[d].copy_values_from(&value);
    }

    /// 面上全部界面
    #[inline]
    pub fn interfaces(&self, face: Face) -> &[InterfaceState] {
        &self.faces[face.index()]
    }

    /// 面上全部界面（可变）
    #[inline]
    pub fn interfaces_mut(&mut self, face: Face) -> &mut [InterfaceState] {
        &mut self.faces[face.index()]
    }

    /// 面局部坐标 (p, q) 处的界面
    pub fn interface(&self, face: Face, p: usize, q: usize) -> Option<&InterfaceState> {
        self.faces[face.index()].get(self.dims.face_slot(face, p, q))
    }

    /// 面局部坐标 (p, q) 处的界面（可变）
    pub fn interface_mut(&mut self, face: Face, p: usize, q: usize) -> Option<&mut InterfaceState> {
        let slot = self.dims.face_slot(face, p, q);
        self.faces[face.index()].get_mut(slot)
    }

    /// 设置面上全部界面的网格速度
    pub fn set_grid_velocity(&mut self, face: Face, vel: DVec3) {
        for iface in self.interfaces_mut(face) {
            iface.grid_vel = vel;
        }
    }

    /// 单元是否处于湍流区
    #[inline]
    pub fn is_turbulent(&self, ijk: CellIjk) -> bool {
        self.turbulent[self.dims.flat_index(ijk)]
    }

    /// 设置单元湍流区标记
    pub fn set_turbulent(&mut self, ijk: CellIjk, flag: bool) {
        let idx = self.dims.flat_index(ijk);
        self.turbulent[idx] = flag;
    }

    /// 全部单元设为层流或湍流
    pub fn set_all_turbulent(&mut self, flag: bool) {
        self.turbulent.iter_mut().for_each(|t| *t = flag);
    }

    /// 近壁信息
    #[inline]
    pub fn wall_info(&self, ijk: CellIjk) -> Option<WallInfo> {
        self.wall[self.dims.flat_index(ijk)]
    }

    /// 设置近壁信息
    pub fn set_wall_info(&mut self, ijk: CellIjk, info: Option<WallInfo>) {
        let idx = self.dims.flat_index(ijk);
        self.wall[idx] = info;
    }

    /// 由几何计算每个计算单元到 `wall_faces` 中最近壁面的距离
    ///
    /// 壁面点取同一法向列上边界单元在该面的形心。
    /// `wall_faces` 为空时清除全部近壁信息。
    pub fn compute_wall_info(
        &mut self,
        grid: &StructuredGrid,
        block: usize,
        wall_faces: &[Face],
    ) -> MeshResult<()> {
        self.wall.iter_mut().for_each(|w| *w = None);
        if wall_faces.is_empty() {
            return Ok(());
        }
        let dims = self.dims;
        for ijk in dims.active_cells() {
            let centroid = grid.cell_centroid(block, ijk)?;
            let mut best: Option<WallInfo> = None;
            for &face in wall_faces {
                let (p, q) = dims.face_local(face, ijk);
                let wall_cell = dims.face_cell(face, p, q);
                let wall_point = grid.face_centroid(block, wall_cell, face)?;
                let half_width = grid.cell_centroid(block, wall_cell)?.distance(wall_point);
                let distance = centroid.distance(wall_point);
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(WallInfo {
                        wall_cell,
                        half_width,
                        distance,
                    });
                }
            }
            self.set_wall_info(ijk, best);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_foundation::Dimension;
    use bf_mesh::Topology;

    #[test]
    fn test_gas_state_defaults() {
        let gas = GasState::new(2, 3);
        assert_eq!(gas.t.len(), 2);
        assert_eq!(gas.massf, vec![1.0, 0.0, 0.0]);
        assert!(gas.is_valid());
    }

    #[test]
    fn test_axis_frames_are_orthonormal_right_handed() {
        for face in Face::ALL {
            let (n, t1, t2) = axis_frame(face);
            assert!((n.cross(t1) - t2).length() < 1e-12, "{}", face);
        }
    }

    #[test]
    fn test_interface_local_round_trip() {
        let iface = InterfaceState::axis_aligned(Face::North, FlowState::new(1, 1));
        let v = DVec3::new(1.0, 2.0, 3.0);
        let local = iface.to_local(v);
        assert!((local.x - 2.0).abs() < 1e-12);
        assert!((iface.to_global(local) - v).length() < 1e-12);
    }

    #[test]
    fn test_extrapolation_falls_back_to_copy() {
        let c0 = FlowState::new(1, 1);
        let mut c1 = c0.clone();
        c1.gas.rho = 10.0 * c0.gas.rho;
        let out = FlowState::extrapolated(&c0, &c1, 1);
        assert_eq!(out, c0);
    }

    #[test]
    fn test_block_flow_face_storage() {
        let dims = BlockDims::new(Dimension::Two, 4, 3, 1, 2).unwrap();
        let flow = BlockFlow::new(dims, &FlowState::new(1, 1));
        assert_eq!(flow.interfaces(Face::North).len(), 4);
        assert_eq!(flow.interfaces(Face::East).len(), 3);
        assert!(flow.interfaces(Face::Top).is_empty());
        assert!(flow.get([100, 0, 0]).is_none());
    }

    #[test]
    fn test_wall_distance_south_wall() {
        let mut topo = Topology::new(Dimension::Two, 2);
        topo.add_block("b", 2, 4, 1).unwrap();
        let grid = StructuredGrid::cartesian(
            &topo,
            &[(DVec3::ZERO, DVec3::new(2.0, 4.0, 1.0))],
        )
        .unwrap();
        let dims = *topo.dims(0).unwrap();
        let mut flow = BlockFlow::new(dims, &FlowState::new(1, 1));
        flow.compute_wall_info(&grid, 0, &[Face::South]).unwrap();

        let first = flow.wall_info([2, 2, 0]).unwrap();
        assert!((first.half_width - 0.5).abs() < 1e-12);
        assert!((first.distance - 0.5).abs() < 1e-12);
        let third = flow.wall_info([2, 4, 0]).unwrap();
        assert_eq!(third.wall_cell, [2, 2, 0]);
        assert!((third.distance - 2.5).abs() < 1e-12);
    }
}
