// crates/bf_mesh/src/cell_finder.rs

//! 多块结构网格点定位
//!
//! 从上一次已知的 (块, 单元) 出发，逐单元朝查询点步进，必要时经相邻面
//! 按方向变换跳到邻块。用于辐射视线采样与探针插值。
//!
//! # 状态机
//!
//! - `InsideGrid`: 找到包含点的单元
//! - `Exit(face)`: 从非相邻面离开计算域，索引截回边界单元
//! - `Error`: 超出迭代上限，调用者应视为“未找到”
//!
//! # 几何判断
//!
//! - 2D: 对四条边计算 `(v_i - p) × (v_{i+1} - v_i)` 的 z 分量，对边符号决定 (di, dj)
//! - 3D: 对六个面计算点与面上三个有序顶点构成的四面体有向体积，对面符号决定 (di, dj, dk)
//!
//! # 并发
//!
//! 搜索只读拓扑与几何。每个工作线程使用 [`ScratchPool`] 中自己的槽位，
//! 槽位在构造时按工作线程数分配，之后不再改变大小。
//!
//! # 示例
//!
//! ```
//! use bf_foundation::Dimension;
//! use bf_mesh::cell_finder::{CellFinder, CellLocation, SearchStatus};
//! use bf_mesh::geometry::StructuredGrid;
//! use bf_mesh::topology::Topology;
//! use glam::DVec3;
//!
//! let mut topo = Topology::new(Dimension::Two, 2);
//! topo.add_block("b0", 4, 4, 1).unwrap();
//! let grid = StructuredGrid::cartesian(&topo, &[(DVec3::ZERO, DVec3::new(4.0, 4.0, 0.0))]).unwrap();
//! let finder = CellFinder::new(&topo, &grid, 1).unwrap();
//!
//! let mut scratch = finder.new_scratch();
//! let guess = CellLocation::new(0, [2, 2, 0]);
//! let found = finder.find_cell(&mut scratch, DVec3::new(2.5, 1.5, 0.0), guess).unwrap();
//! assert_eq!(found.status, SearchStatus::InsideGrid);
//! assert_eq!(found.location.ijk, [4, 3, 0]);
//! ```

use crate::block::CellIjk;
use crate::error::{MeshError, MeshResult};
use crate::geometry::{corner_volume, signed_area, BlockGeometry, CellVertices};
use crate::topology::{FaceLink, Topology};
use bf_foundation::{Axis, Face};
use glam::DVec3;
use parking_lot::Mutex;
use rayon::prelude::*;

// ============================================================
// 搜索结果
// ============================================================

/// (块, 单元) 位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellLocation {
    /// 块编号
    pub block: usize,
    /// 单元索引（含虚拟层偏移）
    pub ijk: CellIjk,
}

impl CellLocation {
    /// 创建位置
    pub fn new(block: usize, ijk: CellIjk) -> Self {
        Self { block, ijk }
    }
}

/// 搜索终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// 点位于某个计算单元内
    InsideGrid,
    /// 点从该面离开计算域
    Exit(Face),
    /// 超出迭代上限
    Error,
}

/// 一次搜索的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSearch {
    /// 终止状态
    pub status: SearchStatus,
    /// 终止位置。`Exit` 时为截回后的边界单元，`Error` 时为最后到达的单元
    pub location: CellLocation,
    /// 几何判断次数（含跨块跳转）
    pub iterations: usize,
    /// 最后一次计算的步进
    pub step: [i32; 3],
    /// 经过的跨块跳转次数
    pub hops: usize,
}

impl CellSearch {
    /// 找到时返回位置
    pub fn located(&self) -> Option<CellLocation> {
        match self.status {
            SearchStatus::InsideGrid => Some(self.location),
            _ => None,
        }
    }

    /// `Error` 状态转换为 `SearchBounded` 错误
    pub fn into_result(self) -> MeshResult<Self> {
        match self.status {
            SearchStatus::Error => Err(MeshError::search_bounded(
                self.location.block,
                self.iterations,
            )),
            _ => Ok(self),
        }
    }
}

// ============================================================
// 每线程暂存
// ============================================================

/// 单次搜索的暂存缓冲
#[derive(Debug, Clone)]
pub struct FinderScratch {
    vertices: CellVertices,
    signs: [f64; 6],
    step: [i32; 3],
    visited: Vec<bool>,
}

impl FinderScratch {
    fn new(n_blocks: usize) -> Self {
        Self {
            vertices: [DVec3::ZERO; 8],
            signs: [0.0; 6],
            step: [0; 3],
            visited: vec![false; n_blocks],
        }
    }

    fn reset(&mut self) {
        self.signs = [0.0; 6];
        self.step = [0; 3];
        self.visited.iter_mut().for_each(|v| *v = false);
    }
}

/// 按工作线程编号索引的暂存池
pub struct ScratchPool {
    slots: Vec<Mutex<FinderScratch>>,
}

impl ScratchPool {
    fn new(n_workers: usize, n_blocks: usize) -> Self {
        let slots = (0..n_workers.max(1))
            .map(|_| Mutex::new(FinderScratch::new(n_blocks)))
            .collect();
        Self { slots }
    }

    /// 槽位数
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否为空（构造后至少有一个槽位）
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 在指定工作线程的槽位上执行闭包
    ///
    /// 编号超出槽位数时取模，共享槽位由互斥锁保护。
    pub fn with_slot<R>(&self, worker: usize, f: impl FnOnce(&mut FinderScratch) -> R) -> R {
        let mut guard = self.slots[worker % self.slots.len()].lock();
        f(&mut guard)
    }
}

// ============================================================
// 点定位器
// ============================================================

/// 多块点定位器
pub struct CellFinder<'a, G: BlockGeometry> {
    topology: &'a Topology,
    geometry: &'a G,
    pool: ScratchPool,
    cross_block_3d: bool,
}

impl<'a, G: BlockGeometry> CellFinder<'a, G> {
    /// 创建点定位器并检查几何
    ///
    /// 以下情况返回 `UnsupportedGeometry`：
    /// - 几何块数与拓扑不符
    /// - 单元不是四边形（2D）或六面体（3D）
    /// - 存在非正面积/体积的单元（顶点顺序不是逆时针/右手系）
    pub fn new(topology: &'a Topology, geometry: &'a G, n_workers: usize) -> MeshResult<Self> {
        if geometry.n_blocks() != topology.n_blocks() {
            return Err(MeshError::unsupported_geometry(format!(
                "几何块数 {} 与拓扑块数 {} 不符",
                geometry.n_blocks(),
                topology.n_blocks()
            )));
        }
        let dim = topology.dimension();
        let mut v = [DVec3::ZERO; 8];
        for bt in topology.blocks() {
            let nv = geometry.vertices_per_cell(bt.id);
            if nv != dim.vertices_per_cell() {
                return Err(MeshError::unsupported_geometry(format!(
                    "块 {}: {} 单元需要 {} 个顶点, 实际 {} 个 (仅支持四边形/六面体)",
                    bt.id,
                    dim,
                    dim.vertices_per_cell(),
                    nv
                )));
            }
            for ijk in bt.dims.active_cells() {
                geometry.cell_vertices(bt.id, ijk, &mut v)?;
                let measure = if dim.is_3d() {
                    corner_volume(&v)
                } else {
                    signed_area(&v)
                };
                if measure <= 0.0 {
                    return Err(MeshError::unsupported_geometry(format!(
                        "块 {} 单元 {:?}: 顶点顺序反向或退化 (有向量 {:.3e})",
                        bt.id, ijk, measure
                    )));
                }
            }
        }
        Ok(Self {
            topology,
            geometry,
            pool: ScratchPool::new(n_workers, topology.n_blocks()),
            cross_block_3d: false,
        })
    }

    /// 启用 3D 跨块跳转（默认关闭，遇到相邻面返回 `UnsupportedGeometry`）
    pub fn with_cross_block_3d(mut self, enabled: bool) -> Self {
        self.cross_block_3d = enabled;
        self
    }

    /// 暂存池
    pub fn pool(&self) -> &ScratchPool {
        &self.pool
    }

    /// 创建独立暂存，供调用者自行管理线程时使用
    pub fn new_scratch(&self) -> FinderScratch {
        FinderScratch::new(self.topology.n_blocks())
    }

    /// 搜索包含 `point` 的单元
    ///
    /// 2D 时忽略 `point.z`。`guess` 落在虚拟层时先截回最近的计算单元。
    pub fn find_cell(
        &self,
        scratch: &mut FinderScratch,
        point: DVec3,
        guess: CellLocation,
    ) -> MeshResult<CellSearch> {
        let dim = self.topology.dimension();
        let mut block = guess.block;
        let mut dims = *self.topology.dims(block)?;
        // 猜测落在虚拟层时先截回计算区
        let mut idx = clamp_active(
            &dims,
            [
                guess.ijk[0] as isize,
                guess.ijk[1] as isize,
                guess.ijk[2] as isize,
            ],
        );
        scratch.reset();
        if scratch.visited.len() != self.topology.n_blocks() {
            scratch.visited = vec![false; self.topology.n_blocks()];
        }
        scratch.visited[block] = true;
        let mut bound = dims.imax() + dims.jmax() + dims.kmax();
        let mut iterations = 0usize;
        let mut hops = 0usize;

        loop {
            // (1) 是否已离开当前块
            if let Some(face) = exit_face(&dims, idx) {
                let clamped = clamp_active(&dims, idx);
                match *self.topology.link(block, face)? {
                    FaceLink::Adjacent(nb) => {
                        if dim.is_3d() && !self.cross_block_3d {
                            return Err(MeshError::unsupported_geometry(format!(
                                "3D 跨块点定位未启用: 块 {} 面 {} 连接到块 {}",
                                block, face, nb.block
                            )));
                        }
                        let (next_block, cell) =
                            self.topology.partner_cell(block, face, to_ijk(clamped))?;
                        tracing::trace!(
                            "cell_finder: hop block {} {} -> block {} {:?}",
                            block,
                            face,
                            next_block,
                            cell
                        );
                        block = next_block;
                        dims = *self.topology.dims(block)?;
                        idx = [cell[0] as isize, cell[1] as isize, cell[2] as isize];
                        if !scratch.visited[block] {
                            scratch.visited[block] = true;
                            bound += dims.imax() + dims.jmax() + dims.kmax();
                        }
                        hops += 1;
                        iterations += 1;
                        if iterations > bound {
                            return Ok(self.bounded(block, idx, iterations, scratch.step, hops));
                        }
                        continue;
                    }
                    FaceLink::Boundary => {
                        return Ok(CellSearch {
                            status: SearchStatus::Exit(face),
                            location: CellLocation::new(block, to_ijk(clamped)),
                            iterations,
                            step: scratch.step,
                            hops,
                        });
                    }
                }
            }

            // (2) 几何判断
            iterations += 1;
            if iterations > bound {
                return Ok(self.bounded(block, idx, iterations, scratch.step, hops));
            }
            let ijk = to_ijk(idx);
            self.geometry
                .cell_vertices(block, ijk, &mut scratch.vertices)?;
            if dim.is_3d() {
                step_hex(point, &scratch.vertices, &mut scratch.signs, &mut scratch.step);
            } else {
                step_quad(point, &scratch.vertices, &mut scratch.signs, &mut scratch.step);
            }

            // (3) 找到或前进
            if scratch.step == [0, 0, 0] {
                return Ok(CellSearch {
                    status: SearchStatus::InsideGrid,
                    location: CellLocation::new(block, ijk),
                    iterations,
                    step: scratch.step,
                    hops,
                });
            }
            for a in 0..3 {
                idx[a] += scratch.step[a] as isize;
            }
        }
    }

    /// 使用暂存池中指定工作线程的槽位搜索
    pub fn find_cell_on(&self, worker: usize, point: DVec3, guess: CellLocation) -> MeshResult<CellSearch> {
        self.pool
            .with_slot(worker, |scratch| self.find_cell(scratch, point, guess))
    }

    /// 并行批量搜索
    ///
    /// 每个查询使用 rayon 当前线程编号对应的暂存槽位。
    pub fn locate_batch(&self, queries: &[(DVec3, CellLocation)]) -> Vec<MeshResult<CellSearch>> {
        queries
            .par_iter()
            .map(|&(point, guess)| {
                let worker = rayon::current_thread_index().unwrap_or(0);
                self.find_cell_on(worker, point, guess)
            })
            .collect()
    }

    fn bounded(
        &self,
        block: usize,
        idx: [isize; 3],
        iterations: usize,
        step: [i32; 3],
        hops: usize,
    ) -> CellSearch {
        tracing::warn!(
            "cell_finder: 块 {} 迭代 {} 次仍未收敛, 停在 {:?}",
            block,
            iterations,
            idx
        );
        CellSearch {
            status: SearchStatus::Error,
            location: CellLocation::new(block, to_ijk(idx)),
            iterations,
            step,
            hops,
        }
    }
}

// ============================================================
// 控制骨架辅助
// ============================================================

/// 第一个越界的轴对应的离开面（按 i、j、k 顺序）
fn exit_face(dims: &crate::block::BlockDims, idx: [isize; 3]) -> Option<Face> {
    const AXES: [(Axis, Face, Face); 3] = [
        (Axis::I, Face::West, Face::East),
        (Axis::J, Face::South, Face::North),
        (Axis::K, Face::Bottom, Face::Top),
    ];
    for (axis, low, high) in AXES {
        let x = idx[axis.index()];
        if x < dims.min(axis) as isize {
            return Some(low);
        }
        if x > dims.max(axis) as isize {
            return Some(high);
        }
    }
    None
}

fn clamp_active(dims: &crate::block::BlockDims, idx: [isize; 3]) -> [isize; 3] {
    let mut out = idx;
    for axis in [Axis::I, Axis::J, Axis::K] {
        let a = axis.index();
        out[a] = idx[a].clamp(dims.min(axis) as isize, dims.max(axis) as isize);
    }
    out
}

fn to_ijk(idx: [isize; 3]) -> CellIjk {
    [
        idx[0].max(0) as usize,
        idx[1].max(0) as usize,
        idx[2].max(0) as usize,
    ]
}

// ============================================================
// 几何内核
// ============================================================

/// 对边符号 → 单位步进
#[inline]
fn pair_step(toward_max: f64, toward_min: f64) -> i32 {
    if toward_max > 0.0 && toward_min < 0.0 {
        1
    } else if toward_max < 0.0 && toward_min > 0.0 {
        -1
    } else {
        0
    }
}

/// 2D 四边形内核
///
/// `a[e]` 为边 e (v_e → v_{e+1}) 与 `v_e - p` 叉积的 z 分量，点在边内侧时为正。
/// 边 0/1/2/3 分别为 south/east/north/west。
pub fn step_quad(p: DVec3, v: &CellVertices, a: &mut [f64; 6], step: &mut [i32; 3]) {
    for e in 0..4 {
        let v0 = v[e];
        let v1 = v[(e + 1) % 4];
        let r = v0 - p;
        let edge = v1 - v0;
        a[e] = r.x * edge.y - r.y * edge.x;
    }
    // a < 0 表示点在该边外侧
    step[0] = pair_step(-a[1], -a[3]);
    step[1] = pair_step(-a[2], -a[0]);
    step[2] = 0;
}

/// 3D 六面体内核
///
/// 每个面取三个有序顶点，`a = (v0-p)·((v1-p)×(v2-p))`，点在面内侧时为负。
pub fn step_hex(p: DVec3, v: &CellVertices, a: &mut [f64; 6], step: &mut [i32; 3]) {
    const FACE_VERTS: [[usize; 3]; 6] = [
        [2, 6, 7], // north
        [5, 6, 2], // east
        [0, 4, 5], // south
        [0, 3, 7], // west
        [7, 6, 5], // top
        [0, 1, 2], // bottom
    ];
    for (f, ids) in FACE_VERTS.iter().enumerate() {
        let r0 = v[ids[0]] - p;
        let r1 = v[ids[1]] - p;
        let r2 = v[ids[2]] - p;
        a[f] = r0.dot(r1.cross(r2));
    }
    step[0] = pair_step(a[Face::East.index()], a[Face::West.index()]);
    step[1] = pair_step(a[Face::North.index()], a[Face::South.index()]);
    step[2] = pair_step(a[Face::Top.index()], a[Face::Bottom.index()]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> CellVertices {
        let mut v = [DVec3::ZERO; 8];
        v[1] = DVec3::new(1.0, 0.0, 0.0);
        v[2] = DVec3::new(1.0, 1.0, 0.0);
        v[3] = DVec3::new(0.0, 1.0, 0.0);
        v
    }

    fn unit_cube() -> CellVertices {
        let sq = unit_square();
        let mut v = sq;
        for i in 0..4 {
            v[i + 4] = sq[i] + DVec3::Z;
        }
        v
    }

    #[test]
    fn test_quad_kernel_inside() {
        let (mut a, mut s) = ([0.0; 6], [9; 3]);
        step_quad(DVec3::new(0.5, 0.5, 0.0), &unit_square(), &mut a, &mut s);
        assert_eq!(s, [0, 0, 0]);
        assert!(a[..4].iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_quad_kernel_directions() {
        let v = unit_square();
        let (mut a, mut s) = ([0.0; 6], [0; 3]);
        step_quad(DVec3::new(1.5, 0.5, 0.0), &v, &mut a, &mut s);
        assert_eq!(s, [1, 0, 0]);
        step_quad(DVec3::new(-0.5, 0.5, 0.0), &v, &mut a, &mut s);
        assert_eq!(s, [-1, 0, 0]);
        step_quad(DVec3::new(0.5, 1.5, 0.0), &v, &mut a, &mut s);
        assert_eq!(s, [0, 1, 0]);
        step_quad(DVec3::new(-0.5, -0.5, 0.0), &v, &mut a, &mut s);
        assert_eq!(s, [-1, -1, 0]);
    }

    #[test]
    fn test_hex_kernel() {
        let v = unit_cube();
        let (mut a, mut s) = ([0.0; 6], [0; 3]);
        step_hex(DVec3::splat(0.5), &v, &mut a, &mut s);
        assert_eq!(s, [0, 0, 0]);
        assert!(a.iter().all(|&x| x < 0.0));
        step_hex(DVec3::new(0.5, 0.5, 1.5), &v, &mut a, &mut s);
        assert_eq!(s, [0, 0, 1]);
        step_hex(DVec3::new(1.5, -0.5, 0.5), &v, &mut a, &mut s);
        assert_eq!(s, [1, -1, 0]);
    }

    #[test]
    fn test_scratch_pool_wraps_worker_index() {
        let pool = ScratchPool::new(2, 3);
        assert_eq!(pool.len(), 2);
        let n = pool.with_slot(5, |s| s.visited.len());
        assert_eq!(n, 3);
    }

    #[test]
    fn test_search_into_result() {
        let s = CellSearch {
            status: SearchStatus::Error,
            location: CellLocation::new(1, [2, 2, 0]),
            iterations: 10,
            step: [1, 0, 0],
            hops: 0,
        };
        assert!(s.located().is_none());
        assert!(matches!(
            s.into_result(),
            Err(MeshError::SearchBounded { block: 1, iterations: 10 })
        ));
    }
}
