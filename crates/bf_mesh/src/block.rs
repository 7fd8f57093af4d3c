// crates/bf_mesh/src/block.rs

//! 结构块索引范围与面遍历
//!
//! 每个块是逻辑矩形的单元阵列，四周带 `nghost` 层虚拟单元：
//!
//! ```text
//!   i: 0 .. nghost-1 | imin ..= imax | imax+1 .. imax+nghost
//!      (虚拟单元)       (计算单元)       (虚拟单元)
//! ```
//!
//! 2D 时 k 方向退化为单层 (`kmin = kmax = 0`)，不带虚拟层。
//!
//! # 面局部坐标
//!
//! 每个面有两个面内轴 (p, q)，从 0 开始计数：
//!
//! | 面 | p 轴 | q 轴 |
//! |----|------|------|
//! | North / South | i | k |
//! | East / West   | j | k |
//! | Top / Bottom  | i | j |
//!
//! 所有边界条件与近壁修正都通过 [`BlockDims::face_cells`] 遍历面单元，
//! 遍历顺序为先固定法向索引，再扫 q、p 两个面内轴。
//!
//! # 示例
//!
//! ```
//! use bf_foundation::{Dimension, Face};
//! use bf_mesh::block::BlockDims;
//!
//! let dims = BlockDims::new(Dimension::Two, 4, 3, 1, 2).unwrap();
//! assert_eq!((dims.imin(), dims.imax()), (2, 5));
//! let west: Vec<_> = dims.face_cells(Face::West).map(|c| c.ijk).collect();
//! assert_eq!(west, vec![[2, 2, 0], [2, 3, 0], [2, 4, 0]]);
//! ```

use crate::error::{MeshError, MeshResult};
use bf_foundation::{Axis, Dimension, Face};
use serde::{Deserialize, Serialize};

/// 单元的三维结构索引（含虚拟层偏移）
pub type CellIjk = [usize; 3];

/// 块的索引范围描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDims {
    /// 维度
    pub dimension: Dimension,
    /// i 方向计算单元数
    pub nni: usize,
    /// j 方向计算单元数
    pub nnj: usize,
    /// k 方向计算单元数（2D 恒为 1）
    pub nnk: usize,
    /// 虚拟单元层数
    pub nghost: usize,
}

impl BlockDims {
    /// 创建索引范围
    ///
    /// 2D 时 `nnk` 被忽略并置为 1。任何方向单元数为零或 `nghost` 为零时返回错误。
    pub fn new(
        dimension: Dimension,
        nni: usize,
        nnj: usize,
        nnk: usize,
        nghost: usize,
    ) -> MeshResult<Self> {
        let nnk = if dimension.is_3d() { nnk } else { 1 };
        if nni == 0 || nnj == 0 || nnk == 0 {
            return Err(MeshError::invalid_topology(
                "block_dims",
                format!("单元数必须为正: nni={}, nnj={}, nnk={}", nni, nnj, nnk),
            ));
        }
        if nghost == 0 {
            return Err(MeshError::invalid_topology("block_dims", "nghost 必须至少为 1"));
        }
        Ok(Self {
            dimension,
            nni,
            nnj,
            nnk,
            nghost,
        })
    }

    // ------------------------------------------------------------------
    // 计算单元范围
    // ------------------------------------------------------------------

    /// i 最小计算索引
    #[inline]
    pub fn imin(&self) -> usize {
        self.nghost
    }

    /// i 最大计算索引
    #[inline]
    pub fn imax(&self) -> usize {
        self.nghost + self.nni - 1
    }

    /// j 最小计算索引
    #[inline]
    pub fn jmin(&self) -> usize {
        self.nghost
    }

    /// j 最大计算索引
    #[inline]
    pub fn jmax(&self) -> usize {
        self.nghost + self.nnj - 1
    }

    /// k 最小计算索引
    #[inline]
    pub fn kmin(&self) -> usize {
        if self.dimension.is_3d() {
            self.nghost
        } else {
            0
        }
    }

    /// k 最大计算索引
    #[inline]
    pub fn kmax(&self) -> usize {
        self.kmin() + self.nnk - 1
    }

    /// 指定轴的计算单元数
    #[inline]
    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => self.nni,
            Axis::J => self.nnj,
            Axis::K => self.nnk,
        }
    }

    /// 指定轴的最小计算索引
    #[inline]
    pub fn min(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => self.imin(),
            Axis::J => self.jmin(),
            Axis::K => self.kmin(),
        }
    }

    /// 指定轴的最大计算索引
    #[inline]
    pub fn max(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => self.imax(),
            Axis::J => self.jmax(),
            Axis::K => self.kmax(),
        }
    }

    /// 计算单元总数
    pub fn n_active(&self) -> usize {
        self.nni * self.nnj * self.nnk
    }

    // ------------------------------------------------------------------
    // 含虚拟层的存储布局
    // ------------------------------------------------------------------

    /// 含虚拟层的阵列形状
    pub fn array_shape(&self) -> [usize; 3] {
        let g2 = 2 * self.nghost;
        let nk = if self.dimension.is_3d() {
            self.nnk + g2
        } else {
            1
        };
        [self.nni + g2, self.nnj + g2, nk]
    }

    /// 含虚拟层的单元总数
    pub fn n_total(&self) -> usize {
        let [ni, nj, nk] = self.array_shape();
        ni * nj * nk
    }

    /// 扁平存储下标（i 最快）
    #[inline]
    pub fn flat_index(&self, ijk: CellIjk) -> usize {
        let [ni, nj, _] = self.array_shape();
        ijk[0] + ni * (ijk[1] + nj * ijk[2])
    }

    /// 索引是否在含虚拟层的阵列内
    pub fn in_array(&self, ijk: CellIjk) -> bool {
        let shape = self.array_shape();
        ijk.iter().zip(shape.iter()).all(|(&x, &n)| x < n)
    }

    /// 有符号索引是否落在计算单元范围内
    pub fn contains_active(&self, ijk: [isize; 3]) -> bool {
        [Axis::I, Axis::J, Axis::K].iter().all(|&axis| {
            let x = ijk[axis.index()];
            x >= self.min(axis) as isize && x <= self.max(axis) as isize
        })
    }

    /// 遍历全部计算单元（i 最快）
    pub fn active_cells(&self) -> impl Iterator<Item = CellIjk> + '_ {
        (self.kmin()..=self.kmax()).flat_map(move |k| {
            (self.jmin()..=self.jmax())
                .flat_map(move |j| (self.imin()..=self.imax()).map(move |i| [i, j, k]))
        })
    }

    // ------------------------------------------------------------------
    // 面局部坐标
    // ------------------------------------------------------------------

    /// 面的两个面内轴 (p, q)
    pub fn in_plane_axes(face: Face) -> (Axis, Axis) {
        match face {
            Face::North | Face::South => (Axis::I, Axis::K),
            Face::East | Face::West => (Axis::J, Axis::K),
            Face::Top | Face::Bottom => (Axis::I, Axis::J),
        }
    }

    /// 面上单元数 (np, nq)
    pub fn face_extents(&self, face: Face) -> (usize, usize) {
        let (pa, qa) = Self::in_plane_axes(face);
        (self.extent(pa), self.extent(qa))
    }

    /// 面上单元总数
    pub fn face_len(&self, face: Face) -> usize {
        let (np, nq) = self.face_extents(face);
        np * nq
    }

    /// 面槽位下标 `p + q * np`，用于按面存储界面数据
    #[inline]
    pub fn face_slot(&self, face: Face, p: usize, q: usize) -> usize {
        let (np, _) = self.face_extents(face);
        p + q * np
    }

    /// 面法向上的固定索引（边界计算单元所在层）
    pub fn face_fixed_index(&self, face: Face) -> usize {
        if face.is_max_side() {
            self.max(face.axis())
        } else {
            self.min(face.axis())
        }
    }

    /// 面局部坐标 → 边界计算单元索引
    pub fn face_cell(&self, face: Face, p: usize, q: usize) -> CellIjk {
        let (pa, qa) = Self::in_plane_axes(face);
        let mut ijk = [0usize; 3];
        ijk[face.axis().index()] = self.face_fixed_index(face);
        ijk[pa.index()] = self.min(pa) + p;
        ijk[qa.index()] = self.min(qa) + q;
        ijk
    }

    /// 单元索引 → 面局部坐标（忽略法向分量）
    pub fn face_local(&self, face: Face, ijk: CellIjk) -> (usize, usize) {
        let (pa, qa) = Self::in_plane_axes(face);
        (
            ijk[pa.index()].saturating_sub(self.min(pa)),
            ijk[qa.index()].saturating_sub(self.min(qa)),
        )
    }

    /// 遍历面上的全部边界计算单元
    pub fn face_cells(&self, face: Face) -> FaceCells {
        let (np, nq) = self.face_extents(face);
        FaceCells {
            dims: *self,
            face,
            np,
            nq,
            p: 0,
            q: 0,
        }
    }

    /// 从边界单元沿外法向移动 `layer` 层得到的虚拟单元（`layer >= 1`）
    ///
    /// `layer` 超过 `nghost` 时结果被截断到最外层虚拟单元。
    pub fn ghost_cell(&self, face: Face, ijk: CellIjk, layer: usize) -> CellIjk {
        let layer = layer.min(self.nghost);
        let axis = face.axis().index();
        let mut out = ijk;
        if face.is_max_side() {
            out[axis] = ijk[axis] + layer;
        } else {
            out[axis] = ijk[axis].saturating_sub(layer);
        }
        out
    }

    /// 从边界单元沿内法向移动 `depth` 层得到的计算单元
    ///
    /// 超出块范围时返回 `None`。`depth = 0` 即边界单元本身。
    pub fn interior_cell(&self, face: Face, ijk: CellIjk, depth: usize) -> Option<CellIjk> {
        let axis = face.axis();
        if depth >= self.extent(axis) {
            return None;
        }
        let a = axis.index();
        let mut out = ijk;
        if face.is_max_side() {
            out[a] = ijk[a].checked_sub(depth)?;
        } else {
            out[a] = ijk[a] + depth;
        }
        Some(out)
    }
}

/// 面单元：边界计算单元索引及其面局部坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCell {
    /// 边界计算单元索引
    pub ijk: CellIjk,
    /// 面局部 p 坐标
    pub p: usize,
    /// 面局部 q 坐标
    pub q: usize,
}

/// 面单元迭代器，由 [`BlockDims::face_cells`] 创建
#[derive(Debug, Clone)]
pub struct FaceCells {
    dims: BlockDims,
    face: Face,
    np: usize,
    nq: usize,
    p: usize,
    q: usize,
}

impl Iterator for FaceCells {
    type Item = FaceCell;

    fn next(&mut self) -> Option<FaceCell> {
        if self.q >= self.nq || self.np == 0 {
            return None;
        }
        let (p, q) = (self.p, self.q);
        self.p += 1;
        if self.p >= self.np {
            self.p = 0;
            self.q += 1;
        }
        Some(FaceCell {
            ijk: self.dims.face_cell(self.face, p, q),
            p,
            q,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.q >= self.nq {
            0
        } else {
            (self.nq - self.q) * self.np - self.p
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FaceCells {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims_2d() -> BlockDims {
        BlockDims::new(Dimension::Two, 4, 3, 7, 2).unwrap()
    }

    #[test]
    fn test_ranges_2d() {
        let d = dims_2d();
        assert_eq!(d.nnk, 1);
        assert_eq!((d.imin(), d.imax()), (2, 5));
        assert_eq!((d.jmin(), d.jmax()), (2, 4));
        assert_eq!((d.kmin(), d.kmax()), (0, 0));
        assert_eq!(d.array_shape(), [8, 7, 1]);
        assert_eq!(d.n_active(), 12);
    }

    #[test]
    fn test_ranges_3d() {
        let d = BlockDims::new(Dimension::Three, 2, 3, 4, 1).unwrap();
        assert_eq!((d.kmin(), d.kmax()), (1, 4));
        assert_eq!(d.array_shape(), [4, 5, 6]);
        assert_eq!(d.n_total(), 120);
    }

    #[test]
    fn test_rejects_empty_block() {
        assert!(BlockDims::new(Dimension::Two, 0, 3, 1, 2).is_err());
        assert!(BlockDims::new(Dimension::Two, 3, 3, 1, 0).is_err());
    }

    #[test]
    fn test_flat_index_unique() {
        let d = BlockDims::new(Dimension::Three, 2, 2, 2, 1).unwrap();
        let mut seen = vec![false; d.n_total()];
        for k in 0..4 {
            for j in 0..4 {
                for i in 0..4 {
                    let idx = d.flat_index([i, j, k]);
                    assert!(!seen[idx]);
                    seen[idx] = true;
                }
            }
        }
    }

    #[test]
    fn test_face_cells_fixed_normal_index() {
        let d = dims_2d();
        for &face in Face::faces_for(Dimension::Two) {
            let fixed = d.face_fixed_index(face);
            let cells: Vec<_> = d.face_cells(face).collect();
            assert_eq!(cells.len(), d.face_len(face));
            for c in &cells {
                assert_eq!(c.ijk[face.axis().index()], fixed);
                assert_eq!(d.face_local(face, c.ijk), (c.p, c.q));
            }
        }
    }

    #[test]
    fn test_face_cells_3d_count() {
        let d = BlockDims::new(Dimension::Three, 2, 3, 4, 2).unwrap();
        assert_eq!(d.face_cells(Face::Top).count(), 6);
        assert_eq!(d.face_cells(Face::East).count(), 12);
        assert_eq!(d.face_cells(Face::North).len(), 8);
    }

    #[test]
    fn test_ghost_and_interior() {
        let d = dims_2d();
        let c = d.face_cell(Face::East, 0, 0);
        assert_eq!(c, [5, 2, 0]);
        assert_eq!(d.ghost_cell(Face::East, c, 1), [6, 2, 0]);
        assert_eq!(d.ghost_cell(Face::East, c, 2), [7, 2, 0]);
        assert_eq!(d.interior_cell(Face::East, c, 3), Some([2, 2, 0]));
        assert_eq!(d.interior_cell(Face::East, c, 4), None);

        let w = d.face_cell(Face::West, 1, 0);
        assert_eq!(d.ghost_cell(Face::West, w, 2), [0, 3, 0]);
    }

    #[test]
    fn test_contains_active() {
        let d = dims_2d();
        assert!(d.contains_active([2, 2, 0]));
        assert!(!d.contains_active([1, 2, 0]));
        assert!(!d.contains_active([2, 2, 1]));
    }
}
