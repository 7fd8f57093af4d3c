// crates/bf_mesh/src/topology.rs

//! 多块拓扑模型
//!
//! 描述块集合及每个块六个面槽位的连接关系。面要么是计算域边界，
//! 要么通过 `{邻块, 邻面, 方向}` 连接到另一块的某个面。
//!
//! # 设计原则
//!
//! 1. **双向一致**: A 的面 X 连到 B 的面 Y 时，B 的面 Y 必须以反向方向连回 A 的面 X
//! 2. **静态变换**: 面内索引映射只由方向代码决定，调用时不读取几何
//! 3. **验证不中止**: [`Topology::validate`] 返回全部违规项，由调用者决定是否中止
//!
//! # 示例
//!
//! ```
//! use bf_foundation::{Dimension, Face};
//! use bf_mesh::orientation::Orientation;
//! use bf_mesh::topology::Topology;
//!
//! let mut topo = Topology::new(Dimension::Two, 2);
//! let a = topo.add_block("left", 4, 4, 1).unwrap();
//! let b = topo.add_block("right", 4, 4, 1).unwrap();
//! topo.connect(a, Face::East, b, Face::West, Orientation::IDENTITY).unwrap();
//!
//! assert!(topo.validate().is_valid());
//! let hop = topo.transform_index(a, Face::East, 2, 0).unwrap();
//! assert_eq!((hop.block, hop.face, hop.p, hop.q), (b, Face::West, 2, 0));
//! ```

use crate::block::{BlockDims, CellIjk};
use crate::error::{MeshError, MeshResult};
use crate::orientation::Orientation;
use bf_foundation::{Dimension, Face};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================
// 面连接
// ============================================================

/// 相邻面的连接目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    /// 邻块编号
    pub block: usize,
    /// 邻块上的面
    pub face: Face,
    /// 本面到邻面的面内方向
    pub orientation: Orientation,
}

/// 面槽位的连接状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceLink {
    /// 计算域边界，承载物理边界条件
    #[default]
    Boundary,
    /// 与另一块相邻
    Adjacent(Neighbor),
}

impl FaceLink {
    /// 是否为相邻面
    #[inline]
    pub fn is_adjacent(&self) -> bool {
        matches!(self, Self::Adjacent(_))
    }

    /// 邻块信息
    #[inline]
    pub fn neighbor(&self) -> Option<Neighbor> {
        match self {
            Self::Adjacent(n) => Some(*n),
            Self::Boundary => None,
        }
    }
}

/// 单个块的拓扑描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTopology {
    /// 块编号
    pub id: usize,
    /// 块标签
    pub label: String,
    /// 索引范围
    pub dims: BlockDims,
    links: [FaceLink; 6],
}

impl BlockTopology {
    /// 面连接
    #[inline]
    pub fn link(&self, face: Face) -> &FaceLink {
        &self.links[face.index()]
    }

    /// 面的邻块
    #[inline]
    pub fn neighbor(&self, face: Face) -> Option<Neighbor> {
        self.links[face.index()].neighbor()
    }

    /// 全部六个槽位
    pub fn links(&self) -> &[FaceLink; 6] {
        &self.links
    }
}

/// 一次跨面索引变换的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceHop {
    /// 目标块
    pub block: usize,
    /// 目标面
    pub face: Face,
    /// 目标面局部 p 坐标
    pub p: usize,
    /// 目标面局部 q 坐标
    pub q: usize,
}

// ============================================================
// 验证报告
// ============================================================

/// 连接性违规项
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyViolation {
    /// 指向不存在的块
    #[error("块 {block} 面 {face}: 邻块 {target} 不存在")]
    BlockOutOfRange {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 目标块
        target: usize,
    },

    /// 面在当前维度下不存在
    #[error("块 {block} 面 {face}: 连接到当前维度不存在的面 {target_face}")]
    FaceNotInDimension {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 目标面
        target_face: Face,
    },

    /// 面连接到自身
    #[error("块 {block} 面 {face}: 连接到自身")]
    SelfLink {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
    },

    /// 对方面是边界，没有回连
    #[error("块 {block} 面 {face}: 块 {target} 面 {target_face} 未回连")]
    MissingPartner {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 目标块
        target: usize,
        /// 目标面
        target_face: Face,
    },

    /// 对方面连到了别处
    #[error("块 {block} 面 {face}: 块 {target} 面 {target_face} 回连到块 {actual_block} 面 {actual_face}")]
    PartnerMismatch {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 目标块
        target: usize,
        /// 目标面
        target_face: Face,
        /// 实际回连块
        actual_block: usize,
        /// 实际回连面
        actual_face: Face,
    },

    /// 回连方向不是反向方向
    #[error("块 {block} 面 {face}: 回连方向 {actual} 不是 {expected}")]
    OrientationMismatch {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 期望的方向代码
        expected: u8,
        /// 实际的方向代码
        actual: u8,
    },

    /// 两面尺寸在方向变换下不匹配
    #[error("块 {block} 面 {face}: 尺寸 {source_extents:?} 经方向变换后与块 {target} 面 {target_face} 的 {target_extents:?} 不符")]
    ExtentMismatch {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 目标块
        target: usize,
        /// 目标面
        target_face: Face,
        /// 本面尺寸
        source_extents: (usize, usize),
        /// 目标面尺寸
        target_extents: (usize, usize),
    },

    /// 边界条件与连接状态不符
    #[error("块 {block} 面 {face}: {details}")]
    BoundaryMismatch {
        /// 所在块
        block: usize,
        /// 所在面
        face: Face,
        /// 详细信息
        details: String,
    },
}

/// 连接性验证报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityReport {
    /// 违规项列表
    pub violations: Vec<TopologyViolation>,
    /// 检查过的面数
    pub faces_checked: usize,
}

impl ConnectivityReport {
    /// 是否无违规
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// 添加违规项
    pub fn add(&mut self, violation: TopologyViolation) {
        self.violations.push(violation);
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: ConnectivityReport) {
        self.violations.extend(other.violations);
        self.faces_checked += other.faces_checked;
    }

    /// 有违规时转为 `InvalidTopology` 错误
    pub fn into_result(self) -> MeshResult<()> {
        if self.is_valid() {
            return Ok(());
        }
        let details = self
            .violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(MeshError::invalid_topology("validate", details))
    }
}

// ============================================================
// 拓扑模型
// ============================================================

/// 多块拓扑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    dimension: Dimension,
    nghost: usize,
    blocks: Vec<BlockTopology>,
}

impl Topology {
    /// 创建空拓扑
    pub fn new(dimension: Dimension, nghost: usize) -> Self {
        Self {
            dimension,
            nghost,
            blocks: Vec::new(),
        }
    }

    /// 维度
    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// 虚拟单元层数
    #[inline]
    pub fn nghost(&self) -> usize {
        self.nghost
    }

    /// 块数
    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// 全部块
    #[inline]
    pub fn blocks(&self) -> &[BlockTopology] {
        &self.blocks
    }

    /// 当前维度下有效的面
    #[inline]
    pub fn faces(&self) -> &'static [Face] {
        Face::faces_for(self.dimension)
    }

    /// 添加一个全部面为边界的块，返回块编号
    pub fn add_block(
        &mut self,
        label: impl Into<String>,
        nni: usize,
        nnj: usize,
        nnk: usize,
    ) -> MeshResult<usize> {
        let dims = BlockDims::new(self.dimension, nni, nnj, nnk, self.nghost)?;
        let id = self.blocks.len();
        self.blocks.push(BlockTopology {
            id,
            label: label.into(),
            dims,
            links: [FaceLink::Boundary; 6],
        });
        Ok(id)
    }

    /// 获取块
    pub fn block(&self, id: usize) -> MeshResult<&BlockTopology> {
        self.blocks
            .get(id)
            .ok_or_else(|| MeshError::index_out_of_bounds("Block", id, self.blocks.len()))
    }

    /// 获取块的索引范围
    pub fn dims(&self, id: usize) -> MeshResult<&BlockDims> {
        Ok(&self.block(id)?.dims)
    }

    /// 面连接
    pub fn link(&self, block: usize, face: Face) -> MeshResult<&FaceLink> {
        Ok(self.block(block)?.link(face))
    }

    /// 单侧设置面连接，不检查对方面
    ///
    /// 供从配置逐面装配时使用，装配完成后应调用 [`Topology::validate`]。
    pub fn set_link(&mut self, block: usize, face: Face, link: FaceLink) -> MeshResult<()> {
        let n = self.blocks.len();
        let bt = self
            .blocks
            .get_mut(block)
            .ok_or_else(|| MeshError::index_out_of_bounds("Block", block, n))?;
        bt.links[face.index()] = link;
        Ok(())
    }

    /// 注册双向相邻关系
    ///
    /// 以下情况返回 `InvalidTopology`：
    /// - 块不存在或面在当前维度下不存在
    /// - 面连接到自身
    /// - 任一面已有不同的连接
    /// - 方向变换后尺寸不匹配，或 A→B→A 不是恒等映射
    ///
    /// 重复注册完全相同的连接是允许的。
    pub fn connect(
        &mut self,
        block_a: usize,
        face_a: Face,
        block_b: usize,
        face_b: Face,
        orientation: Orientation,
    ) -> MeshResult<()> {
        const OP: &str = "connect";
        let n = self.blocks.len();
        for id in [block_a, block_b] {
            if id >= n {
                return Err(MeshError::invalid_topology(
                    OP,
                    format!("块 {} 不存在 (共 {} 块)", id, n),
                ));
            }
        }
        for face in [face_a, face_b] {
            if !face.exists_in(self.dimension) {
                return Err(MeshError::invalid_topology(
                    OP,
                    format!("面 {} 在 {} 中不存在", face, self.dimension),
                ));
            }
        }
        if block_a == block_b && face_a == face_b {
            return Err(MeshError::invalid_topology(
                OP,
                format!("块 {} 面 {} 不能连接到自身", block_a, face_a),
            ));
        }

        let forward = FaceLink::Adjacent(Neighbor {
            block: block_b,
            face: face_b,
            orientation,
        });
        let backward = FaceLink::Adjacent(Neighbor {
            block: block_a,
            face: face_a,
            orientation: orientation.inverse(),
        });
        for (id, face, wanted) in [(block_a, face_a, &forward), (block_b, face_b, &backward)] {
            let existing = self.blocks[id].link(face);
            if existing.is_adjacent() && existing != wanted {
                return Err(MeshError::invalid_topology(
                    OP,
                    format!("块 {} 面 {} 已有不同的连接 {:?}", id, face, existing),
                ));
            }
        }

        let ext_a = self.blocks[block_a].dims.face_extents(face_a);
        let ext_b = self.blocks[block_b].dims.face_extents(face_b);
        if orientation.target_extents(ext_a) != ext_b {
            return Err(MeshError::invalid_topology(
                OP,
                format!(
                    "块 {} 面 {} 尺寸 {:?} 经方向 {} 变换后与块 {} 面 {} 尺寸 {:?} 不符",
                    block_a, face_a, ext_a, orientation, block_b, face_b, ext_b
                ),
            ));
        }
        let inverse = orientation.inverse();
        for q in 0..ext_a.1 {
            for p in 0..ext_a.0 {
                let (pb, qb) = orientation.apply(p, q, ext_b);
                if inverse.apply(pb, qb, ext_a) != (p, q) {
                    return Err(MeshError::invalid_topology(
                        OP,
                        format!("方向 {} 往返映射 ({}, {}) 不是恒等", orientation, p, q),
                    ));
                }
            }
        }

        self.blocks[block_a].links[face_a.index()] = forward;
        self.blocks[block_b].links[face_b.index()] = backward;
        tracing::debug!(
            "connect: block {} {} <-> block {} {} (orientation {})",
            block_a,
            face_a,
            block_b,
            face_b,
            orientation
        );
        Ok(())
    }

    /// 检查全部块全部面的连接一致性
    pub fn validate(&self) -> ConnectivityReport {
        let mut report = ConnectivityReport::default();
        let n = self.blocks.len();

        for bt in &self.blocks {
            for face in Face::ALL {
                let Some(nb) = bt.neighbor(face) else {
                    continue;
                };
                report.faces_checked += 1;
                if !face.exists_in(self.dimension) || !nb.face.exists_in(self.dimension) {
                    report.add(TopologyViolation::FaceNotInDimension {
                        block: bt.id,
                        face,
                        target_face: nb.face,
                    });
                    continue;
                }
                if nb.block >= n {
                    report.add(TopologyViolation::BlockOutOfRange {
                        block: bt.id,
                        face,
                        target: nb.block,
                    });
                    continue;
                }
                if nb.block == bt.id && nb.face == face {
                    report.add(TopologyViolation::SelfLink { block: bt.id, face });
                    continue;
                }

                let partner = &self.blocks[nb.block];
                let ext_src = bt.dims.face_extents(face);
                let ext_dst = partner.dims.face_extents(nb.face);
                if nb.orientation.target_extents(ext_src) != ext_dst {
                    report.add(TopologyViolation::ExtentMismatch {
                        block: bt.id,
                        face,
                        target: nb.block,
                        target_face: nb.face,
                        source_extents: ext_src,
                        target_extents: ext_dst,
                    });
                }

                match partner.neighbor(nb.face) {
                    None => report.add(TopologyViolation::MissingPartner {
                        block: bt.id,
                        face,
                        target: nb.block,
                        target_face: nb.face,
                    }),
                    Some(back) if back.block != bt.id || back.face != face => {
                        report.add(TopologyViolation::PartnerMismatch {
                            block: bt.id,
                            face,
                            target: nb.block,
                            target_face: nb.face,
                            actual_block: back.block,
                            actual_face: back.face,
                        })
                    }
                    Some(back) if back.orientation != nb.orientation.inverse() => {
                        report.add(TopologyViolation::OrientationMismatch {
                            block: bt.id,
                            face,
                            expected: nb.orientation.inverse().code(),
                            actual: back.orientation.code(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        if report.is_valid() {
            tracing::info!(
                "拓扑检查通过: {} 块, {} 个相邻面",
                n,
                report.faces_checked
            );
        } else {
            for v in &report.violations {
                tracing::warn!("拓扑违规: {}", v);
            }
        }
        report
    }

    /// 面内索引变换：本块面 `(p, q)` → 邻块对应面的 `(p', q')`
    pub fn transform_index(&self, block: usize, face: Face, p: usize, q: usize) -> MeshResult<FaceHop> {
        let bt = self.block(block)?;
        let nb = bt.neighbor(face).ok_or_else(|| {
            MeshError::invalid_topology(
                "transform_index",
                format!("块 {} 面 {} 不是相邻面", block, face),
            )
        })?;
        let (np, nq) = bt.dims.face_extents(face);
        if p >= np {
            return Err(MeshError::index_out_of_bounds("face p", p, np));
        }
        if q >= nq {
            return Err(MeshError::index_out_of_bounds("face q", q, nq));
        }
        let partner = self.block(nb.block)?;
        let (pb, qb) = nb
            .orientation
            .apply(p, q, partner.dims.face_extents(nb.face));
        Ok(FaceHop {
            block: nb.block,
            face: nb.face,
            p: pb,
            q: qb,
        })
    }

    /// 本块边界单元穿过相邻面后落入的邻块边界单元
    pub fn partner_cell(&self, block: usize, face: Face, ijk: CellIjk) -> MeshResult<(usize, CellIjk)> {
        let (p, q) = self.dims(block)?.face_local(face, ijk);
        let hop = self.transform_index(block, face, p, q)?;
        let cell = self.dims(hop.block)?.face_cell(hop.face, hop.p, hop.q);
        Ok((hop.block, cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blocks() -> Topology {
        let mut topo = Topology::new(Dimension::Two, 2);
        topo.add_block("a", 4, 3, 1).unwrap();
        topo.add_block("b", 5, 3, 1).unwrap();
        topo
    }

    #[test]
    fn test_new_blocks_are_boundary() {
        let topo = two_blocks();
        for bt in topo.blocks() {
            assert!(bt.links().iter().all(|l| !l.is_adjacent()));
        }
        assert!(topo.validate().is_valid());
    }

    #[test]
    fn test_connect_sets_both_sides() {
        let mut topo = two_blocks();
        topo.connect(0, Face::East, 1, Face::West, Orientation::IDENTITY)
            .unwrap();
        let back = topo.block(1).unwrap().neighbor(Face::West).unwrap();
        assert_eq!(back.block, 0);
        assert_eq!(back.face, Face::East);
        assert!(topo.validate().is_valid());
    }

    #[test]
    fn test_connect_idempotent() {
        let mut topo = two_blocks();
        let o = Orientation::IDENTITY;
        topo.connect(0, Face::East, 1, Face::West, o).unwrap();
        assert!(topo.connect(0, Face::East, 1, Face::West, o).is_ok());
    }

    #[test]
    fn test_connect_conflict() {
        let mut topo = two_blocks();
        topo.connect(0, Face::East, 1, Face::West, Orientation::IDENTITY)
            .unwrap();
        let err = topo
            .connect(0, Face::East, 1, Face::East, Orientation::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidTopology { .. }));
    }

    #[test]
    fn test_connect_extent_mismatch() {
        let mut topo = two_blocks();
        // a 的北面有 4 个单元, b 的南面有 5 个
        let err = topo
            .connect(0, Face::North, 1, Face::South, Orientation::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidTopology { .. }));
    }

    #[test]
    fn test_connect_rejects_top_in_2d() {
        let mut topo = two_blocks();
        assert!(topo
            .connect(0, Face::Top, 1, Face::Bottom, Orientation::IDENTITY)
            .is_err());
    }

    #[test]
    fn test_validate_reports_one_sided_link() {
        let mut topo = two_blocks();
        topo.set_link(
            0,
            Face::East,
            FaceLink::Adjacent(Neighbor {
                block: 1,
                face: Face::West,
                orientation: Orientation::IDENTITY,
            }),
        )
        .unwrap();
        let report = topo.validate();
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            report.violations[0],
            TopologyViolation::MissingPartner { .. }
        ));
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_transform_index_flip() {
        let mut topo = two_blocks();
        let flip = Orientation::from_code(1).unwrap();
        topo.connect(0, Face::East, 1, Face::East, flip).unwrap();
        let hop = topo.transform_index(0, Face::East, 0, 0).unwrap();
        assert_eq!((hop.p, hop.q), (2, 0));
        let back = topo.transform_index(1, Face::East, hop.p, hop.q).unwrap();
        assert_eq!((back.block, back.p, back.q), (0, 0, 0));
    }

    #[test]
    fn test_transform_index_boundary_face() {
        let topo = two_blocks();
        assert!(topo.transform_index(0, Face::North, 0, 0).is_err());
    }

    #[test]
    fn test_partner_cell() {
        let mut topo = two_blocks();
        topo.connect(0, Face::East, 1, Face::West, Orientation::IDENTITY)
            .unwrap();
        let (b, cell) = topo.partner_cell(0, Face::East, [5, 3, 0]).unwrap();
        assert_eq!(b, 1);
        assert_eq!(cell, [2, 3, 0]);
    }
}
