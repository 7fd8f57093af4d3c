// crates/bf_physics/src/domain.rs

//! 计算域
//!
//! 持有拓扑、每块六个面的边界条件与流场，提供：
//! - `check_connectivity`: 拓扑一致性 + 边界条件与连接状态一致性
//! - `apply_convective` / `apply_viscous`: 对本 rank 拥有的块逐面分派
//! - `apply_menter_correction`: 近壁 omega 修正
//! - `partition` / `cell_finder`: 划分与点定位入口

use bf_foundation::Face;
use bf_mesh::{
    assign, CellFinder, ConnectivityReport, ExplicitRankMap, FaceLink, RankAssignment,
    StructuredGrid, Topology, TopologyViolation,
};

use crate::boundary::BoundaryCondition;
use crate::context::SimContext;
use crate::error::{PhysicsError, PhysicsResult};
use crate::state::BlockFlow;
use crate::turbulence;

/// 计算域中的一个块
#[derive(Debug, Clone)]
pub struct Block {
    /// 块编号
    pub id: usize,
    /// 标签
    pub label: String,
    /// 按面编号排列的边界条件，2D 的 TOP/BOTTOM 为未使用的滑移壁
    pub bcs: [BoundaryCondition; 6],
    /// 流场
    pub flow: BlockFlow,
}

impl Block {
    /// 指定面的边界条件
    #[inline]
    pub fn bc(&self, face: Face) -> &BoundaryCondition {
        &self.bcs[face.index()]
    }
}

/// 计算域
#[derive(Debug, Clone)]
pub struct Domain {
    ctx: SimContext,
    topology: Topology,
    blocks: Vec<Block>,
    grid: Option<StructuredGrid>,
    rank_map: Option<ExplicitRankMap>,
}

impl Domain {
    /// 由各部分组装，块数必须与拓扑一致
    pub fn new(
        ctx: SimContext,
        topology: Topology,
        blocks: Vec<Block>,
        grid: Option<StructuredGrid>,
        rank_map: Option<ExplicitRankMap>,
    ) -> PhysicsResult<Self> {
        if blocks.len() != topology.n_blocks() {
            return Err(PhysicsError::invalid_state(format!(
                "块数 {} 与拓扑块数 {} 不符",
                blocks.len(),
                topology.n_blocks()
            )));
        }
        Ok(Self {
            ctx,
            topology,
            blocks,
            grid,
            rank_map,
        })
    }

    /// 模拟上下文
    #[inline]
    pub fn ctx(&self) -> &SimContext {
        &self.ctx
    }

    /// 拓扑
    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// 几何
    #[inline]
    pub fn grid(&self) -> Option<&StructuredGrid> {
        self.grid.as_ref()
    }

    /// 全部块
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// 块数
    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// 获取块
    pub fn block(&self, id: usize) -> PhysicsResult<&Block> {
        let n = self.blocks.len();
        self.blocks
            .get(id)
            .ok_or_else(|| bf_mesh::MeshError::index_out_of_bounds("Block", id, n).into())
    }

    /// 获取块（可变）
    pub fn block_mut(&mut self, id: usize) -> PhysicsResult<&mut Block> {
        let n = self.blocks.len();
        self.blocks
            .get_mut(id)
            .ok_or_else(|| bf_mesh::MeshError::index_out_of_bounds("Block", id, n).into())
    }

    /// 全部块编号
    pub fn all_blocks(&self) -> Vec<usize> {
        (0..self.blocks.len()).collect()
    }

    /// 显式 rank 映射表
    #[inline]
    pub fn rank_map(&self) -> Option<&ExplicitRankMap> {
        self.rank_map.as_ref()
    }

    // ------------------------------------------------------------------
    // 验证
    // ------------------------------------------------------------------

    /// 检查拓扑连接与边界条件的一致性
    ///
    /// 返回全部违规项，由调用者决定终止还是告警继续。
    pub fn check_connectivity(&self) -> ConnectivityReport {
        let mut report = self.topology.validate();
        for block in &self.blocks {
            for &face in self.topology.faces() {
                let link = self
                    .topology
                    .link(block.id, face)
                    .map(|l| *l)
                    .unwrap_or(FaceLink::Boundary);
                let bc = block.bc(face);
                let details = match (&link, bc) {
                    (FaceLink::Adjacent(_), BoundaryCondition::Adjacent) => None,
                    (FaceLink::Adjacent(n), other) => Some(format!(
                        "连接到块 {} 面 {}，但边界条件为 {}",
                        n.block,
                        n.face,
                        other.kind()
                    )),
                    (FaceLink::Boundary, BoundaryCondition::Adjacent) => {
                        Some("边界条件为 adjacent，但没有相邻块".to_string())
                    }
                    (FaceLink::Boundary, _) => None,
                };
                if let Some(details) = details {
                    report.add(TopologyViolation::BoundaryMismatch {
                        block: block.id,
                        face,
                        details,
                    });
                }
            }
        }

        if report.is_valid() {
            tracing::info!(
                "check_connectivity: {} blocks, {} faces OK",
                self.blocks.len(),
                report.faces_checked
            );
        } else {
            for v in &report.violations {
                tracing::warn!("check_connectivity: {}", v);
            }
        }
        report
    }

    // ------------------------------------------------------------------
    // 边界条件分派
    // ------------------------------------------------------------------

    /// 对 `owned` 中每块每个面施加对流边界条件
    pub fn apply_convective(&mut self, owned: &[usize], time: f64) -> PhysicsResult<()> {
        let ctx = self.ctx;
        for &id in owned {
            let block = self.block_mut(id)?;
            for &face in Face::faces_for(ctx.dimension) {
                block.bcs[face.index()].apply_convective(&ctx, &mut block.flow, face, time)?;
            }
        }
        Ok(())
    }

    /// 对 `owned` 中每块每个面施加粘性边界条件
    pub fn apply_viscous(&mut self, owned: &[usize], time: f64) -> PhysicsResult<()> {
        let ctx = self.ctx;
        if !ctx.viscous {
            return Ok(());
        }
        for &id in owned {
            let block = self.block_mut(id)?;
            for &face in Face::faces_for(ctx.dimension) {
                block.bcs[face.index()].apply_viscous(&ctx, &mut block.flow, face, time)?;
            }
        }
        Ok(())
    }

    /// 对 `owned` 中每块施加近壁 omega 修正，返回被截断的单元总数
    pub fn apply_menter_correction(&mut self, owned: &[usize]) -> PhysicsResult<usize> {
        let ctx = self.ctx;
        let mut total = 0;
        for &id in owned {
            let block = self.block_mut(id)?;
            total += turbulence::apply_menter_correction(&ctx, &mut block.flow, &block.bcs);
        }
        Ok(total)
    }

    /// 替换某个面的边界条件（配置重读时使用）
    pub fn set_boundary(&mut self, block: usize, face: Face, bc: BoundaryCondition) -> PhysicsResult<()> {
        self.block_mut(block)?.bcs[face.index()] = bc;
        Ok(())
    }

    /// 由几何重新计算各块到无滑移壁面的距离
    pub fn compute_wall_distances(&mut self) -> PhysicsResult<()> {
        let Some(grid) = self.grid.as_ref() else {
            return Ok(());
        };
        let faces = Face::faces_for(self.ctx.dimension);
        for block in &mut self.blocks {
            let walls: Vec<Face> = faces
                .iter()
                .copied()
                .filter(|f| block.bcs[f.index()].is_no_slip_wall())
                .collect();
            block.flow.compute_wall_info(grid, block.id, &walls)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 划分与点定位
    // ------------------------------------------------------------------

    /// 将块分配给 `n_workers` 个执行进程，使用配置中的显式映射（如有）
    pub fn partition(&self, n_workers: usize) -> PhysicsResult<RankAssignment> {
        Ok(assign(&self.topology, n_workers, self.rank_map.as_ref())?)
    }

    /// 创建点定位器，需要几何
    pub fn cell_finder(&self, n_workers: usize) -> PhysicsResult<CellFinder<'_, StructuredGrid>> {
        let grid = self
            .grid
            .as_ref()
            .ok_or_else(|| PhysicsError::invalid_state("计算域没有几何，无法点定位"))?;
        Ok(CellFinder::new(&self.topology, grid, n_workers)?)
    }
}
