// crates/bf_mesh/src/geometry.rs

//! 结构块几何
//!
//! 每块存储计算区的节点坐标 `(nni+1)×(nnj+1)×(nnk+1)`（2D 只有一层节点，z = 0）。
//! 单元顶点按固定顺序给出：
//!
//! ```text
//!   2D:  3 ---- 2        3D: 底层 0..3 同 2D，顶层 4..7 依次在其上方
//!        |      |
//!        0 ---- 1
//! ```
//!
//! 点定位的几何判断依赖此顺序（逆时针、右手系）。

use crate::block::{BlockDims, CellIjk};
use crate::error::{MeshError, MeshResult};
use crate::topology::Topology;
use bf_foundation::{Dimension, Face};
use glam::DVec3;

/// 单元顶点缓冲，2D 只使用前 4 个
pub type CellVertices = [DVec3; 8];

/// 块几何访问接口
///
/// 点定位器只通过此接口读取顶点，便于替换为其他几何来源。
pub trait BlockGeometry: Send + Sync {
    /// 块数
    fn n_blocks(&self) -> usize;

    /// 块内单元的顶点数
    fn vertices_per_cell(&self, block: usize) -> usize;

    /// 写出计算单元的顶点坐标
    fn cell_vertices(&self, block: usize, ijk: CellIjk, out: &mut CellVertices) -> MeshResult<()>;
}

/// 单块节点坐标
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNodes {
    dims: BlockDims,
    nodes: Vec<DVec3>,
}

impl BlockNodes {
    fn node_shape(dims: &BlockDims) -> [usize; 3] {
        let nk = if dims.dimension.is_3d() {
            dims.nnk + 1
        } else {
            1
        };
        [dims.nni + 1, dims.nnj + 1, nk]
    }

    /// 节点总数
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 局部节点坐标 (a, b, c)，从 0 开始
    pub fn node(&self, a: usize, b: usize, c: usize) -> MeshResult<DVec3> {
        let [na, nb, nc] = Self::node_shape(&self.dims);
        if a >= na {
            return Err(MeshError::index_out_of_bounds("node a", a, na));
        }
        if b >= nb {
            return Err(MeshError::index_out_of_bounds("node b", b, nb));
        }
        if c >= nc {
            return Err(MeshError::index_out_of_bounds("node c", c, nc));
        }
        Ok(self.nodes[a + na * (b + nb * c)])
    }

    fn local_cell(&self, ijk: CellIjk) -> MeshResult<[usize; 3]> {
        let d = &self.dims;
        if !d.contains_active([ijk[0] as isize, ijk[1] as isize, ijk[2] as isize]) {
            return Err(MeshError::index_out_of_bounds(
                "active cell",
                d.flat_index(ijk),
                d.n_total(),
            ));
        }
        Ok([ijk[0] - d.imin(), ijk[1] - d.jmin(), ijk[2] - d.kmin()])
    }

    /// 计算单元顶点
    pub fn cell_vertices(&self, ijk: CellIjk, out: &mut CellVertices) -> MeshResult<()> {
        let [a, b, c] = self.local_cell(ijk)?;
        out[0] = self.node(a, b, c)?;
        out[1] = self.node(a + 1, b, c)?;
        out[2] = self.node(a + 1, b + 1, c)?;
        out[3] = self.node(a, b + 1, c)?;
        if self.dims.dimension.is_3d() {
            out[4] = self.node(a, b, c + 1)?;
            out[5] = self.node(a + 1, b, c + 1)?;
            out[6] = self.node(a + 1, b + 1, c + 1)?;
            out[7] = self.node(a, b + 1, c + 1)?;
        }
        Ok(())
    }
}

/// 多块结构网格几何
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    dimension: Dimension,
    blocks: Vec<BlockNodes>,
}

impl StructuredGrid {
    /// 由节点坐标函数生成
    ///
    /// `f(block, [a, b, c])` 返回局部节点 (a, b, c) 的坐标。
    pub fn from_fn<F>(topology: &Topology, f: F) -> Self
    where
        F: Fn(usize, [usize; 3]) -> DVec3,
    {
        let blocks = topology
            .blocks()
            .iter()
            .map(|bt| {
                let [na, nb, nc] = BlockNodes::node_shape(&bt.dims);
                let mut nodes = Vec::with_capacity(na * nb * nc);
                for c in 0..nc {
                    for b in 0..nb {
                        for a in 0..na {
                            nodes.push(f(bt.id, [a, b, c]));
                        }
                    }
                }
                BlockNodes {
                    dims: bt.dims,
                    nodes,
                }
            })
            .collect();
        Self {
            dimension: topology.dimension(),
            blocks,
        }
    }

    /// 每块一个笛卡尔盒 `(origin, size)`，均匀划分
    pub fn cartesian(topology: &Topology, boxes: &[(DVec3, DVec3)]) -> MeshResult<Self> {
        if boxes.len() != topology.n_blocks() {
            return Err(MeshError::unsupported_geometry(format!(
                "几何盒数 {} 与块数 {} 不符",
                boxes.len(),
                topology.n_blocks()
            )));
        }
        for (id, (_, size)) in boxes.iter().enumerate() {
            let planar = !topology.dimension().is_3d();
            if size.x <= 0.0 || size.y <= 0.0 || (!planar && size.z <= 0.0) {
                return Err(MeshError::unsupported_geometry(format!(
                    "块 {} 几何盒尺寸必须为正: {:?}",
                    id, size
                )));
            }
        }
        let spacing: Vec<DVec3> = topology
            .blocks()
            .iter()
            .zip(boxes)
            .map(|(bt, (_, size))| {
                let d = &bt.dims;
                DVec3::new(
                    size.x / d.nni as f64,
                    size.y / d.nnj as f64,
                    size.z / d.nnk as f64,
                )
            })
            .collect();
        let planar = !topology.dimension().is_3d();
        Ok(Self::from_fn(topology, |block, [a, b, c]| {
            let (origin, _) = boxes[block];
            let h = spacing[block];
            let z = if planar {
                0.0
            } else {
                origin.z + c as f64 * h.z
            };
            DVec3::new(origin.x + a as f64 * h.x, origin.y + b as f64 * h.y, z)
        }))
    }

    /// 维度
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// 块节点
    pub fn block(&self, id: usize) -> MeshResult<&BlockNodes> {
        self.blocks
            .get(id)
            .ok_or_else(|| MeshError::index_out_of_bounds("Block", id, self.blocks.len()))
    }

    /// 单元形心（顶点平均）
    pub fn cell_centroid(&self, block: usize, ijk: CellIjk) -> MeshResult<DVec3> {
        let mut v = [DVec3::ZERO; 8];
        let n = self.vertices_per_cell(block);
        self.block(block)?.cell_vertices(ijk, &mut v)?;
        Ok(v[..n].iter().copied().sum::<DVec3>() / n as f64)
    }

    /// 单元某个面的形心
    pub fn face_centroid(&self, block: usize, ijk: CellIjk, face: Face) -> MeshResult<DVec3> {
        let mut v = [DVec3::ZERO; 8];
        self.block(block)?.cell_vertices(ijk, &mut v)?;
        let ids: &[usize] = if self.dimension.is_3d() {
            match face {
                Face::North => &[2, 3, 6, 7],
                Face::East => &[1, 2, 5, 6],
                Face::South => &[0, 1, 4, 5],
                Face::West => &[0, 3, 4, 7],
                Face::Top => &[4, 5, 6, 7],
                Face::Bottom => &[0, 1, 2, 3],
            }
        } else {
            match face {
                Face::North => &[2, 3],
                Face::East => &[1, 2],
                Face::South => &[0, 1],
                Face::West => &[3, 0],
                Face::Top | Face::Bottom => {
                    return Err(MeshError::unsupported_geometry(format!(
                        "2D 单元没有 {} 面",
                        face
                    )))
                }
            }
        };
        Ok(ids.iter().map(|&i| v[i]).sum::<DVec3>() / ids.len() as f64)
    }
}

impl BlockGeometry for StructuredGrid {
    fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    fn vertices_per_cell(&self, _block: usize) -> usize {
        self.dimension.vertices_per_cell()
    }

    fn cell_vertices(&self, block: usize, ijk: CellIjk, out: &mut CellVertices) -> MeshResult<()> {
        self.block(block)?.cell_vertices(ijk, out)
    }
}

/// 2D 单元有向面积（逆时针为正）
pub fn signed_area(v: &CellVertices) -> f64 {
    let mut s = 0.0;
    for i in 0..4 {
        let a = v[i];
        let b = v[(i + 1) % 4];
        s += a.x * b.y - b.x * a.y;
    }
    0.5 * s
}

/// 3D 单元在顶点 0 处的有向体积（右手系为正）
pub fn corner_volume(v: &CellVertices) -> f64 {
    (v[1] - v[0]).dot((v[3] - v[0]).cross(v[4] - v[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_topology(dim: Dimension) -> Topology {
        let mut topo = Topology::new(dim, 2);
        topo.add_block("b0", 3, 2, 2).unwrap();
        topo
    }

    #[test]
    fn test_cartesian_2d_vertices() {
        let topo = unit_topology(Dimension::Two);
        let grid = StructuredGrid::cartesian(&topo, &[(DVec3::ZERO, DVec3::new(3.0, 2.0, 0.0))])
            .unwrap();
        assert_eq!(grid.block(0).unwrap().n_nodes(), 12);
        let mut v = [DVec3::ZERO; 8];
        grid.cell_vertices(0, [3, 3, 0], &mut v).unwrap();
        assert_eq!(v[0], DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(v[2], DVec3::new(2.0, 2.0, 0.0));
        assert!(signed_area(&v) > 0.0);
    }

    #[test]
    fn test_cartesian_3d_volume_positive() {
        let topo = unit_topology(Dimension::Three);
        let grid =
            StructuredGrid::cartesian(&topo, &[(DVec3::ZERO, DVec3::new(3.0, 2.0, 2.0))]).unwrap();
        let mut v = [DVec3::ZERO; 8];
        grid.cell_vertices(0, [2, 2, 2], &mut v).unwrap();
        assert!((corner_volume(&v) - 1.0).abs() < 1e-10);
        assert_eq!(v[6], DVec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ghost_cell_has_no_vertices() {
        let topo = unit_topology(Dimension::Two);
        let grid = StructuredGrid::cartesian(&topo, &[(DVec3::ZERO, DVec3::new(3.0, 2.0, 0.0))])
            .unwrap();
        let mut v = [DVec3::ZERO; 8];
        assert!(grid.cell_vertices(0, [1, 2, 0], &mut v).is_err());
    }

    #[test]
    fn test_centroids() {
        let topo = unit_topology(Dimension::Two);
        let grid = StructuredGrid::cartesian(&topo, &[(DVec3::ZERO, DVec3::new(3.0, 2.0, 0.0))])
            .unwrap();
        let c = grid.cell_centroid(0, [2, 2, 0]).unwrap();
        assert!((c - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
        let f = grid.face_centroid(0, [2, 2, 0], Face::West).unwrap();
        assert!((f - DVec3::new(0.0, 0.5, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_box_count_mismatch() {
        let topo = unit_topology(Dimension::Two);
        assert!(StructuredGrid::cartesian(&topo, &[]).is_err());
    }
}
