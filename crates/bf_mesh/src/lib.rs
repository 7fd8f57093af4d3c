// crates/bf_mesh/src/lib.rs

//! BlockFlow 多块网格模块
//!
//! 提供多块结构网格的拓扑、几何、点定位与进程划分。
//!
//! # 核心类型
//!
//! - [`Topology`]: 块集合与面连接
//! - [`StructuredGrid`]: 各块节点坐标
//! - [`CellFinder`]: 跨块点定位
//! - [`RankAssignment`]: 块到 rank 的划分
//!
//! # 模块结构
//!
//! - [`block`]: 索引范围与面单元遍历
//! - [`orientation`]: 面连接方向代码
//! - [`topology`]: 拓扑模型与连接性检查
//! - [`geometry`]: 结构网格几何
//! - [`cell_finder`]: 点定位状态机
//! - [`partition`]: rank 划分与负载均衡
//!
//! # 示例
//!
//! ```rust
//! use bf_foundation::{Dimension, Face};
//! use bf_mesh::{assign, Orientation, Topology};
//!
//! let mut topo = Topology::new(Dimension::Two, 2);
//! let a = topo.add_block("inlet", 8, 4, 1).unwrap();
//! let b = topo.add_block("outlet", 8, 4, 1).unwrap();
//! topo.connect(a, Face::East, b, Face::West, Orientation::IDENTITY).unwrap();
//!
//! let ranks = assign(&topo, 2, None).unwrap();
//! assert_eq!(ranks.blocks_for(1), &[1]);
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod cell_finder;
pub mod error;
pub mod geometry;
pub mod orientation;
pub mod partition;
pub mod topology;

// 重新导出核心类型
pub use block::{BlockDims, CellIjk, FaceCell, FaceCells};
pub use cell_finder::{
    CellFinder, CellLocation, CellSearch, FinderScratch, ScratchPool, SearchStatus,
};
pub use error::{MeshError, MeshResult};
pub use geometry::{BlockGeometry, BlockNodes, StructuredGrid};
pub use orientation::Orientation;
pub use partition::{assign, balance, ExplicitRankMap, RankAssignment, RankEntry};
pub use topology::{
    BlockTopology, ConnectivityReport, FaceHop, FaceLink, Neighbor, Topology, TopologyViolation,
};
