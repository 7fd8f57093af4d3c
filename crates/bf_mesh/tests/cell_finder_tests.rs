// crates/bf_mesh/tests/cell_finder_tests.rs

//! 点定位测试
//! 覆盖单块收敛、离开分类、跨块跳转、迭代上限与并行批量搜索

use bf_foundation::{Dimension, Face};
use bf_mesh::geometry::CellVertices;
use bf_mesh::{
    BlockGeometry, CellFinder, CellIjk, CellLocation, MeshError, MeshResult, Orientation,
    SearchStatus, StructuredGrid, Topology,
};
use glam::DVec3;

const NG: usize = 2;

fn single_block(ni: usize, nj: usize) -> (Topology, StructuredGrid) {
    let mut topo = Topology::new(Dimension::Two, NG);
    topo.add_block("b0", ni, nj, 1).unwrap();
    let grid = StructuredGrid::cartesian(
        &topo,
        &[(DVec3::ZERO, DVec3::new(ni as f64, nj as f64, 0.0))],
    )
    .unwrap();
    (topo, grid)
}

/// A: [0,4]x[0,2], B: [4,7]x[0,2]，A.east <-> B.west
fn two_blocks_east_west() -> (Topology, StructuredGrid) {
    let mut topo = Topology::new(Dimension::Two, NG);
    let a = topo.add_block("a", 4, 2, 1).unwrap();
    let b = topo.add_block("b", 3, 2, 1).unwrap();
    topo.connect(a, Face::East, b, Face::West, Orientation::IDENTITY)
        .unwrap();
    let grid = StructuredGrid::cartesian(
        &topo,
        &[
            (DVec3::ZERO, DVec3::new(4.0, 2.0, 0.0)),
            (DVec3::new(4.0, 0.0, 0.0), DVec3::new(3.0, 2.0, 0.0)),
        ],
    )
    .unwrap();
    (topo, grid)
}

/// 单位方格内任一点，从正确单元出发 1 次判断即收敛
#[test]
fn test_convergence_from_correct_guess() {
    let (topo, grid) = single_block(5, 4);
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();

    for a in 0..5 {
        for b in 0..4 {
            let ijk = [NG + a, NG + b, 0];
            let p = DVec3::new(a as f64 + 0.3, b as f64 + 0.7, 0.0);
            let res = finder
                .find_cell(&mut scratch, p, CellLocation::new(0, ijk))
                .unwrap();
            assert_eq!(res.status, SearchStatus::InsideGrid);
            assert_eq!(res.location.ijk, ijk);
            assert_eq!(res.step, [0, 0, 0]);
            assert!(res.iterations <= 1);
        }
    }
}

#[test]
fn test_converges_from_far_guess() {
    let (topo, grid) = single_block(10, 10);
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(8.5, 1.5, 0.0),
            CellLocation::new(0, [NG, NG + 9, 0]),
        )
        .unwrap();
    assert_eq!(res.located(), Some(CellLocation::new(0, [NG + 8, NG + 1, 0])));
}

/// 点在西边界外：终止于 West，i 截回 imin
#[test]
fn test_exit_west_clamps_to_imin() {
    let (topo, grid) = single_block(4, 4);
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(-0.5, 1.5, 0.0),
            CellLocation::new(0, [NG + 1, NG + 1, 0]),
        )
        .unwrap();
    assert_eq!(res.status, SearchStatus::Exit(Face::West));
    assert_eq!(res.location.ijk, [topo.dims(0).unwrap().imin(), NG + 1, 0]);
    assert!(res.located().is_none());
}

#[test]
fn test_exit_north_and_guess_in_ghost_layer() {
    let (topo, grid) = single_block(3, 3);
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(1.5, 5.0, 0.0),
            CellLocation::new(0, [NG + 1, NG, 0]),
        )
        .unwrap();
    assert_eq!(res.status, SearchStatus::Exit(Face::North));
    assert_eq!(res.location.ijk[1], topo.dims(0).unwrap().jmax());

    // 猜测落在虚拟层：先截回计算区再搜索
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(1.5, 1.5, 0.0),
            CellLocation::new(0, [0, NG + 1, 0]),
        )
        .unwrap();
    assert_eq!(res.located(), Some(CellLocation::new(0, [NG + 1, NG + 1, 0])));
}

/// A 东侧最后一个单元之外、B 第一个单元之内
#[test]
fn test_cross_block_hop_identity() {
    let (topo, grid) = two_blocks_east_west();
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(4.5, 0.5, 0.0),
            CellLocation::new(0, [NG, NG, 0]),
        )
        .unwrap();
    assert_eq!(res.status, SearchStatus::InsideGrid);
    assert_eq!(res.location, CellLocation::new(1, [NG, NG, 0]));
    assert_eq!(res.hops, 1);

    // 反向：从 B 找回 A
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(0.5, 1.5, 0.0),
            CellLocation::new(1, [NG + 2, NG, 0]),
        )
        .unwrap();
    assert_eq!(res.location, CellLocation::new(0, [NG, NG + 1, 0]));
}

/// B 旋转 180°，A.east <-> B.east，p 反向
#[test]
fn test_cross_block_hop_flipped() {
    let mut topo = Topology::new(Dimension::Two, NG);
    let a = topo.add_block("a", 4, 2, 1).unwrap();
    let b = topo.add_block("b", 3, 2, 1).unwrap();
    topo.connect(a, Face::East, b, Face::East, Orientation::from_code(1).unwrap())
        .unwrap();
    let grid = StructuredGrid::from_fn(&topo, |block, [i, j, _]| {
        if block == 0 {
            DVec3::new(i as f64, j as f64, 0.0)
        } else {
            DVec3::new(7.0 - i as f64, 2.0 - j as f64, 0.0)
        }
    });
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(4.5, 0.5, 0.0),
            CellLocation::new(a, [NG, NG, 0]),
        )
        .unwrap();
    assert_eq!(res.status, SearchStatus::InsideGrid);
    assert_eq!(res.location, CellLocation::new(b, [NG + 2, NG + 1, 0]));
}

#[test]
fn test_exit_after_hop() {
    let (topo, grid) = two_blocks_east_west();
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(9.0, 1.0, 0.0),
            CellLocation::new(0, [NG, NG, 0]),
        )
        .unwrap();
    assert_eq!(res.status, SearchStatus::Exit(Face::East));
    assert_eq!(res.location.block, 1);
}

fn two_blocks_3d() -> (Topology, StructuredGrid) {
    let mut topo = Topology::new(Dimension::Three, NG);
    let a = topo.add_block("a", 2, 2, 2).unwrap();
    let b = topo.add_block("b", 2, 2, 2).unwrap();
    topo.connect(a, Face::East, b, Face::West, Orientation::IDENTITY)
        .unwrap();
    let grid = StructuredGrid::cartesian(
        &topo,
        &[
            (DVec3::ZERO, DVec3::splat(2.0)),
            (DVec3::new(2.0, 0.0, 0.0), DVec3::splat(2.0)),
        ],
    )
    .unwrap();
    (topo, grid)
}

#[test]
fn test_hex_inside_and_exit_top() {
    let (topo, grid) = two_blocks_3d();
    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let guess = CellLocation::new(0, [NG, NG, NG]);

    let res = finder
        .find_cell(&mut scratch, DVec3::new(1.5, 1.5, 1.5), guess)
        .unwrap();
    assert_eq!(res.located(), Some(CellLocation::new(0, [NG + 1, NG + 1, NG + 1])));

    let res = finder
        .find_cell(&mut scratch, DVec3::new(0.5, 0.5, 3.0), guess)
        .unwrap();
    assert_eq!(res.status, SearchStatus::Exit(Face::Top));
    assert_eq!(res.location.ijk[2], topo.dims(0).unwrap().kmax());
}

/// 3D 跨块默认报不支持，显式启用后按方向变换跳转
#[test]
fn test_hex_cross_block_requires_opt_in() {
    let (topo, grid) = two_blocks_3d();
    let guess = CellLocation::new(0, [NG, NG, NG]);
    let point = DVec3::new(2.5, 0.5, 0.5);

    let finder = CellFinder::new(&topo, &grid, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let err = finder.find_cell(&mut scratch, point, guess).unwrap_err();
    assert!(matches!(err, MeshError::UnsupportedGeometry { .. }));

    let finder = CellFinder::new(&topo, &grid, 1)
        .unwrap()
        .with_cross_block_3d(true);
    let res = finder.find_cell(&mut scratch, point, guess).unwrap();
    assert_eq!(res.located(), Some(CellLocation::new(1, [NG, NG, NG])));
}

/// 非四边形单元的几何
struct TriangleGeometry;

impl BlockGeometry for TriangleGeometry {
    fn n_blocks(&self) -> usize {
        1
    }

    fn vertices_per_cell(&self, _block: usize) -> usize {
        3
    }

    fn cell_vertices(&self, _block: usize, _ijk: CellIjk, _out: &mut CellVertices) -> MeshResult<()> {
        Ok(())
    }
}

#[test]
fn test_rejects_non_quad_cells() {
    let (topo, _) = single_block(2, 2);
    let err = CellFinder::new(&topo, &TriangleGeometry, 1).err();
    assert!(matches!(err, Some(MeshError::UnsupportedGeometry { .. })));
}

#[test]
fn test_rejects_reversed_winding() {
    let (topo, _) = single_block(2, 2);
    let mirrored = StructuredGrid::from_fn(&topo, |_, [i, j, _]| {
        DVec3::new(-(i as f64), j as f64, 0.0)
    });
    let err = CellFinder::new(&topo, &mirrored, 1).err();
    assert!(matches!(err, Some(MeshError::UnsupportedGeometry { .. })));
}

/// 偶数 i 的单元在点左侧，奇数 i 的单元在点右侧，搜索来回振荡
struct OscillatingGeometry;

impl BlockGeometry for OscillatingGeometry {
    fn n_blocks(&self) -> usize {
        1
    }

    fn vertices_per_cell(&self, _block: usize) -> usize {
        4
    }

    fn cell_vertices(&self, _block: usize, ijk: CellIjk, out: &mut CellVertices) -> MeshResult<()> {
        let x0 = if ijk[0] % 2 == 0 { 0.0 } else { 3.0 };
        out[0] = DVec3::new(x0, 0.0, 0.0);
        out[1] = DVec3::new(x0 + 1.0, 0.0, 0.0);
        out[2] = DVec3::new(x0 + 1.0, 1.0, 0.0);
        out[3] = DVec3::new(x0, 1.0, 0.0);
        Ok(())
    }
}

#[test]
fn test_iteration_bound_yields_error_state() {
    let (topo, _) = single_block(6, 1);
    let finder = CellFinder::new(&topo, &OscillatingGeometry, 1).unwrap();
    let mut scratch = finder.new_scratch();
    let res = finder
        .find_cell(
            &mut scratch,
            DVec3::new(2.0, 0.5, 0.0),
            CellLocation::new(0, [NG + 2, NG, 0]),
        )
        .unwrap();
    assert_eq!(res.status, SearchStatus::Error);
    let d = topo.dims(0).unwrap();
    assert_eq!(res.iterations, d.imax() + d.jmax() + d.kmax() + 1);
    assert!(matches!(
        res.into_result(),
        Err(MeshError::SearchBounded { block: 0, .. })
    ));
}

/// 并行批量结果与串行一致
#[test]
fn test_locate_batch_matches_serial() {
    let (topo, grid) = two_blocks_east_west();
    let finder = CellFinder::new(&topo, &grid, 4).unwrap();
    assert_eq!(finder.pool().len(), 4);

    let queries: Vec<(DVec3, CellLocation)> = (0..200)
        .map(|n| {
            let x = 0.05 + (n % 70) as f64 * 0.1;
            let y = 0.05 + (n / 70) as f64 * 0.5;
            (DVec3::new(x, y, 0.0), CellLocation::new(0, [NG, NG, 0]))
        })
        .collect();

    let parallel = finder.locate_batch(&queries);
    let mut scratch = finder.new_scratch();
    for ((p, g), res) in queries.iter().zip(parallel) {
        let res = res.unwrap();
        let serial = finder.find_cell(&mut scratch, *p, *g).unwrap();
        assert_eq!(res.status, SearchStatus::InsideGrid);
        assert_eq!(res.location, serial.location);
    }
}
