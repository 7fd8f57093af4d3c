// apps/bf_cli/src/commands/locate.rs

//! 点定位命令
//!
//! 由配置中的块包围盒生成笛卡尔网格，从给定初始猜测出发定位一个点。
//! 单元下标按计算单元从 0 计，不含虚拟层。

use anyhow::{Context, Result};
use bf_foundation::BfError;
use bf_mesh::{CellLocation, SearchStatus};
use clap::Args;
use glam::DVec3;
use std::path::PathBuf;
use tracing::info;

use super::{load_domain, parse_list};

/// 点定位参数
#[derive(Args)]
pub struct LocateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 目标点坐标 x,y[,z]
    #[arg(short, long)]
    pub point: String,

    /// 初始猜测所在块
    #[arg(short, long, default_value = "0")]
    pub block: usize,

    /// 初始猜测单元 i,j[,k]
    #[arg(long)]
    pub cell: Option<String>,
}

/// 执行点定位命令
pub fn execute(args: LocateArgs) -> Result<()> {
    info!("=== BlockFlow 点定位 ===");
    let (config, domain) = load_domain(&args.config)?;
    if !config.has_geometry() {
        return Err(BfError::config("配置中的块缺少 geometry 包围盒，无法点定位").into());
    }

    let coords = parse_list::<f64>(&args.point, "坐标")?;
    let point = DVec3::new(coords[0], coords[1], coords.get(2).copied().unwrap_or(0.0));

    let dims = *domain
        .topology()
        .dims(args.block)
        .map_err(BfError::from)
        .with_context(|| format!("块 {} 不存在", args.block))?;
    let local = match &args.cell {
        Some(text) => parse_list::<usize>(text, "单元")?,
        None => vec![0, 0, 0],
    };
    let offset = |axis: usize| -> usize {
        match axis {
            0 => dims.imin(),
            1 => dims.jmin(),
            _ => dims.kmin(),
        }
    };
    let mut ijk = [offset(0), offset(1), offset(2)];
    for (axis, &v) in local.iter().enumerate().take(3) {
        ijk[axis] += v;
    }
    let guess = CellLocation::new(args.block, ijk);

    let finder = domain
        .cell_finder(1)
        .map_err(BfError::from)
        .context("无法创建点定位器")?;
    let search = finder
        .find_cell_on(0, point, guess)
        .map_err(BfError::from)
        .context("点定位失败")?;

    let to_local = |loc: CellLocation| -> Result<[usize; 3]> {
        let d = domain.topology().dims(loc.block)?;
        Ok([
            loc.ijk[0].saturating_sub(d.imin()),
            loc.ijk[1].saturating_sub(d.jmin()),
            loc.ijk[2].saturating_sub(d.kmin()),
        ])
    };
    let cell = to_local(search.location)?;
    match search.status {
        SearchStatus::InsideGrid => println!(
            "点 ({}, {}, {}) 位于块 {} 单元 {:?}",
            point.x, point.y, point.z, search.location.block, cell
        ),
        SearchStatus::Exit(face) => println!(
            "点 ({}, {}, {}) 从块 {} 面 {} 离开计算域，最近边界单元 {:?}",
            point.x, point.y, point.z, search.location.block, face, cell
        ),
        SearchStatus::Error => {
            search
                .into_result()
                .map_err(BfError::from)
                .with_context(|| format!("搜索停在块 {} 单元 {:?}", search.location.block, cell))?;
        }
    }
    println!(
        "迭代 {} 次, 跨块 {} 次",
        search.iterations, search.hops
    );
    Ok(())
}
