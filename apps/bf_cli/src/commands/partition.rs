// apps/bf_cli/src/commands/partition.rs

//! 块划分命令

use anyhow::{Context, Result};
use bf_foundation::BfError;
use bf_mesh::balance;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::load_domain;

/// 划分参数
#[derive(Args)]
pub struct PartitionArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 执行进程数
    #[arg(short, long, default_value = "1")]
    pub workers: usize,

    /// 忽略配置中的映射表，按单元数负载均衡
    #[arg(long)]
    pub balance: bool,
}

/// 执行划分命令
pub fn execute(args: PartitionArgs) -> Result<()> {
    info!("=== BlockFlow 块划分 ===");
    let (_, domain) = load_domain(&args.config)?;

    let assignment = if args.balance {
        let map = balance(domain.topology(), args.workers)
            .map_err(BfError::from)
            .context("负载均衡失败")?;
        bf_mesh::assign(domain.topology(), args.workers, Some(&map))
            .map_err(BfError::from)
            .context("负载均衡结果无效")?
    } else {
        domain
            .partition(args.workers)
            .map_err(BfError::from)
            .context("块划分失败")?
    };

    for (rank, blocks) in &assignment.blocks_of_rank {
        let cells: usize = blocks
            .iter()
            .filter_map(|&b| domain.topology().dims(b).ok())
            .map(|d| d.n_active())
            .sum();
        println!("rank {:>4}: blocks {:?} ({} cells)", rank, blocks, cells);
    }
    Ok(())
}
