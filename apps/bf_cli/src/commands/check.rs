// apps/bf_cli/src/commands/check.rs

//! 连接性检查命令
//!
//! 构建计算域，检查拓扑与边界条件的一致性。

use anyhow::{Context, Result};
use bf_foundation::{BfError, Face};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::load_domain;

/// 检查参数
#[derive(Args)]
pub struct CheckArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（未配置而取默认滑移壁的面也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行检查命令
pub fn execute(args: CheckArgs) -> Result<()> {
    info!("=== BlockFlow 连接性检查 ===");
    let (config, domain) = load_domain(&args.config)?;
    let report = domain.check_connectivity();

    let mut defaulted = Vec::new();
    for (id, block) in config.blocks.iter().enumerate() {
        for &face in Face::faces_for(domain.ctx().dimension) {
            if block.face_config(face).is_none() {
                defaulted.push(format!("块 {} 面 {} 未配置，使用 slip_wall", id, face));
            }
        }
    }

    println!(
        "{} 块, 检查 {} 个面",
        domain.n_blocks(),
        report.faces_checked
    );
    if !report.violations.is_empty() {
        println!("\n错误 ({}):", report.violations.len());
        for v in &report.violations {
            println!("  ✗ {}", v);
        }
    }
    if !defaulted.is_empty() {
        println!("\n警告 ({}):", defaulted.len());
        for w in &defaulted {
            println!("  ⚠ {}", w);
        }
    }

    let n_violations = report.violations.len();
    let outcome = report.into_result().map_err(BfError::from).and_then(|()| {
        if args.strict && !defaulted.is_empty() {
            Err(BfError::invalid_topology(format!(
                "严格模式: {} 个面未配置",
                defaulted.len()
            )))
        } else {
            Ok(())
        }
    });
    if outcome.is_err() {
        println!("\n✗ 检查失败");
    } else {
        println!("\n✓ 检查通过");
    }
    outcome.with_context(|| {
        format!(
            "检查失败：发现 {} 个违规，{} 个警告",
            n_violations,
            defaulted.len()
        )
    })
}
