// apps/bf_cli/src/main.rs

//! BlockFlow 命令行界面
//!
//! 多块结构网格拓扑、边界条件与点定位的检查工具。
//!
//! # 子命令
//!
//! - `check`: 构建计算域并检查连接性
//! - `partition`: 输出块到 rank 的划分
//! - `locate`: 在多块网格中定位一个点

mod commands;

use bf_foundation::BfError;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// BlockFlow 多块求解器核心命令行工具
#[derive(Parser)]
#[command(name = "bf_cli")]
#[command(author = "BlockFlow Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "BlockFlow multi-block topology and boundary tools", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查连接性
    Check(commands::check::CheckArgs),
    /// 块划分
    Partition(commands::partition::PartitionArgs),
    /// 点定位
    Locate(commands::locate::LocateArgs),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("错误: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 分层错误按类别给出退出码，其余为 1
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BfError>().map_or(1, BfError::exit_code)
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Partition(args) => commands::partition::execute(args),
        Commands::Locate(args) => commands::locate::execute(args),
    }
}
