// apps/bf_cli/src/commands/mod.rs

//! 子命令实现

pub mod check;
pub mod locate;
pub mod partition;

use anyhow::{Context, Result};
use bf_config::SimulationConfig;
use bf_foundation::{BfError, BfResult};
use bf_physics::{Domain, DomainBuilder};
use std::path::Path;

/// 读取配置并构建计算域
///
/// 错误统一为 [`BfError`]，由 `main` 映射为退出码。
pub(crate) fn load_domain(path: &Path) -> Result<(SimulationConfig, Domain)> {
    let config = SimulationConfig::from_file(path)
        .map_err(BfError::from)
        .with_context(|| format!("无法加载配置文件: {}", path.display()))?;
    let domain = build_domain(&config).context("无法构建计算域")?;
    Ok((config, domain))
}

fn build_domain(config: &SimulationConfig) -> BfResult<Domain> {
    Ok(DomainBuilder::new(config).build()?)
}

/// 解析逗号分隔的数值列表，长度必须为 2 或 3
pub(crate) fn parse_list<T>(text: &str, what: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let values = text
        .split(',')
        .map(|s| s.trim().parse::<T>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("无法解析{}: {}", what, text))?;
    if !(2..=3).contains(&values.len()) {
        anyhow::bail!("{}需要 2 或 3 个分量: {}", what, text);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list::<f64>("1.5, 2", "坐标").unwrap(), vec![1.5, 2.0]);
        assert_eq!(parse_list::<usize>("1,2,3", "单元").unwrap(), vec![1, 2, 3]);
        assert!(parse_list::<f64>("1", "坐标").is_err());
        assert!(parse_list::<usize>("1,x", "单元").is_err());
    }
}
