// crates/bf_mesh/src/partition.rs

//! 块到执行进程（rank）的划分
//!
//! 三种来源：
//!
//! 1. 显式映射表：每个 rank 给出一组块编号
//! 2. 多进程且无映射表：要求进程数等于块数，块 i 分给 rank i
//! 3. 单进程：全部块分给 rank 0
//!
//! 结果必须是块集合的划分：每块恰好属于一个 rank。
//! [`balance`] 按单元数做静态负载均衡，产出的映射表可直接交给 [`assign`]。

use crate::error::{MeshError, MeshResult};
use crate::topology::Topology;
use std::collections::BTreeMap;

/// 显式映射表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    /// rank 编号
    pub rank: usize,
    /// 分给该 rank 的块（有符号，便于报告负编号）
    pub blocks: Vec<i64>,
}

/// 显式映射表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitRankMap {
    /// 各 rank 的块列表
    pub entries: Vec<RankEntry>,
}

impl ExplicitRankMap {
    /// 从 `(rank, blocks)` 对构造
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec<i64>)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(rank, blocks)| RankEntry { rank, blocks })
                .collect(),
        }
    }
}

/// rank 划分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAssignment {
    /// 每块所属 rank，下标为块编号
    pub rank_of_block: Vec<usize>,
    /// 每个 rank 拥有的块，按块编号升序
    pub blocks_of_rank: BTreeMap<usize, Vec<usize>>,
}

impl RankAssignment {
    /// rank 数
    pub fn n_ranks(&self) -> usize {
        self.blocks_of_rank.len()
    }

    /// 指定 rank 拥有的块
    pub fn blocks_for(&self, rank: usize) -> &[usize] {
        self.blocks_of_rank
            .get(&rank)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 转换为显式映射表
    pub fn to_explicit(&self) -> ExplicitRankMap {
        ExplicitRankMap::from_pairs(
            self.blocks_of_rank
                .iter()
                .map(|(&r, bs)| (r, bs.iter().map(|&b| b as i64).collect())),
        )
    }

    fn from_owner(rank_of_block: Vec<usize>) -> Self {
        let mut blocks_of_rank: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (block, &rank) in rank_of_block.iter().enumerate() {
            blocks_of_rank.entry(rank).or_default().push(block);
        }
        Self {
            rank_of_block,
            blocks_of_rank,
        }
    }
}

/// 将块分配给 `n_workers` 个执行进程
pub fn assign(
    topology: &Topology,
    n_workers: usize,
    explicit: Option<&ExplicitRankMap>,
) -> MeshResult<RankAssignment> {
    let n_blocks = topology.n_blocks();
    if n_workers == 0 {
        return Err(MeshError::partition("执行进程数必须至少为 1"));
    }

    let result = match explicit {
        Some(map) => assign_explicit(n_blocks, n_workers, map)?,
        None if n_workers > 1 => {
            if n_workers != n_blocks {
                return Err(MeshError::partition(format!(
                    "无映射表时进程数 {} 必须等于块数 {}",
                    n_workers, n_blocks
                )));
            }
            RankAssignment::from_owner((0..n_blocks).collect())
        }
        None => RankAssignment::from_owner(vec![0; n_blocks]),
    };

    tracing::info!(
        "块划分完成: {} 块 -> {} 个 rank",
        n_blocks,
        result.n_ranks()
    );
    for (rank, blocks) in &result.blocks_of_rank {
        tracing::debug!("rank {}: blocks {:?}", rank, blocks);
    }
    Ok(result)
}

fn assign_explicit(
    n_blocks: usize,
    n_workers: usize,
    map: &ExplicitRankMap,
) -> MeshResult<RankAssignment> {
    let mut owner: Vec<Option<usize>> = vec![None; n_blocks];
    let mut seen_ranks = BTreeMap::new();
    let mut total = 0usize;

    for entry in &map.entries {
        if seen_ranks.insert(entry.rank, ()).is_some() {
            return Err(MeshError::partition(format!(
                "rank {} 在映射表中出现多次",
                entry.rank
            )));
        }
        if entry.rank >= n_workers {
            return Err(MeshError::partition(format!(
                "rank {} 超出进程数 {}",
                entry.rank, n_workers
            )));
        }
        for &raw in &entry.blocks {
            if raw < 0 {
                return Err(MeshError::partition(format!(
                    "rank {} 的块编号 {} 为负",
                    entry.rank, raw
                )));
            }
            let block = raw as usize;
            if block >= n_blocks {
                return Err(MeshError::partition(format!(
                    "rank {} 的块编号 {} 超出块数 {}",
                    entry.rank, block, n_blocks
                )));
            }
            if let Some(prev) = owner[block] {
                return Err(MeshError::partition(format!(
                    "块 {} 同时分给了 rank {} 和 rank {}",
                    block, prev, entry.rank
                )));
            }
            owner[block] = Some(entry.rank);
            total += 1;
        }
    }

    if total != n_blocks {
        return Err(MeshError::partition(format!(
            "映射表共分配 {} 块, 但拓扑有 {} 块",
            total, n_blocks
        )));
    }
    if seen_ranks.len() != n_workers {
        return Err(MeshError::partition(format!(
            "映射表有 {} 个 rank, 但启动了 {} 个进程",
            seen_ranks.len(),
            n_workers
        )));
    }

    let rank_of_block = owner.into_iter().flatten().collect::<Vec<_>>();
    Ok(RankAssignment::from_owner(rank_of_block))
}

/// 按单元数静态负载均衡（最长处理时间优先的贪心法）
///
/// 块按 `nni·nnj·nnk` 从大到小排序（相同时编号小者优先），依次分给当前负载最小的
/// rank（相同时编号小者优先）。`n_ranks` 为零或大于块数时返回 `Partition` 错误。
pub fn balance(topology: &Topology, n_ranks: usize) -> MeshResult<ExplicitRankMap> {
    let n_blocks = topology.n_blocks();
    if n_ranks == 0 {
        return Err(MeshError::partition("rank 数必须至少为 1"));
    }
    if n_ranks > n_blocks {
        return Err(MeshError::partition(format!(
            "rank 数 {} 多于块数 {}，存在空闲 rank",
            n_ranks, n_blocks
        )));
    }

    let mut order: Vec<(usize, usize)> = topology
        .blocks()
        .iter()
        .map(|bt| (bt.id, bt.dims.n_active()))
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut load = vec![0usize; n_ranks];
    let mut lists: Vec<Vec<i64>> = vec![Vec::new(); n_ranks];
    for (block, cells) in order {
        let mut target = 0;
        for r in 1..n_ranks {
            if load[r] < load[target] {
                target = r;
            }
        }
        load[target] += cells;
        lists[target].push(block as i64);
    }

    if let (Some(max), Some(min)) = (load.iter().max(), load.iter().min()) {
        tracing::info!(
            "负载均衡: {} 块 -> {} rank, 单元数 max {} / min {}",
            n_blocks,
            n_ranks,
            max,
            min
        );
    }
    Ok(ExplicitRankMap::from_pairs(lists.into_iter().enumerate()))
}
