// crates/bf_physics/src/boundary/catalytic.rs

//! 催化壁策略
//!
//! 附加在壁面边界上、与热/运动学行为正交的第二层策略，
//! 在粘性边界处理中以近壁单元的热力学状态为输入改写壁面组分：
//! - NonCatalytic: 不修改
//! - SuperCatalytic: 壁面组分固定
//! - Equilibrium: 按压力查表（`log10 p` 线性插值，两端截断）

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};
use crate::state::GasState;

/// 平衡催化表的最大行数
pub const MAX_EQUILIBRIUM_TABLE_ROWS: usize = 100;

// ============================================================
// 平衡表
// ============================================================

/// 平衡催化表
///
/// 第 `i` 行对应 `log10(p) = lp_min + i * dlp`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumTable {
    lp_min: f64,
    dlp: f64,
    rows: Vec<Vec<f64>>,
}

impl EquilibriumTable {
    /// 创建并检查表的形状
    pub fn new(lp_min: f64, dlp: f64, rows: Vec<Vec<f64>>) -> PhysicsResult<Self> {
        if rows.is_empty() || rows.len() > MAX_EQUILIBRIUM_TABLE_ROWS {
            return Err(PhysicsError::invalid_state(format!(
                "平衡催化表行数 {} 不在 1..={} 内",
                rows.len(),
                MAX_EQUILIBRIUM_TABLE_ROWS
            )));
        }
        if !(dlp.is_finite() && dlp > 0.0) || !lp_min.is_finite() {
            return Err(PhysicsError::invalid_state(format!(
                "平衡催化表参数无效: lp_min={}, dlp={}",
                lp_min, dlp
            )));
        }
        let n = rows[0].len();
        if n == 0 || rows.iter().any(|r| r.len() != n) {
            return Err(PhysicsError::invalid_state("平衡催化表各行组分数不一致"));
        }
        Ok(Self { lp_min, dlp, rows })
    }

    /// 组分数
    #[inline]
    pub fn n_species(&self) -> usize {
        self.rows[0].len()
    }

    /// 行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// 按压力插值得到壁面组分
    pub fn massf_at(&self, p: f64, out: &mut [f64]) {
        let last = self.rows.len() - 1;
        let x = if p > 0.0 {
            (p.log10() - self.lp_min) / self.dlp
        } else {
            0.0
        };
        let (lo, hi, w) = if x.is_nan() || x <= 0.0 {
            (0, 0, 0.0)
        } else if x >= last as f64 {
            (last, last, 0.0)
        } else {
            let lo = x.floor() as usize;
            (lo, lo + 1, x - lo as f64)
        };
        for (s, f) in out.iter_mut().enumerate().take(self.n_species()) {
            *f = (1.0 - w) * self.rows[lo][s] + w * self.rows[hi][s];
        }
    }
}

// ============================================================
// 催化策略
// ============================================================

/// 催化壁策略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CatalyticPolicy {
    /// 非催化
    #[default]
    NonCatalytic,
    /// 超催化：壁面组分固定
    SuperCatalytic {
        /// 壁面质量分数
        massf_wall: Vec<f64>,
    },
    /// 平衡催化：按压力查表
    Equilibrium(EquilibriumTable),
}

impl CatalyticPolicy {
    /// 由子模式名称与参数构造
    ///
    /// `partially_catalytic` 可识别但未实现。
    pub fn from_key(
        key: &str,
        massf_wall: Option<&[f64]>,
        table: Option<EquilibriumTable>,
        n_species: usize,
    ) -> PhysicsResult<Self> {
        match key.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "non_catalytic" | "none" => Ok(Self::NonCatalytic),
            "super_catalytic" => {
                let massf = massf_wall
                    .ok_or_else(|| PhysicsError::invalid_state("super_catalytic 缺少 mass_f"))?;
                Self::super_catalytic(massf.to_vec(), n_species)
            }
            "equil_catalytic" | "equilibrium_catalytic" => {
                let table = table.ok_or_else(|| {
                    PhysicsError::invalid_state("equil_catalytic 缺少 wcbc_table")
                })?;
                if table.n_species() != n_species {
                    return Err(PhysicsError::invalid_state(format!(
                        "平衡催化表组分数 {} 与组分数 {} 不符",
                        table.n_species(),
                        n_species
                    )));
                }
                Ok(Self::Equilibrium(table))
            }
            "partially_catalytic" => Err(PhysicsError::not_implemented("partially_catalytic 催化壁")),
            other => Err(PhysicsError::invalid_state(format!(
                "未知的催化壁类型 '{}'",
                other
            ))),
        }
    }

    /// 超催化壁，组分长度必须等于组分数
    pub fn super_catalytic(massf_wall: Vec<f64>, n_species: usize) -> PhysicsResult<Self> {
        if massf_wall.len() != n_species {
            return Err(PhysicsError::invalid_state(format!(
                "超催化壁组分长度 {} 与组分数 {} 不符",
                massf_wall.len(),
                n_species
            )));
        }
        Ok(Self::SuperCatalytic { massf_wall })
    }

    /// 是否修改壁面组分
    #[inline]
    pub fn is_catalytic(&self) -> bool {
        !matches!(self, Self::NonCatalytic)
    }

    /// 以近壁单元状态 `cell_gas` 为输入改写壁面组分 `massf`
    pub fn apply(&self, cell_gas: &GasState, massf: &mut [f64]) {
        match self {
            Self::NonCatalytic => {}
            Self::SuperCatalytic { massf_wall } => {
                for (dst, &src) in massf.iter_mut().zip(massf_wall) {
                    *dst = src;
                }
            }
            Self::Equilibrium(table) => table.massf_at(cell_gas.p, massf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EquilibriumTable {
        // log10(p) = 2, 3, 4
        EquilibriumTable::new(
            2.0,
            1.0,
            vec![vec![1.0, 0.0], vec![0.5, 0.5], vec![0.0, 1.0]],
        )
        .unwrap()
    }

    fn gas_at(p: f64) -> GasState {
        let mut g = GasState::new(1, 2);
        g.p = p;
        g
    }

    #[test]
    fn test_equilibrium_interpolates_in_log_p() {
        let mut out = [0.0; 2];
        table().massf_at(10f64.powf(2.5), &mut out);
        assert!((out[0] - 0.75).abs() < 1e-10);
        assert!((out[1] - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_equilibrium_clamps_at_ends() {
        let mut out = [0.0; 2];
        table().massf_at(1.0, &mut out);
        assert_eq!(out, [1.0, 0.0]);
        table().massf_at(1e9, &mut out);
        assert_eq!(out, [0.0, 1.0]);
    }

    #[test]
    fn test_table_shape_checks() {
        assert!(EquilibriumTable::new(0.0, 1.0, vec![]).is_err());
        assert!(EquilibriumTable::new(0.0, 0.0, vec![vec![1.0]]).is_err());
        assert!(EquilibriumTable::new(0.0, 1.0, vec![vec![1.0], vec![0.5, 0.5]]).is_err());
        let too_many = vec![vec![1.0]; MAX_EQUILIBRIUM_TABLE_ROWS + 1];
        assert!(EquilibriumTable::new(0.0, 1.0, too_many).is_err());
    }

    #[test]
    fn test_super_catalytic_overwrites() {
        let policy = CatalyticPolicy::super_catalytic(vec![0.2, 0.8], 2).unwrap();
        let mut massf = vec![1.0, 0.0];
        policy.apply(&gas_at(1e5), &mut massf);
        assert_eq!(massf, vec![0.2, 0.8]);
        assert!(CatalyticPolicy::super_catalytic(vec![1.0], 2).is_err());
    }

    #[test]
    fn test_non_catalytic_leaves_massf() {
        let mut massf = vec![0.3, 0.7];
        CatalyticPolicy::NonCatalytic.apply(&gas_at(1e5), &mut massf);
        assert_eq!(massf, vec![0.3, 0.7]);
    }

    #[test]
    fn test_from_key() {
        let p = CatalyticPolicy::from_key("equil_catalytic", None, Some(table()), 2).unwrap();
        assert!(p.is_catalytic());
        assert!(matches!(
            CatalyticPolicy::from_key("partially_catalytic", None, None, 2),
            Err(PhysicsError::NotImplemented { .. })
        ));
        assert!(CatalyticPolicy::from_key("super_catalytic", None, None, 2).is_err());
    }
}
