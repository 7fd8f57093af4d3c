// crates/bf_config/src/simulation.rs

//! SimulationConfig - 多块模拟配置
//!
//! 描述块尺寸、每个面的边界条件类型与参数、以及 rank 映射表。
//! 本层只负责解码与基本合法性检查，边界条件名称在物理层解析。
//!
//! # 示例
//!
//! ```
//! use bf_config::SimulationConfig;
//!
//! let json = r#"{
//!     "dimensions": 2,
//!     "blocks": [
//!         { "label": "a", "nni": 4, "nnj": 2,
//!           "faces": { "east": { "bc": "adjacent", "other_block": 1, "other_face": "west" } } },
//!         { "label": "b", "nni": 3, "nnj": 2,
//!           "faces": { "west": { "bc": 0, "other_block": 0, "other_face": "east" } } }
//!     ]
//! }"#;
//! let cfg = SimulationConfig::from_json_str(json).unwrap();
//! assert_eq!(cfg.blocks.len(), 2);
//! assert_eq!(cfg.nghost, 2);
//! ```

use crate::error::{ConfigError, ConfigResult};
use bf_foundation::{Dimension, Face};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

// ============================================================
// 顶层配置
// ============================================================

/// 多块模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 维度（2 或 3）
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,

    /// 虚拟单元层数
    #[serde(default = "default_nghost")]
    pub nghost: usize,

    /// 是否计算粘性项
    #[serde(default)]
    pub viscous: bool,

    /// 是否为动网格
    #[serde(default)]
    pub moving_grid: bool,

    /// 湍流模型
    #[serde(default)]
    pub turbulence_model: TurbulenceModel,

    /// 温度模态数
    #[serde(default = "default_one")]
    pub n_modes: usize,

    /// 组分数
    #[serde(default = "default_one")]
    pub n_species: usize,

    /// 块列表，编号即下标
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,

    /// 显式 rank 映射表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_map: Option<RankMapConfig>,
}

fn default_dimensions() -> u8 {
    2
}
fn default_nghost() -> usize {
    2
}
fn default_one() -> usize {
    1
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            nghost: default_nghost(),
            viscous: false,
            moving_grid: false,
            turbulence_model: TurbulenceModel::default(),
            n_modes: default_one(),
            n_species: default_one(),
            blocks: Vec::new(),
            rank_map: None,
        }
    }
}

/// 湍流模型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbulenceModel {
    /// 层流
    #[default]
    #[serde(alias = "laminar")]
    None,
    /// Baldwin-Lomax 代数模型
    #[serde(alias = "baldwin-lomax")]
    BaldwinLomax,
    /// Wilcox k-omega 模型
    #[serde(alias = "k-omega", alias = "k_w")]
    KOmega,
    /// Spalart-Allmaras 模型
    #[serde(alias = "spalart-allmaras")]
    SpalartAllmaras,
}

impl TurbulenceModel {
    /// 是否为 k-omega 类模型
    pub fn is_k_omega(self) -> bool {
        matches!(self, Self::KOmega)
    }
}

// ============================================================
// 块与面
// ============================================================

/// 块配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// 标签
    #[serde(default)]
    pub label: String,
    /// i 方向单元数
    pub nni: usize,
    /// j 方向单元数
    pub nnj: usize,
    /// k 方向单元数（2D 忽略）
    #[serde(default = "default_one")]
    pub nnk: usize,
    /// 按面名索引的面配置，未给出的面为 slip_wall
    #[serde(default)]
    pub faces: BTreeMap<String, FaceConfig>,
    /// 笛卡尔几何盒
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryBoxConfig>,
}

impl BlockConfig {
    /// 查找指定面的配置（面名大小写不敏感，可用首字母）
    pub fn face_config(&self, face: Face) -> Option<&FaceConfig> {
        self.faces
            .iter()
            .find(|(name, _)| Face::from_name(name) == Some(face))
            .map(|(_, cfg)| cfg)
    }
}

/// 笛卡尔几何盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryBoxConfig {
    /// 起点
    pub origin: [f64; 3],
    /// 尺寸
    pub size: [f64; 3],
}

/// 边界条件类型键：名称或旧式整数代码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BcKey {
    /// 整数代码
    Code(u32),
    /// 名称
    Name(String),
}

impl Default for BcKey {
    fn default() -> Self {
        Self::Name("slip_wall".to_string())
    }
}

impl fmt::Display for BcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(c) => write!(f, "{}", c),
            Self::Name(n) => f.write_str(n),
        }
    }
}

/// 面配置：边界条件类型与其参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// 边界条件类型
    pub bc: BcKey,

    /// 相邻块编号（有符号，便于报告负值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_block: Option<i64>,
    /// 相邻面名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_face: Option<String>,
    /// 方向代码 0..7
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u8>,

    /// 壁面温度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_wall: Option<f64>,
    /// 滑移温度起始值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_wall_i: Option<f64>,
    /// 滑移温度终止值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_wall_f: Option<f64>,
    /// 滑移起始时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_i: Option<f64>,
    /// 滑移终止时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_f: Option<f64>,
    /// 温度跳跃系数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    /// 壁面发射率
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissivity: Option<f64>,

    /// 催化壁子模式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wc_bc: Option<String>,
    /// 超催化壁组分
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_f: Option<Vec<f64>>,
    /// 平衡催化表
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wcbc_table: Option<EquilibriumTableConfig>,

    /// 超声速入流状态
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflow: Option<FlowConditionConfig>,
    /// 出口压力
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_out: Option<f64>,
    /// 外推阶数（0 复制, 1 线性）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_order: Option<u8>,
}

impl FaceConfig {
    /// 指定类型、其余参数为空的面配置
    pub fn with_bc(bc: impl Into<String>) -> Self {
        Self {
            bc: BcKey::Name(bc.into()),
            ..Default::default()
        }
    }
}

/// 平衡催化表：`log10(p)` 起点、步长与每行组分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumTableConfig {
    /// `log10(p)` 起点
    pub lp_min: f64,
    /// `log10(p)` 步长
    pub dlp: f64,
    /// 每行为一组质量分数
    pub massf: Vec<Vec<f64>>,
}

/// 流动状态（入流条件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConditionConfig {
    /// 密度
    pub rho: f64,
    /// 压力
    pub p: f64,
    /// 温度（全部模态相同）
    pub t: f64,
    /// 速度
    #[serde(default)]
    pub vel: [f64; 3],
    /// 质量分数，空时为单组分
    #[serde(default)]
    pub massf: Vec<f64>,
    /// 湍动能
    #[serde(default)]
    pub tke: f64,
    /// 比耗散率
    #[serde(default = "default_omega")]
    pub omega: f64,
    /// 分子粘度
    #[serde(default)]
    pub mu: f64,
}

fn default_omega() -> f64 {
    1.0
}

// ============================================================
// rank 映射
// ============================================================

/// rank 映射表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntryConfig {
    /// rank 编号
    pub rank: usize,
    /// 块编号（有符号）
    pub blocks: Vec<i64>,
}

/// rank 映射表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankMapConfig {
    /// 各 rank 的块列表
    pub entries: Vec<RankEntryConfig>,
}

// ============================================================
// 加载与验证
// ============================================================

impl SimulationConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 维度
    pub fn dimension(&self) -> ConfigResult<Dimension> {
        Dimension::from_usize(self.dimensions as usize).ok_or_else(|| {
            ConfigError::invalid_value("dimensions", self.dimensions, "必须为 2 或 3")
        })
    }

    /// 验证配置有效性
    pub fn validate(&self) -> ConfigResult<()> {
        let dim = self.dimension()?;

        if self.nghost == 0 {
            return Err(ConfigError::invalid_value("nghost", self.nghost, "必须至少为 1"));
        }
        if self.n_modes == 0 {
            return Err(ConfigError::invalid_value("n_modes", self.n_modes, "必须至少为 1"));
        }
        if self.n_species == 0 {
            return Err(ConfigError::invalid_value(
                "n_species",
                self.n_species,
                "必须至少为 1",
            ));
        }
        if self.blocks.is_empty() {
            return Err(ConfigError::missing("blocks"));
        }

        for (id, block) in self.blocks.iter().enumerate() {
            let key = |field: &str| format!("blocks[{}].{}", id, field);
            if block.nni == 0 {
                return Err(ConfigError::invalid_value(key("nni"), block.nni, "必须为正"));
            }
            if block.nnj == 0 {
                return Err(ConfigError::invalid_value(key("nnj"), block.nnj, "必须为正"));
            }
            if dim.is_3d() && block.nnk == 0 {
                return Err(ConfigError::invalid_value(key("nnk"), block.nnk, "必须为正"));
            }
            let mut seen: [Option<&str>; 6] = [None; 6];
            for (name, face) in &block.faces {
                let f = Face::from_name(name).ok_or_else(|| {
                    ConfigError::invalid_value(key("faces"), name, "未知的面名")
                })?;
                if let Some(first) = seen[f.index()].replace(name.as_str()) {
                    return Err(ConfigError::invalid_value(
                        key("faces"),
                        name,
                        format!("与 \"{}\" 指向同一个面 {}", first, f),
                    ));
                }
                if !f.exists_in(dim) {
                    return Err(ConfigError::invalid_value(
                        key("faces"),
                        name,
                        format!("{} 中不存在该面", dim),
                    ));
                }
                if let Some(o) = face.orientation {
                    if o > 7 {
                        return Err(ConfigError::invalid_value(
                            key(&format!("faces.{}.orientation", name)),
                            o,
                            "方向代码必须在 0..7",
                        ));
                    }
                }
                if let Some(other) = &face.other_face {
                    if Face::from_name(other).is_none() {
                        return Err(ConfigError::invalid_value(
                            key(&format!("faces.{}.other_face", name)),
                            other,
                            "未知的面名",
                        ));
                    }
                }
            }
            if let Some(g) = &block.geometry {
                let n = if dim.is_3d() { 3 } else { 2 };
                if g.size[..n].iter().any(|&s| s <= 0.0) {
                    return Err(ConfigError::invalid_value(
                        key("geometry.size"),
                        format!("{:?}", g.size),
                        "尺寸必须为正",
                    ));
                }
            }
        }

        // 几何盒要么全给，要么全不给
        let with_geometry = self.blocks.iter().filter(|b| b.geometry.is_some()).count();
        if with_geometry > 0 && with_geometry < self.blocks.len() {
            if let Some(id) = self.blocks.iter().position(|b| b.geometry.is_none()) {
                return Err(ConfigError::invalid_value(
                    format!("blocks[{}].geometry", id),
                    "null",
                    format!("{} 个块给出了几何盒，其余块也必须给出", with_geometry),
                ));
            }
        }
        Ok(())
    }

    /// 是否全部块都给出了几何盒
    pub fn has_geometry(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(|b| b.geometry.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> SimulationConfig {
        SimulationConfig {
            blocks: vec![BlockConfig {
                label: "b0".into(),
                nni: 4,
                nnj: 4,
                nnk: 1,
                faces: BTreeMap::new(),
                geometry: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_is_valid() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut cfg = minimal();
        cfg.dimensions = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_top_face_rejected_in_2d() {
        let mut cfg = minimal();
        cfg.blocks[0]
            .faces
            .insert("top".into(), FaceConfig::with_bc("slip_wall"));
        assert!(cfg.validate().is_err());
        cfg.dimensions = 3;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_face_config_lookup_case_insensitive() {
        let mut cfg = minimal();
        cfg.blocks[0]
            .faces
            .insert("East".into(), FaceConfig::with_bc("fixed_t"));
        let fc = cfg.blocks[0].face_config(Face::East).unwrap();
        assert_eq!(fc.bc, BcKey::Name("fixed_t".into()));
        assert!(cfg.blocks[0].face_config(Face::West).is_none());
    }

    #[test]
    fn test_duplicate_face_names_rejected() {
        let mut cfg = minimal();
        cfg.blocks[0]
            .faces
            .insert("east".into(), FaceConfig::with_bc("fixed_t"));
        cfg.blocks[0]
            .faces
            .insert("E".into(), FaceConfig::with_bc("slip_wall"));
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("blocks[0].faces"));
    }

    #[test]
    fn test_bc_key_numeric_or_name() {
        let fc: FaceConfig = serde_json::from_str(r#"{"bc": 5, "t_wall": 300.0}"#).unwrap();
        assert_eq!(fc.bc, BcKey::Code(5));
        assert_eq!(fc.t_wall, Some(300.0));
        let fc: FaceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(fc.bc, BcKey::Name("slip_wall".into()));
    }

    #[test]
    fn test_turbulence_aliases() {
        let m: TurbulenceModel = serde_json::from_str("\"k-omega\"").unwrap();
        assert!(m.is_k_omega());
        let m: TurbulenceModel = serde_json::from_str("\"baldwin_lomax\"").unwrap();
        assert_eq!(m, TurbulenceModel::BaldwinLomax);
    }

    #[test]
    fn test_rank_map_is_plain_list() {
        let map: RankMapConfig =
            serde_json::from_str(r#"[{"rank": 0, "blocks": [0, 2]}, {"rank": 1, "blocks": [-1]}]"#)
                .unwrap();
        assert_eq!(map.entries.len(), 2);
        assert_eq!(map.entries[1].blocks, vec![-1]);
    }
}
