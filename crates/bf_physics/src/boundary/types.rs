// crates/bf_physics/src/boundary/types.rs

//! 边界条件类型定义
//!
//! 本模块定义多块可压缩流求解所需的边界条件类型，包括：
//! - BoundaryKind: 边界类型键（名称与旧式整数代码）
//! - TemperatureRamp: 随时间线性滑移的壁温
//! - WallThermal / WallCondition: 壁面热行为与催化策略
//! - BoundaryCondition: 每个块面持有的一个边界条件实例
//! - UserDefinedBoundary: 用户自定义边界的处理接口

use std::fmt;
use std::sync::Arc;

use bf_foundation::Face;

use super::catalytic::CatalyticPolicy;
use crate::context::SimContext;
use crate::error::PhysicsResult;
use crate::state::{BlockFlow, FlowState};

// ============================================================
// 边界类型键
// ============================================================

/// 边界类型键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// 与相邻块相连
    Adjacent,
    /// 超声速入流
    SupersonicIn,
    /// 外推出流
    ExtrapolateOut,
    /// 滑移壁
    SlipWall,
    /// 绝热无滑移壁
    Adiabatic,
    /// 定温壁
    FixedT,
    /// 定压出流
    FixedPOut,
    /// 用户自定义
    UserDefined,
    /// 滑移温度壁
    SlidingT,
    /// 温度跳跃壁
    JumpWall,
    /// 共轭传热壁
    ConjugateHt,
}

/// 可识别但未建模的类型：规范名、旧式代码与别名
const UNMODELLED_KINDS: &[(&str, Option<u32>, &[&str])] = &[
    ("subsonic_in", Some(6), &[]),
    ("subsonic_out", Some(7), &[]),
    ("transient_uni", Some(8), &[]),
    ("transient_prof", Some(9), &[]),
    ("static_prof", Some(10), &[]),
    ("transient_t_wall", Some(13), &[]),
    ("surface_energy_balance", Some(15), &["seb"]),
    ("adjacent_plus_udf", Some(17), &[]),
    ("ablating", Some(18), &[]),
    ("fstc", Some(20), &[]),
    ("shock_fitting_in", Some(21), &[]),
    ("non_catalytic", Some(22), &[]),
    ("equil_catalytic", Some(23), &["equilibrium_catalytic"]),
    ("super_catalytic", Some(24), &[]),
    ("partially_catalytic", Some(25), &[]),
    ("mass_flux_out", None, &[]),
    ("moving_wall", None, &[]),
    ("mapped_cell", None, &[]),
    ("inlet_outlet", None, &[]),
    ("nonuniform_t", None, &[]),
    ("user_defined_mass_flux", None, &[]),
    ("user_defined_energy_flux", None, &[]),
];

impl BoundaryKind {
    /// 全部类型
    pub const ALL: [BoundaryKind; 11] = [
        Self::Adjacent,
        Self::SupersonicIn,
        Self::ExtrapolateOut,
        Self::SlipWall,
        Self::Adiabatic,
        Self::FixedT,
        Self::FixedPOut,
        Self::UserDefined,
        Self::SlidingT,
        Self::JumpWall,
        Self::ConjugateHt,
    ];

    /// 规范名称
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adjacent => "adjacent",
            Self::SupersonicIn => "sup_in",
            Self::ExtrapolateOut => "extrapolate_out",
            Self::SlipWall => "slip_wall",
            Self::Adiabatic => "adiabatic",
            Self::FixedT => "fixed_t",
            Self::FixedPOut => "fixed_p_out",
            Self::UserDefined => "user_defined",
            Self::SlidingT => "sliding_t",
            Self::JumpWall => "jump_wall",
            Self::ConjugateHt => "conjugate_ht",
        }
    }

    /// 旧式整数代码
    pub const fn code(self) -> Option<u32> {
        match self {
            Self::Adjacent => Some(0),
            Self::SupersonicIn => Some(1),
            Self::ExtrapolateOut => Some(2),
            Self::SlipWall => Some(3),
            Self::Adiabatic => Some(4),
            Self::FixedT => Some(5),
            Self::FixedPOut => Some(11),
            Self::UserDefined => Some(16),
            Self::SlidingT => Some(19),
            Self::JumpWall | Self::ConjugateHt => None,
        }
    }

    /// 从整数代码解析
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == Some(code))
    }

    /// 从名称解析（大小写不敏感，`-` 与 `_` 等价）
    pub fn from_key(key: &str) -> Option<Self> {
        let key = normalize(key);
        let key = match key.as_str() {
            "supersonic_in" | "supersonic_inflow" => "sup_in",
            "extrapolate" | "extrapolated_out" => "extrapolate_out",
            "fixed_t_wall" | "fixed_temperature" => "fixed_t",
            "connection" => "adjacent",
            other => other,
        };
        Self::ALL.iter().copied().find(|k| k.name() == key)
    }

    /// 名称是否属于可识别但未建模的类型
    pub fn is_unmodelled(key: &str) -> bool {
        let key = normalize(key);
        UNMODELLED_KINDS
            .iter()
            .any(|(name, _, aliases)| *name == key || aliases.contains(&key.as_str()))
    }

    /// 旧式代码对应的未建模类型名
    ///
    /// 催化代码 22..=25 属于壁面策略，不能单独作为面的边界类型。
    pub fn unmodelled_name(code: u32) -> Option<&'static str> {
        UNMODELLED_KINDS
            .iter()
            .find(|(_, c, _)| *c == Some(code))
            .map(|(name, _, _)| *name)
    }

    /// 是否为壁面类型
    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(self, Self::SlipWall) || self.is_no_slip_wall()
    }

    /// 是否为无滑移（粘性）壁面
    #[inline]
    pub fn is_no_slip_wall(self) -> bool {
        matches!(
            self,
            Self::Adiabatic | Self::FixedT | Self::SlidingT | Self::JumpWall | Self::ConjugateHt
        )
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================
// 壁温
// ============================================================

/// 随时间线性滑移的壁温
///
/// `t <= t_i` 时为 `t_wall_i`，`t >= t_f` 时为 `t_wall_f`，其间线性插值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRamp {
    /// 起始壁温
    pub t_wall_i: f64,
    /// 终止壁温
    pub t_wall_f: f64,
    /// 起始时间
    pub t_i: f64,
    /// 终止时间
    pub t_f: f64,
}

impl TemperatureRamp {
    /// 时刻 `time` 的壁温
    pub fn at(&self, time: f64) -> f64 {
        if time <= self.t_i {
            self.t_wall_i
        } else if time < self.t_f {
            (time - self.t_i) / (self.t_f - self.t_i) * (self.t_wall_f - self.t_wall_i)
                + self.t_wall_i
        } else {
            self.t_wall_f
        }
    }
}

/// 壁面热行为
#[derive(Debug, Clone, PartialEq)]
pub enum WallThermal {
    /// 绝热：不改写温度
    Adiabatic,
    /// 定温
    Fixed {
        /// 壁温
        t_wall: f64,
    },
    /// 滑移温度
    Sliding(TemperatureRamp),
    /// 温度跳跃壁
    Jump {
        /// 壁温
        t_wall: f64,
        /// 跳跃系数
        sigma: f64,
    },
    /// 共轭传热：逐界面壁温由外部壁面模型提供，按面槽位存储
    Coupled {
        /// 各界面壁温
        temperatures: Vec<f64>,
    },
}

impl WallThermal {
    /// 面槽位 `slot` 在时刻 `time` 的壁温，绝热壁返回 None
    pub fn wall_temperature(&self, time: f64, slot: usize) -> Option<f64> {
        match self {
            Self::Adiabatic => None,
            Self::Fixed { t_wall } | Self::Jump { t_wall, .. } => Some(*t_wall),
            Self::Sliding(ramp) => Some(ramp.at(time)),
            Self::Coupled { temperatures } => temperatures.get(slot).copied(),
        }
    }
}

/// 无滑移壁面条件
#[derive(Debug, Clone, PartialEq)]
pub struct WallCondition {
    /// 热行为
    pub thermal: WallThermal,
    /// 催化策略
    pub catalytic: CatalyticPolicy,
    /// 发射率
    pub emissivity: f64,
}

impl WallCondition {
    /// 非催化、发射率 1 的壁面
    pub fn new(thermal: WallThermal) -> Self {
        Self {
            thermal,
            catalytic: CatalyticPolicy::NonCatalytic,
            emissivity: 1.0,
        }
    }

    /// 指定催化策略
    pub fn with_catalytic(mut self, catalytic: CatalyticPolicy) -> Self {
        self.catalytic = catalytic;
        self
    }
}

// ============================================================
// 用户自定义边界
// ============================================================

/// 用户自定义边界处理接口
pub trait UserDefinedBoundary: fmt::Debug + Send + Sync {
    /// 设置虚拟单元或界面状态
    fn apply_convective(
        &self,
        ctx: &SimContext,
        flow: &mut BlockFlow,
        face: Face,
        time: f64,
    ) -> PhysicsResult<()>;

    /// 粘性边界处理，默认不做任何事
    fn apply_viscous(
        &self,
        _ctx: &SimContext,
        _flow: &mut BlockFlow,
        _face: Face,
        _time: f64,
    ) -> PhysicsResult<()> {
        Ok(())
    }
}

// ============================================================
// 边界条件
// ============================================================

/// 外推阶数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtrapolationOrder {
    /// 复制边界单元
    #[default]
    Copy,
    /// 线性外推
    Linear,
}

impl ExtrapolationOrder {
    /// 从配置代码构造（0 复制，其余线性）
    pub fn from_code(x_order: u8) -> Self {
        if x_order == 0 {
            Self::Copy
        } else {
            Self::Linear
        }
    }
}

/// 块面边界条件
///
/// 每个块的六个面槽位各持有一个实例，缺省为滑移壁。
#[derive(Debug, Clone, Default)]
pub enum BoundaryCondition {
    /// 与相邻块相连，数据交换由外部完成
    Adjacent,
    /// 滑移壁
    #[default]
    SlipWall,
    /// 超声速入流
    SupersonicInflow {
        /// 入流状态
        inflow: FlowState,
    },
    /// 外推出流
    ExtrapolateOut {
        /// 外推阶数
        order: ExtrapolationOrder,
    },
    /// 定压出流
    FixedPressureOut {
        /// 出口压力
        p_out: f64,
    },
    /// 无滑移壁
    Wall(WallCondition),
    /// 用户自定义
    UserDefined(Arc<dyn UserDefinedBoundary>),
}

impl BoundaryCondition {
    /// 定温壁
    pub fn fixed_t(t_wall: f64) -> Self {
        Self::Wall(WallCondition::new(WallThermal::Fixed { t_wall }))
    }

    /// 绝热壁
    pub fn adiabatic() -> Self {
        Self::Wall(WallCondition::new(WallThermal::Adiabatic))
    }

    /// 类型键
    pub fn kind(&self) -> BoundaryKind {
        match self {
            Self::Adjacent => BoundaryKind::Adjacent,
            Self::SlipWall => BoundaryKind::SlipWall,
            Self::SupersonicInflow { .. } => BoundaryKind::SupersonicIn,
            Self::ExtrapolateOut { .. } => BoundaryKind::ExtrapolateOut,
            Self::FixedPressureOut { .. } => BoundaryKind::FixedPOut,
            Self::UserDefined(_) => BoundaryKind::UserDefined,
            Self::Wall(w) => match w.thermal {
                WallThermal::Adiabatic => BoundaryKind::Adiabatic,
                WallThermal::Fixed { .. } => BoundaryKind::FixedT,
                WallThermal::Sliding(_) => BoundaryKind::SlidingT,
                WallThermal::Jump { .. } => BoundaryKind::JumpWall,
                WallThermal::Coupled { .. } => BoundaryKind::ConjugateHt,
            },
        }
    }

    /// 是否为壁面（含滑移壁）
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.kind().is_wall()
    }

    /// 是否为无滑移壁面
    #[inline]
    pub fn is_no_slip_wall(&self) -> bool {
        matches!(self, Self::Wall(_))
    }

    /// 壁面条件
    pub fn wall(&self) -> Option<&WallCondition> {
        match self {
            Self::Wall(w) => Some(w),
            _ => None,
        }
    }

    /// 更新共轭传热壁的逐界面壁温
    ///
    /// 非共轭传热壁返回错误。
    pub fn set_wall_temperatures(&mut self, values: &[f64]) -> PhysicsResult<()> {
        match self {
            Self::Wall(WallCondition {
                thermal: WallThermal::Coupled { temperatures },
                ..
            }) => {
                temperatures.clear();
                temperatures.extend_from_slice(values);
                Ok(())
            }
            other => Err(crate::error::PhysicsError::invalid_state(format!(
                "{} 边界不接受外部壁温",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in BoundaryKind::ALL {
            if let Some(code) = kind.code() {
                assert_eq!(BoundaryKind::from_code(code), Some(kind));
            }
            assert_eq!(BoundaryKind::from_key(kind.name()), Some(kind));
        }
        assert_eq!(BoundaryKind::from_code(11), Some(BoundaryKind::FixedPOut));
        assert_eq!(BoundaryKind::from_code(7), None);
        assert_eq!(BoundaryKind::unmodelled_name(7), Some("subsonic_out"));
        assert_eq!(BoundaryKind::unmodelled_name(17), Some("adjacent_plus_udf"));
        assert_eq!(BoundaryKind::unmodelled_name(12), None);
    }

    #[test]
    fn test_legacy_codes_do_not_overlap() {
        for (name, code, _) in UNMODELLED_KINDS {
            if let Some(code) = code {
                assert_eq!(BoundaryKind::from_code(*code), None, "{}", name);
            }
            assert_eq!(BoundaryKind::from_key(name), None, "{}", name);
        }
        for code in [6, 7, 8, 9, 10, 13, 15, 17, 18, 20, 21, 22, 23, 24, 25] {
            assert!(BoundaryKind::unmodelled_name(code).is_some(), "{}", code);
        }
    }

    #[test]
    fn test_kind_key_normalisation() {
        assert_eq!(BoundaryKind::from_key("Slip-Wall"), Some(BoundaryKind::SlipWall));
        assert_eq!(BoundaryKind::from_key(" FIXED_T "), Some(BoundaryKind::FixedT));
        assert_eq!(BoundaryKind::from_key("warp_drive"), None);
        assert!(BoundaryKind::is_unmodelled("subsonic-in"));
        assert!(BoundaryKind::is_unmodelled("SEB"));
        assert!(BoundaryKind::is_unmodelled("transient_t_wall"));
        assert_eq!(BoundaryKind::from_key("adjacent_plus_udf"), None);
        assert!(BoundaryKind::is_unmodelled("adjacent_plus_udf"));
    }

    #[test]
    fn test_wall_classification() {
        assert!(BoundaryKind::SlipWall.is_wall());
        assert!(!BoundaryKind::SlipWall.is_no_slip_wall());
        assert!(BoundaryKind::SlidingT.is_no_slip_wall());
        assert!(!BoundaryKind::ExtrapolateOut.is_wall());
    }

    #[test]
    fn test_temperature_ramp() {
        let ramp = TemperatureRamp {
            t_wall_i: 300.0,
            t_wall_f: 500.0,
            t_i: 1.0,
            t_f: 3.0,
        };
        assert_eq!(ramp.at(0.0), 300.0);
        assert_eq!(ramp.at(1.0), 300.0);
        assert!((ramp.at(2.0) - 400.0).abs() < 1e-10);
        assert_eq!(ramp.at(3.0), 500.0);
        assert_eq!(ramp.at(10.0), 500.0);
    }

    #[test]
    fn test_default_is_slip_wall() {
        assert_eq!(BoundaryCondition::default().kind(), BoundaryKind::SlipWall);
    }

    #[test]
    fn test_coupled_wall_temperatures() {
        let mut bc = BoundaryCondition::Wall(WallCondition::new(WallThermal::Coupled {
            temperatures: Vec::new(),
        }));
        bc.set_wall_temperatures(&[310.0, 320.0]).unwrap();
        let w = bc.wall().unwrap();
        assert_eq!(w.thermal.wall_temperature(0.0, 1), Some(320.0));
        assert_eq!(w.thermal.wall_temperature(0.0, 5), None);
        assert!(BoundaryCondition::fixed_t(300.0)
            .set_wall_temperatures(&[1.0])
            .is_err());
    }
}
