// crates/bf_mesh/src/orientation.rs

//! 面连接方向
//!
//! 两块在共享面上的面内轴关系由一个 0..7 的代码描述：
//!
//! - bit 0: 目标 p 轴反向
//! - bit 1: 目标 q 轴反向
//! - bit 2: 先交换 p、q
//!
//! 变换顺序为先交换、再按目标面尺寸反向。代码 0 为恒等映射。
//! 方向是连接的静态属性，变换不读取任何几何数据。
//!
//! # 示例
//!
//! ```
//! use bf_mesh::orientation::Orientation;
//!
//! let o = Orientation::from_code(1).unwrap();
//! assert_eq!(o.apply(0, 0, (4, 1)), (3, 0));
//! let back = o.inverse();
//! assert_eq!(back.apply(3, 0, (4, 1)), (0, 0));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// 面内轴的旋转/反射关系
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation {
    /// 交换 p、q
    pub swap: bool,
    /// 目标 p 反向
    pub flip_p: bool,
    /// 目标 q 反向
    pub flip_q: bool,
}

impl Orientation {
    /// 恒等方向
    pub const IDENTITY: Self = Self {
        swap: false,
        flip_p: false,
        flip_q: false,
    };

    /// 从代码构造，代码超出 0..7 返回 `None`
    pub fn from_code(code: u8) -> Option<Self> {
        if code > 7 {
            return None;
        }
        Some(Self {
            flip_p: code & 0b001 != 0,
            flip_q: code & 0b010 != 0,
            swap: code & 0b100 != 0,
        })
    }

    /// 代码形式
    pub fn code(self) -> u8 {
        (self.flip_p as u8) | (self.flip_q as u8) << 1 | (self.swap as u8) << 2
    }

    /// 全部 8 种方向
    pub fn all() -> impl Iterator<Item = Self> {
        (0u8..8).filter_map(Self::from_code)
    }

    /// 目标面所需的面内尺寸
    ///
    /// 源面尺寸为 `(np, nq)`，交换时目标面必须为 `(nq, np)`。
    pub fn target_extents(self, source: (usize, usize)) -> (usize, usize) {
        if self.swap {
            (source.1, source.0)
        } else {
            source
        }
    }

    /// 将源面坐标 `(p, q)` 映射到目标面坐标
    ///
    /// `target` 为目标面尺寸 `(np', nq')`。
    #[inline]
    pub fn apply(self, p: usize, q: usize, target: (usize, usize)) -> (usize, usize) {
        let (a, b) = if self.swap { (q, p) } else { (p, q) };
        let a = if self.flip_p {
            target.0.saturating_sub(1).saturating_sub(a)
        } else {
            a
        };
        let b = if self.flip_q {
            target.1.saturating_sub(1).saturating_sub(b)
        } else {
            b
        };
        (a, b)
    }

    /// 反向连接的方向
    ///
    /// 交换时反向操作的两个翻转位随之互换。
    pub fn inverse(self) -> Self {
        if self.swap {
            Self {
                swap: true,
                flip_p: self.flip_q,
                flip_q: self.flip_p,
            }
        } else {
            self
        }
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("方向代码 {} 超出范围 0..7", code))
    }
}

impl From<Orientation> for u8 {
    fn from(o: Orientation) -> u8 {
        o.code()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in 0u8..8 {
            assert_eq!(Orientation::from_code(code).unwrap().code(), code);
        }
        assert!(Orientation::from_code(8).is_none());
    }

    #[test]
    fn test_identity() {
        let o = Orientation::IDENTITY;
        assert_eq!(o.code(), 0);
        assert_eq!(o.apply(2, 1, (5, 3)), (2, 1));
    }

    #[test]
    fn test_inverse_round_trip_all_codes() {
        let source = (4usize, 3usize);
        for o in Orientation::all() {
            let target = o.target_extents(source);
            let inv = o.inverse();
            assert_eq!(inv.target_extents(target), source);
            for q in 0..source.1 {
                for p in 0..source.0 {
                    let (a, b) = o.apply(p, q, target);
                    assert!(a < target.0 && b < target.1);
                    assert_eq!(inv.apply(a, b, source), (p, q), "code {}", o.code());
                }
            }
        }
    }

    #[test]
    fn test_inverse_is_involution() {
        for o in Orientation::all() {
            assert_eq!(o.inverse().inverse(), o);
        }
    }

    #[test]
    fn test_serde_as_code() {
        let o = Orientation::from_code(5).unwrap();
        assert_eq!(serde_json::to_string(&o).unwrap(), "5");
        let back: Orientation = serde_json::from_str("5").unwrap();
        assert_eq!(back, o);
        assert!(serde_json::from_str::<Orientation>("9").is_err());
    }
}
