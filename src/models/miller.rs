//! # Miller 指数
//!
//! 晶面 (hkl) 的整数三元组表示，以及族（family）等价键。
//!
//! ## 依赖关系
//! - 被 `crystal/reflectors.rs` 和 `projection/` 使用
//! - 使用 `nalgebra` 表示晶面法向量

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 晶面 Miller 指数 (h, k, l)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl MillerIndex {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Self { h, k, l }
    }

    /// h² + k² + l²
    pub fn norm_squared(&self) -> i32 {
        self.h * self.h + self.k * self.k + self.l * self.l
    }

    pub fn is_zero(&self) -> bool {
        self.h == 0 && self.k == 0 && self.l == 0
    }

    /// 族等价键：|h|, |k|, |l| 降序排列
    pub fn family_key(&self) -> MillerIndex {
        let mut abs = [self.h.abs(), self.k.abs(), self.l.abs()];
        abs.sort_unstable_by(|a, b| b.cmp(a));
        MillerIndex::new(abs[0], abs[1], abs[2])
    }

    /// 符号规范化：(hkl) 与 (-h-k-l) 是同一条 Kikuchi 带，
    /// 取第一个非零分量为正的那一个
    pub fn canonical_sign(&self) -> MillerIndex {
        let first = [self.h, self.k, self.l]
            .into_iter()
            .find(|&v| v != 0)
            .unwrap_or(0);
        if first < 0 {
            MillerIndex::new(-self.h, -self.k, -self.l)
        } else {
            *self
        }
    }

    /// 晶体坐标系中的单位法向量（立方晶系下即归一化的 hkl）
    pub fn unit_normal(&self) -> Vector3<f64> {
        Vector3::new(self.h as f64, self.k as f64, self.l as f64).normalize()
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.h, self.k, self.l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_key_sorts_absolute_values() {
        assert_eq!(
            MillerIndex::new(-1, 2, 0).family_key(),
            MillerIndex::new(2, 1, 0)
        );
        assert_eq!(
            MillerIndex::new(1, -1, 1).family_key(),
            MillerIndex::new(1, 1, 1)
        );
    }

    #[test]
    fn test_canonical_sign() {
        assert_eq!(
            MillerIndex::new(0, -2, 2).canonical_sign(),
            MillerIndex::new(0, 2, -2)
        );
        assert_eq!(
            MillerIndex::new(1, -1, -1).canonical_sign(),
            MillerIndex::new(1, -1, -1)
        );
    }

    #[test]
    fn test_unit_normal_is_normalized() {
        let n = MillerIndex::new(1, 1, 1).unit_normal();
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!((n.x - 1.0 / 3f64.sqrt()).abs() < 1e-12);
    }
}
