//! # 晶体结构数据模型
//!
//! 立方晶系晶体结构：晶格族（FCC/BCC/简单立方）、晶格常数和基元原子。
//! 每个晶格族提供自己的消光规则和基元位置，供结构因子计算统一使用。
//!
//! ## 依赖关系
//! - 被 `crystal/reflectors.rs` 和 `simulation/` 使用
//! - 使用 `crystal/scattering.rs` 校验元素是否存在

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crystal::scattering;
use crate::error::{KikuchiError, Result};
use crate::models::MillerIndex;

/// 晶格族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatticeFamily {
    /// 面心立方
    Fcc,
    /// 体心立方
    Bcc,
    /// 简单立方
    SimpleCubic,
}

impl LatticeFamily {
    /// 消光规则：返回 true 表示该 (hkl) 可能衍射
    pub fn is_allowed(&self, hkl: &MillerIndex) -> bool {
        match self {
            // h, k, l 全奇或全偶（0 视为偶数）
            LatticeFamily::Fcc => {
                let parity = hkl.h.rem_euclid(2);
                hkl.k.rem_euclid(2) == parity && hkl.l.rem_euclid(2) == parity
            }
            LatticeFamily::Bcc => (hkl.h + hkl.k + hkl.l).rem_euclid(2) == 0,
            LatticeFamily::SimpleCubic => true,
        }
    }

    /// 惯用晶胞中的基元原子分数坐标
    pub fn basis(&self) -> Vec<[f64; 3]> {
        match self {
            LatticeFamily::Fcc => vec![
                [0.0, 0.0, 0.0],
                [0.5, 0.5, 0.0],
                [0.5, 0.0, 0.5],
                [0.0, 0.5, 0.5],
            ],
            LatticeFamily::Bcc => vec![[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
            LatticeFamily::SimpleCubic => vec![[0.0, 0.0, 0.0]],
        }
    }
}

impl fmt::Display for LatticeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeFamily::Fcc => write!(f, "fcc"),
            LatticeFamily::Bcc => write!(f, "bcc"),
            LatticeFamily::SimpleCubic => write!(f, "sc"),
        }
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 立方晶体结构（构造后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrystalStructure {
    /// 结构名称
    name: String,

    /// 晶格族
    family: LatticeFamily,

    /// 晶格常数 a（Å）
    lattice_parameter: f64,

    /// 基元原子
    atoms: Vec<Atom>,
}

impl CrystalStructure {
    /// 由晶格族、晶格常数和单一元素创建结构
    pub fn new(family: LatticeFamily, lattice_parameter: f64, element: &str) -> Result<Self> {
        if !(lattice_parameter.is_finite() && lattice_parameter > 0.0) {
            return Err(KikuchiError::config(
                "lattice_parameter",
                format!("must be > 0, got {}", lattice_parameter),
            ));
        }
        if scattering::get_scattering_factor(element).is_none() {
            return Err(KikuchiError::UnknownElement(element.to_string()));
        }

        let atoms = family
            .basis()
            .into_iter()
            .map(|position| Atom::new(element, position))
            .collect();

        Ok(Self {
            name: format!("{}-{}", element, family),
            family,
            lattice_parameter,
            atoms,
        })
    }

    /// 硅（按 FCC 点阵处理），a = 5.43 Å
    pub fn silicon_fcc() -> Self {
        Self::preset(LatticeFamily::Fcc, 5.43, "Si")
    }

    /// α-铁，a = 2.8665 Å
    pub fn iron_bcc() -> Self {
        Self::preset(LatticeFamily::Bcc, 2.8665, "Fe")
    }

    fn preset(family: LatticeFamily, lattice_parameter: f64, element: &str) -> Self {
        Self {
            name: format!("{}-{}", element, family),
            family,
            lattice_parameter,
            atoms: family
                .basis()
                .into_iter()
                .map(|position| Atom::new(element, position))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> LatticeFamily {
        self.family
    }

    pub fn lattice_parameter(&self) -> f64 {
        self.lattice_parameter
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// 晶面间距 d = a / sqrt(h² + k² + l²)
    pub fn d_spacing(&self, hkl: &MillerIndex) -> f64 {
        self.lattice_parameter / (hkl.norm_squared() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fcc_selection_rule() {
        let fcc = LatticeFamily::Fcc;
        assert!(!fcc.is_allowed(&MillerIndex::new(1, 0, 0)));
        assert!(!fcc.is_allowed(&MillerIndex::new(1, 1, 0)));
        assert!(fcc.is_allowed(&MillerIndex::new(1, 1, 1)));
        assert!(fcc.is_allowed(&MillerIndex::new(2, 0, 0)));
        assert!(fcc.is_allowed(&MillerIndex::new(-1, 1, -3)));
        assert!(fcc.is_allowed(&MillerIndex::new(0, -2, 2)));
    }

    #[test]
    fn test_bcc_selection_rule() {
        let bcc = LatticeFamily::Bcc;
        assert!(bcc.is_allowed(&MillerIndex::new(1, 1, 0)));
        assert!(bcc.is_allowed(&MillerIndex::new(2, 0, 0)));
        assert!(!bcc.is_allowed(&MillerIndex::new(1, 0, 0)));
        assert!(!bcc.is_allowed(&MillerIndex::new(1, 1, 1)));
    }

    #[test]
    fn test_d_spacing() {
        let si = CrystalStructure::silicon_fcc();
        let d = si.d_spacing(&MillerIndex::new(1, 1, 1));
        assert!((d - 5.43 / 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_structure() {
        assert!(CrystalStructure::new(LatticeFamily::Fcc, 0.0, "Si").is_err());
        assert!(CrystalStructure::new(LatticeFamily::Fcc, 3.6, "Xx").is_err());
        let cu = CrystalStructure::new(LatticeFamily::Fcc, 3.615, "Cu").unwrap();
        assert_eq!(cu.atoms().len(), 4);
        assert_eq!(cu.name(), "Cu-fcc");
    }
}
