//! # 衍射晶面族枚举
//!
//! 枚举给定晶体结构在最大 Miller 指数级次内的所有衍射晶面族。
//!
//! ## 算法概述
//! 1. 遍历 [-n, n]³ 内除 (0,0,0) 外的所有 (hkl)
//! 2. 应用晶格族的消光规则
//! 3. 按 |h|,|k|,|l| 降序排列得到族等价键并合并
//! 4. 计算晶面间距 d 与结构因子 |F|²，相对 |F(0)|² 归一化得到权重
//! 5. 按 h²+k²+l² 升序、族键字典序输出
//!
//! ## 依赖关系
//! - 被 `simulation/simulator.rs` 调用
//! - 使用 `models/structure.rs` 的 CrystalStructure
//! - 使用 `crystal/scattering.rs` 获取原子散射因子

use log::{debug, info};
use num_complex::Complex64;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use crate::crystal::scattering;
use crate::error::{KikuchiError, Result};
use crate::models::{CrystalStructure, MillerIndex};

/// 相对强度低于该值的晶面视为不衍射
const DIFFRACTION_THRESHOLD: f64 = 1e-14;

/// 允许的最大指数级次，候选数量按 (2n+1)³ 增长
pub const MAX_INDEX_ORDER_LIMIT: u32 = 16;

/// 衍射晶面族
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffractingPlane {
    /// 族代表指数（h ≥ k ≥ l ≥ 0）
    hkl: MillerIndex,
    /// 晶面间距（Å）
    d_spacing: f64,
    /// 相对强度权重 [0, 1]
    weight: f64,
    /// 族内成员晶面（正负号等价的只保留一个）
    members: Vec<MillerIndex>,
}

impl DiffractingPlane {
    /// 单个晶面（族内只有它自己），d > 0 且权重非负
    pub fn new(hkl: MillerIndex, d_spacing: f64, weight: f64) -> Result<Self> {
        if hkl.is_zero() {
            return Err(KikuchiError::InvalidArgument("(0 0 0) is not a plane".to_string()));
        }
        if !(d_spacing.is_finite() && d_spacing > 0.0) {
            return Err(KikuchiError::config("d_spacing", format!("must be > 0, got {}", d_spacing)));
        }
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(KikuchiError::config("weight", format!("must be >= 0, got {}", weight)));
        }
        Ok(Self {
            hkl,
            d_spacing,
            weight,
            members: vec![hkl],
        })
    }

    pub fn hkl(&self) -> MillerIndex {
        self.hkl
    }

    pub fn d_spacing(&self) -> f64 {
        self.d_spacing
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// 族内每一个物理上不同的晶面，顺序固定
    pub fn members(&self) -> &[MillerIndex] {
        &self.members
    }

    /// 族内不同 Kikuchi 带的数量
    pub fn multiplicity(&self) -> usize {
        self.members.len()
    }
}

/// 计算结构因子 F(hkl)
pub fn structure_factor(structure: &CrystalStructure, hkl: &MillerIndex) -> Complex64 {
    let s = 1.0 / (2.0 * structure.d_spacing(hkl));

    structure
        .atoms()
        .iter()
        .map(|atom| {
            let f = scattering::scattering_factor(&atom.element, s);
            let [x, y, z] = atom.position;
            let phase = 2.0 * PI * (hkl.h as f64 * x + hkl.k as f64 * y + hkl.l as f64 * z);
            Complex64::from_polar(f, phase)
        })
        .sum()
}

/// 前向散射 (s = 0) 时的最大衍射强度 |F(0)|²
pub fn maximum_intensity(structure: &CrystalStructure) -> f64 {
    let f0: f64 = structure
        .atoms()
        .iter()
        .map(|atom| scattering::scattering_factor(&atom.element, 0.0))
        .sum();
    f0 * f0
}

/// 枚举衍射晶面族
///
/// 结果顺序稳定：重复调用得到逐位相同的结果。
/// 级次超过 [`MAX_INDEX_ORDER_LIMIT`] 时返回配置错误。
pub fn enumerate_planes(
    structure: &CrystalStructure,
    max_index_order: u32,
) -> Result<Vec<DiffractingPlane>> {
    let n = i32::try_from(max_index_order)
        .ok()
        .filter(|_| max_index_order <= MAX_INDEX_ORDER_LIMIT)
        .ok_or_else(|| {
            KikuchiError::config(
                "max_index_order",
                format!("must be <= {}, got {}", MAX_INDEX_ORDER_LIMIT, max_index_order),
            )
        })?;
    let family = structure.family();

    // (h²+k²+l², 族键) -> 成员
    let mut families: BTreeMap<(i32, MillerIndex), BTreeSet<MillerIndex>> = BTreeMap::new();

    for h in -n..=n {
        for k in -n..=n {
            for l in -n..=n {
                let hkl = MillerIndex::new(h, k, l);
                if hkl.is_zero() || !family.is_allowed(&hkl) {
                    continue;
                }
                let key = hkl.family_key();
                families
                    .entry((key.norm_squared(), key))
                    .or_default()
                    .insert(hkl.canonical_sign());
            }
        }
    }

    let max_intensity = maximum_intensity(structure);

    let planes: Vec<DiffractingPlane> = families
        .into_iter()
        .filter_map(|((_, key), members)| {
            let intensity = structure_factor(structure, &key).norm_sqr();
            let weight = if max_intensity > 0.0 {
                intensity / max_intensity
            } else {
                0.0
            };

            if weight < DIFFRACTION_THRESHOLD {
                debug!("{} {} is extinct (|F|² = {:.3e})", structure.name(), key, intensity);
                return None;
            }

            Some(DiffractingPlane {
                hkl: key,
                d_spacing: structure.d_spacing(&key),
                weight,
                members: members.into_iter().collect(),
            })
        })
        .collect();

    info!(
        "{}: {} diffracting plane families up to order {}",
        structure.name(),
        planes.len(),
        max_index_order
    );

    Ok(planes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatticeFamily;

    fn keys(planes: &[DiffractingPlane]) -> Vec<(i32, i32, i32)> {
        planes
            .iter()
            .map(|p| (p.hkl().h, p.hkl().k, p.hkl().l))
            .collect()
    }

    #[test]
    fn test_fcc_families_order_two() {
        let planes = enumerate_planes(&CrystalStructure::silicon_fcc(), 2).unwrap();
        assert_eq!(keys(&planes), vec![(1, 1, 1), (2, 0, 0), (2, 2, 0), (2, 2, 2)]);

        let multiplicities: Vec<usize> = planes.iter().map(|p| p.multiplicity()).collect();
        assert_eq!(multiplicities, vec![4, 3, 6, 4]);
    }

    #[test]
    fn test_fcc_never_mixes_parity() {
        let planes = enumerate_planes(&CrystalStructure::silicon_fcc(), 4).unwrap();
        for plane in &planes {
            for m in plane.members() {
                assert!(LatticeFamily::Fcc.is_allowed(m), "{} should be extinct", m);
            }
        }
        assert!(!keys(&planes).contains(&(1, 0, 0)));
        assert!(keys(&planes).contains(&(1, 1, 1)));
        assert!(keys(&planes).contains(&(2, 0, 0)));
    }

    #[test]
    fn test_ordering_and_invariants() {
        let planes = enumerate_planes(&CrystalStructure::silicon_fcc(), 4).unwrap();
        for pair in planes.windows(2) {
            let (a, b) = (pair[0].hkl(), pair[1].hkl());
            assert!((a.norm_squared(), a) < (b.norm_squared(), b));
            assert!(pair[1].weight() <= pair[0].weight() + 1e-12);
        }
        for plane in &planes {
            assert!(plane.d_spacing() > 0.0);
            assert!(plane.weight() >= 0.0 && plane.weight() <= 1.0);
        }
        assert_eq!(planes.first().map(|p| p.hkl()), Some(MillerIndex::new(1, 1, 1)));
        assert_eq!(planes.last().map(|p| p.hkl()), Some(MillerIndex::new(4, 4, 4)));
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let si = CrystalStructure::silicon_fcc();
        assert_eq!(enumerate_planes(&si, 4).unwrap(), enumerate_planes(&si, 4).unwrap());
    }

    #[test]
    fn test_zero_order_is_empty() {
        assert!(enumerate_planes(&CrystalStructure::silicon_fcc(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_order_above_limit_is_rejected() {
        let si = CrystalStructure::silicon_fcc();
        for order in [MAX_INDEX_ORDER_LIMIT + 1, i32::MAX as u32 + 1, u32::MAX] {
            assert!(matches!(
                enumerate_planes(&si, order),
                Err(KikuchiError::InvalidConfiguration { .. })
            ));
        }
        assert!(enumerate_planes(&CrystalStructure::iron_bcc(), MAX_INDEX_ORDER_LIMIT).is_ok());
    }

    #[test]
    fn test_fcc_structure_factor() {
        let si = CrystalStructure::silicon_fcc();
        let f = structure_factor(&si, &MillerIndex::new(1, 0, 0));
        assert!(f.norm() < 1e-9);

        let s = 1.0 / (2.0 * si.d_spacing(&MillerIndex::new(1, 1, 1)));
        let f111 = structure_factor(&si, &MillerIndex::new(1, 1, 1));
        let expected = 4.0 * scattering::scattering_factor("Si", s);
        assert!((f111.norm() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_plane_validation() {
        let plane = DiffractingPlane::new(MillerIndex::new(1, 1, 1), 3.1, 1.0).unwrap();
        assert_eq!(plane.members(), &[MillerIndex::new(1, 1, 1)]);
        assert!(DiffractingPlane::new(MillerIndex::new(0, 0, 0), 3.1, 1.0).is_err());
        assert!(DiffractingPlane::new(MillerIndex::new(1, 0, 0), 0.0, 1.0).is_err());
        assert!(DiffractingPlane::new(MillerIndex::new(1, 0, 0), 1.0, -0.5).is_err());
    }

    #[test]
    fn test_bcc_families() {
        let planes = enumerate_planes(&CrystalStructure::iron_bcc(), 2).unwrap();
        assert_eq!(keys(&planes), vec![(1, 1, 0), (2, 0, 0), (2, 1, 1), (2, 2, 0), (2, 2, 2)]);
    }
}
