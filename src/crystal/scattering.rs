//! # 原子散射因子
//!
//! Cromer–Mann 参数化的原子散射因子，用于结构因子权重及其随
//! 衍射级次增大而衰减的行为。
//!
//! ## 公式
//! f(s) = Σᵢ aᵢ exp(-bᵢ s²) + c，其中 s = sin(θ)/λ = 1/(2d)
//!
//! ## 数据来源
//! International Tables for Crystallography, Vol. C, Table 6.1.1.4
//!
//! ## 依赖关系
//! - 被 `crystal/reflectors.rs` 和 `models/structure.rs` 调用
//! - 纯静态数据

use std::collections::HashMap;
use std::sync::LazyLock;

/// Cromer–Mann 参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringFactorParams {
    pub a: [f64; 4],
    pub b: [f64; 4],
    pub c: f64,
}

impl ScatteringFactorParams {
    const fn new(a: [f64; 4], b: [f64; 4], c: f64) -> Self {
        Self { a, b, c }
    }

    /// 计算 f(s)，截断为非负值
    pub fn evaluate(&self, s: f64) -> f64 {
        let s2 = s * s;
        let f = self
            .a
            .iter()
            .zip(self.b.iter())
            .fold(self.c, |acc, (a, b)| acc + a * (-b * s2).exp());
        f.max(0.0)
    }
}

/// EBSD 中常见元素的参数表
#[rustfmt::skip]
const TABLE: &[(&str, ScatteringFactorParams)] = &[
    ("C",  ScatteringFactorParams::new([2.3100, 1.0200, 1.5886, 0.8650], [20.8439, 10.2075, 0.5687, 51.6512], 0.2156)),
    ("Mg", ScatteringFactorParams::new([5.4204, 2.1735, 1.2269, 2.3073], [2.8275, 79.2611, 0.3808, 7.1937], 0.8584)),
    ("Al", ScatteringFactorParams::new([6.4202, 1.9002, 1.5936, 1.9646], [3.0387, 0.7426, 31.5472, 85.0886], 1.1151)),
    ("Si", ScatteringFactorParams::new([6.2915, 3.0353, 1.9891, 1.5410], [2.4386, 32.3337, 0.6785, 81.6937], 1.1407)),
    ("Ca", ScatteringFactorParams::new([8.6266, 7.3873, 1.5899, 1.0211], [10.4421, 0.6599, 85.7484, 178.437], 1.3751)),
    ("Ti", ScatteringFactorParams::new([9.7595, 7.3558, 1.6991, 1.9021], [7.8508, 0.5000, 35.6338, 116.105], 1.2807)),
    ("V",  ScatteringFactorParams::new([10.2971, 7.3511, 2.0703, 2.0571], [6.8657, 0.4385, 26.8938, 102.478], 1.2199)),
    ("Cr", ScatteringFactorParams::new([10.6406, 7.3537, 3.3240, 1.4922], [6.1038, 0.3920, 20.2626, 98.7399], 1.1832)),
    ("Mn", ScatteringFactorParams::new([11.2819, 7.3573, 3.0193, 2.2441], [5.3409, 0.3432, 17.8674, 83.7543], 1.0896)),
    ("Fe", ScatteringFactorParams::new([11.7695, 7.3573, 3.5222, 2.3045], [4.7611, 0.3072, 15.3535, 76.8805], 1.0369)),
    ("Co", ScatteringFactorParams::new([12.2841, 7.3409, 4.0034, 2.3488], [4.2791, 0.2784, 13.5359, 71.1692], 1.0118)),
    ("Ni", ScatteringFactorParams::new([12.8376, 7.2920, 4.4438, 2.3800], [3.8785, 0.2565, 12.1763, 66.3421], 1.0341)),
    ("Cu", ScatteringFactorParams::new([13.3380, 7.1676, 5.6158, 1.6735], [3.5828, 0.2470, 11.3966, 64.8126], 1.1910)),
    ("Zn", ScatteringFactorParams::new([14.0743, 7.0318, 5.1652, 2.4100], [3.2655, 0.2333, 10.3163, 58.7097], 1.3041)),
    ("Ge", ScatteringFactorParams::new([16.0816, 6.3747, 3.7068, 3.6830], [2.8509, 0.2516, 11.4468, 54.7625], 2.1313)),
    ("Zr", ScatteringFactorParams::new([17.8765, 10.9480, 5.4173, 3.6577], [1.2761, 11.9160, 0.1176, 87.6627], 2.0690)),
    ("Nb", ScatteringFactorParams::new([17.6142, 12.0144, 4.0418, 3.5334], [1.1886, 11.7660, 0.2047, 69.7957], 3.7553)),
    ("Mo", ScatteringFactorParams::new([3.7025, 17.2356, 12.8876, 3.7429], [0.2772, 1.0958, 11.0040, 61.6584], 4.3875)),
    ("Ag", ScatteringFactorParams::new([19.2808, 16.6885, 4.8045, 1.0463], [0.6446, 7.4726, 24.6605, 99.8156], 5.1790)),
    ("Au", ScatteringFactorParams::new([16.8819, 18.5913, 25.5582, 5.8600], [0.4611, 8.6216, 1.4826, 36.3956], 12.0658)),
    ("Pb", ScatteringFactorParams::new([31.0617, 13.0637, 18.4420, 5.9696], [0.6902, 2.3576, 8.6180, 47.2579], 13.4118)),
];

static SCATTERING_FACTORS: LazyLock<HashMap<&'static str, ScatteringFactorParams>> =
    LazyLock::new(|| TABLE.iter().copied().collect());

/// 获取元素的散射因子参数
///
/// 接受带编号的位点标签（如 "Fe1"），只取前面的字母部分。
pub fn get_scattering_factor(element: &str) -> Option<&'static ScatteringFactorParams> {
    let symbol: String = element
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    SCATTERING_FACTORS.get(symbol.as_str())
}

/// 支持的元素符号（按表中顺序）
pub fn supported_elements() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|(symbol, _)| *symbol)
}

/// 计算原子散射因子，未知元素返回 0
pub fn scattering_factor(element: &str, s: f64) -> f64 {
    get_scattering_factor(element).map_or(0.0, |params| params.evaluate(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_scattering_close_to_atomic_number() {
        for (symbol, z) in [("Si", 14.0), ("Fe", 26.0), ("Cu", 29.0)] {
            let f0 = scattering_factor(symbol, 0.0);
            assert!((f0 - z).abs() < 1.0, "{} f(0) = {}", symbol, f0);
        }
    }

    #[test]
    fn test_scattering_factor_decreases_with_s() {
        let params = get_scattering_factor("Si").unwrap();
        let mut previous = params.evaluate(0.0);
        for i in 1..=40 {
            let f = params.evaluate(i as f64 * 0.05);
            assert!(f <= previous);
            previous = f;
        }
    }

    #[test]
    fn test_site_labels_resolve_to_element() {
        assert!(get_scattering_factor("Fe1").is_some());
        assert!(get_scattering_factor("Xx").is_none());
        assert_eq!(scattering_factor("Xx", 0.1), 0.0);
    }

    #[test]
    fn test_supported_elements_listed() {
        assert!(supported_elements().any(|s| s == "Ni"));
    }
}
