//! # 电子波长与 Bragg 角
//!
//! λ = h / sqrt(2 m₀ e E (1 + e E / (2 m₀ c²)))，E 为加速电压（V），
//! 结果单位 Å。
//!
//! ## 依赖关系
//! - 被 `projection/projector.rs` 调用

/// Planck 常数 (J·s)
const PLANCK: f64 = 6.626_070_15e-34;
/// 电子静止质量 (kg)
const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;
/// 元电荷 (C)
const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// 光速 (m/s)
const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// 相对论校正的电子波长（Å），能量单位 keV
pub fn electron_wavelength(energy_kev: f64) -> f64 {
    let volts = energy_kev * 1e3;
    let momentum_sq = 2.0 * ELECTRON_MASS * ELEMENTARY_CHARGE * volts;
    let correction =
        1.0 + ELEMENTARY_CHARGE * volts / (2.0 * ELECTRON_MASS * SPEED_OF_LIGHT * SPEED_OF_LIGHT);
    PLANCK / (momentum_sq * correction).sqrt() * 1e10
}

/// Bragg 角 θ_B（弧度）：sin θ_B = λ / (2d)
///
/// λ/(2d) > 1 时该晶面在此能量下不衍射，返回 `None`。
pub fn bragg_angle(d_spacing: f64, wavelength: f64) -> Option<f64> {
    if d_spacing <= 0.0 {
        return None;
    }
    let sin_theta = wavelength / (2.0 * d_spacing);
    if sin_theta > 1.0 {
        None
    } else {
        Some(sin_theta.asin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wavelength_at_20_kev() {
        // 20 kV 电子的相对论波长约 0.0859 Å
        assert_relative_eq!(electron_wavelength(20.0), 0.08588, epsilon = 1e-4);
    }

    #[test]
    fn test_wavelength_decreases_with_energy() {
        let energies = [1.0, 5.0, 20.0, 200.0, 20000.0];
        for pair in energies.windows(2) {
            assert!(electron_wavelength(pair[1]) < electron_wavelength(pair[0]));
        }
    }

    #[test]
    fn test_bragg_angle() {
        let theta = bragg_angle(2.0, 1.0).unwrap();
        assert_relative_eq!(theta.sin(), 0.25, epsilon = 1e-12);
        assert!(bragg_angle(0.4, 1.0).is_none());
        assert!(bragg_angle(0.5, 1.0).is_some());
    }
}
