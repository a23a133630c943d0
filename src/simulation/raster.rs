//! # 带光栅化
//!
//! 将 Kikuchi 带绘制到强度网格上。每个像素中心到带中心线的有符号距离为 s，
//! 所在一侧的半宽为 h，t = |s|/h；t ≥ 1 时带不覆盖该像素。
//!
//! ## 带样式
//! - 截面轮廓 `BandProfile`：均匀填充、线性衰减 1 − t、或 σ = h/5 的高斯
//!   （即带总宽的 1/10）
//! - 灰度映射 `IntensityScale`：把归一化强度映射到 [intensity_min, intensity_max]，
//!   可选线性、ln、log10
//! - 合成方式：未设背景时各带按轮廓 × 灰度叠加，之后由调用方 min/max 拉伸；
//!   设定背景灰度时从弱到强依次覆盖，结果按绝对刻度量化
//!
//! 按行并行（rayon）；同一像素内按固定的带顺序合成，因此结果与线程数无关。
//!
//! ## 依赖关系
//! - 被 `simulation/simulator.rs` 调用
//! - 使用 `projection/` 的 Band

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

use crate::error::{KikuchiError, Result};
use crate::projection::Band;
use crate::simulation::pattern::IntensityGrid;

/// 像素半宽下限，保证窄于一个像素的带仍能画出中心线
pub const MIN_HALF_WIDTH: f64 = 1.0;

/// 高斯轮廓的标准差（相对半宽）
const GAUSSIAN_SIGMA: f64 = 0.2;

/// 覆盖绘制时的默认背景灰度
pub const DEFAULT_BACKGROUND: u8 = 128;

/// 带截面轮廓
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandProfile {
    /// 带内均匀
    Flat,
    #[default]
    Linear,
    Gaussian,
}

impl BandProfile {
    /// 归一化距离 t ∈ [0, 1) 处的相对覆盖度
    pub fn shape(self, t: f64) -> f64 {
        match self {
            BandProfile::Flat => 1.0,
            BandProfile::Linear => 1.0 - t,
            BandProfile::Gaussian => (-0.5 * (t / GAUSSIAN_SIGMA).powi(2)).exp(),
        }
    }
}

/// 归一化强度到带灰度的映射
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityScale {
    #[default]
    Linear,
    Log,
    Log10,
}

impl IntensityScale {
    /// 将 [0, 1] 内的强度映射到 [min, max]（0-255 灰度），返回 [0, 1] 刻度的值
    ///
    /// 两种对数映射都经过 (0, min) 与 (1, max)，对小强度的带给出更高的灰度。
    pub fn band_level(self, normalized: f64, intensity_min: u8, intensity_max: u8) -> f64 {
        let lo = f64::from(intensity_min) / 255.0;
        let hi = f64::from(intensity_max) / 255.0;
        let x = normalized.clamp(0.0, 1.0);
        let f = match self {
            IntensityScale::Linear => x,
            IntensityScale::Log => (x + 1.0).ln() / LN_2,
            IntensityScale::Log10 => (x + 1.0).log10() / 2f64.log10(),
        };
        f * (hi - lo) + lo
    }
}

/// 带的绘制样式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStyle {
    #[serde(default)]
    pub profile: BandProfile,
    #[serde(default)]
    pub scale: IntensityScale,
    /// 为假时所有带使用同一强度 1
    #[serde(default = "default_weight_by_intensity")]
    pub weight_by_intensity: bool,
    #[serde(default)]
    pub intensity_min: u8,
    #[serde(default = "default_intensity_max")]
    pub intensity_max: u8,
    /// 背景灰度；设定后按覆盖方式绘制并输出绝对灰度
    #[serde(default)]
    pub background: Option<u8>,
}

fn default_weight_by_intensity() -> bool {
    true
}

fn default_intensity_max() -> u8 {
    u8::MAX
}

impl Default for BandStyle {
    fn default() -> Self {
        Self {
            profile: BandProfile::default(),
            scale: IntensityScale::default(),
            weight_by_intensity: true,
            intensity_min: 0,
            intensity_max: u8::MAX,
            background: None,
        }
    }
}

impl BandStyle {
    pub fn with_profile(mut self, profile: BandProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_scale(mut self, scale: IntensityScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_weight_by_intensity(mut self, enabled: bool) -> Self {
        self.weight_by_intensity = enabled;
        self
    }

    pub fn with_intensity_range(mut self, min: u8, max: u8) -> Self {
        self.intensity_min = min;
        self.intensity_max = max;
        self
    }

    pub fn with_background(mut self, background: Option<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.intensity_min > self.intensity_max {
            return Err(KikuchiError::config(
                "intensity_min",
                format!(
                    "must be <= intensity_max ({}), got {}",
                    self.intensity_max, self.intensity_min
                ),
            ));
        }
        Ok(())
    }

    /// 带的灰度（[0, 1] 刻度）
    pub fn level(&self, band: &Band) -> f64 {
        let normalized = if self.weight_by_intensity {
            band.weight()
        } else {
            1.0
        };
        self.scale
            .band_level(normalized, self.intensity_min, self.intensity_max)
    }
}

/// 单条带在像素中心 (x, y) 处的覆盖度 [0, 1]
///
/// `max_half_width` 用于截断无穷远一侧的半宽（通常取图像对角线长度）。
pub fn band_profile(band: &Band, x: f64, y: f64, max_half_width: f64, profile: BandProfile) -> f64 {
    let s = band.signed_distance(x, y);
    let h = band
        .half_width_towards(s)
        .clamp(MIN_HALF_WIDTH, max_half_width.max(MIN_HALF_WIDTH));
    let t = s.abs() / h;
    if t < 1.0 {
        profile.shape(t)
    } else {
        0.0
    }
}

/// 绘制全部带，`bands` 按强度从强到弱排列
pub fn rasterize(bands: &[Band], width: usize, height: usize, style: &BandStyle) -> IntensityGrid {
    let mut grid = IntensityGrid::new(width, height);
    if width == 0 {
        return grid;
    }

    let levels: Vec<f64> = bands.iter().map(|band| style.level(band)).collect();
    let background = style.background.map(|b| f64::from(b) / 255.0);
    let diagonal = (width as f64).hypot(height as f64);

    grid.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, line)| {
            let y = row as f64 + 0.5;
            for (col, value) in line.iter_mut().enumerate() {
                let x = col as f64 + 0.5;
                let coverage = |(band, &level): (&Band, &f64)| {
                    (band_profile(band, x, y, diagonal, style.profile), level)
                };
                *value = match background {
                    None => bands
                        .iter()
                        .zip(&levels)
                        .map(coverage)
                        .map(|(p, level)| p * level)
                        .sum(),
                    // 最强的带最后绘制
                    Some(bg) => bands
                        .iter()
                        .zip(&levels)
                        .rev()
                        .map(coverage)
                        .fold(bg, |v, (p, level)| v * (1.0 - p) + level * p),
                };
            }
        });
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crystal::DiffractingPlane;
    use crate::models::{DetectorGeometry, MillerIndex, Orientation};
    use crate::projection::project_band;
    use approx::assert_relative_eq;

    fn vertical_band_weighted(binning: u32, weight: f64) -> (Band, DetectorGeometry) {
        let geometry = DetectorGeometry::new(64, 32, binning, 20.0, 0.0, 20.0).unwrap();
        let plane = DiffractingPlane::new(MillerIndex::new(1, 0, 0), 2.0, weight).unwrap();
        let band = project_band(&plane, &Orientation::default(), &geometry).unwrap();
        (band, geometry)
    }

    fn vertical_band(binning: u32) -> (Band, DetectorGeometry) {
        vertical_band_weighted(binning, 1.0)
    }

    #[test]
    fn test_profile_peaks_on_center_line() {
        let (band, g) = vertical_band(1);
        let (cx, _) = g.pattern_center_px();
        let linear = BandProfile::Linear;
        assert_relative_eq!(band_profile(&band, cx, 3.0, 100.0, linear), 1.0, epsilon = 1e-9);

        let h = band.near_half_width();
        assert_relative_eq!(
            band_profile(&band, cx + h / 2.0, 3.0, 100.0, linear),
            0.5,
            epsilon = 1e-9
        );
        assert_eq!(band_profile(&band, cx + h + 0.1, 3.0, 100.0, linear), 0.0);
    }

    #[test]
    fn test_profile_shapes() {
        let (band, g) = vertical_band(1);
        let (cx, _) = g.pattern_center_px();
        let h = band.near_half_width();
        let at = |t: f64, profile| band_profile(&band, cx + t * h, 3.0, 100.0, profile);

        assert_eq!(at(0.0, BandProfile::Flat), 1.0);
        assert_eq!(at(0.9, BandProfile::Flat), 1.0);
        assert_eq!(at(1.01, BandProfile::Flat), 0.0);

        // σ = h/5：一个 σ 处为 e^(-1/2)
        assert_relative_eq!(at(0.0, BandProfile::Gaussian), 1.0, epsilon = 1e-9);
        assert_relative_eq!(at(0.2, BandProfile::Gaussian), (-0.5f64).exp(), epsilon = 1e-9);
        assert!(at(0.6, BandProfile::Gaussian) < at(0.6, BandProfile::Linear));
        assert_eq!(at(1.01, BandProfile::Gaussian), 0.0);
    }

    #[test]
    fn test_narrow_band_still_draws() {
        // 高合并因子下带宽远小于一个像素
        let (band, g) = vertical_band(256);
        assert!(band.pixel_width() < 1.0);
        let (cx, _) = g.pattern_center_px();
        assert_relative_eq!(
            band_profile(&band, cx + 0.5, 0.5, 100.0, BandProfile::Linear),
            0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_intensity_scales() {
        assert_relative_eq!(IntensityScale::Linear.band_level(0.25, 0, 255), 0.25);
        assert_relative_eq!(IntensityScale::Linear.band_level(0.5, 51, 255), 0.6, epsilon = 1e-12);

        for scale in [IntensityScale::Linear, IntensityScale::Log, IntensityScale::Log10] {
            assert_relative_eq!(scale.band_level(0.0, 51, 204), 0.2, epsilon = 1e-12);
            assert_relative_eq!(scale.band_level(1.0, 51, 204), 0.8, epsilon = 1e-12);
        }

        let log = IntensityScale::Log.band_level(0.25, 0, 255);
        assert_relative_eq!(log, 1.25f64.ln() / 2f64.ln(), epsilon = 1e-12);
        assert!(log > IntensityScale::Linear.band_level(0.25, 0, 255));
        // ln 与 log10 的比值形式给出相同的曲线
        assert_relative_eq!(log, IntensityScale::Log10.band_level(0.25, 0, 255), epsilon = 1e-12);
    }

    #[test]
    fn test_style_level_and_validation() {
        let (band, _) = vertical_band_weighted(1, 0.25);
        assert_relative_eq!(BandStyle::default().level(&band), 0.25);
        let uniform = BandStyle::default().with_weight_by_intensity(false);
        assert_relative_eq!(uniform.level(&band), 1.0);

        assert!(BandStyle::default().validate().is_ok());
        let inverted = BandStyle::default().with_intensity_range(200, 100);
        assert!(matches!(
            inverted.validate(),
            Err(KikuchiError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rasterize_is_symmetric_about_vertical_band() {
        let (band, g) = vertical_band(1);
        let grid = rasterize(&[band], g.width(), g.height(), &BandStyle::default());
        for y in 0..g.height() {
            for x in 0..g.width() / 2 {
                let mirrored = g.width() - 1 - x;
                assert_relative_eq!(
                    grid.get(x, y).unwrap(),
                    grid.get(mirrored, y).unwrap(),
                    epsilon = 1e-9
                );
            }
        }
        assert!(grid.get(g.width() / 2, 0).unwrap() > grid.get(0, 0).unwrap());
    }

    #[test]
    fn test_weighted_bands_add_up() {
        let (band, g) = vertical_band_weighted(1, 0.4);
        let col = g.width() / 2;
        let one = rasterize(&[band.clone()], g.width(), g.height(), &BandStyle::default());
        let two = rasterize(&[band.clone(), band], g.width(), g.height(), &BandStyle::default());
        assert_relative_eq!(two.get(col, 5).unwrap(), 2.0 * one.get(col, 5).unwrap());
        assert!(one.get(col, 5).unwrap() <= 0.4 + 1e-12);
    }

    #[test]
    fn test_overlay_on_background() {
        let (strong, g) = vertical_band_weighted(8, 1.0);
        let (weak, _) = vertical_band_weighted(8, 0.25);
        let style = BandStyle::default()
            .with_profile(BandProfile::Flat)
            .with_background(Some(DEFAULT_BACKGROUND));
        let col = g.width() / 2;

        let grid = rasterize(&[strong.clone(), weak.clone()], g.width(), g.height(), &style);
        // 背景保持绝对灰度，最强的带覆盖在最上层
        assert_relative_eq!(grid.get(0, 0).unwrap(), 128.0 / 255.0);
        assert_relative_eq!(grid.get(col, 5).unwrap(), 1.0);
        let pattern = grid.quantize();
        assert_eq!(pattern.get(0, 0), Some(128));
        assert_eq!(pattern.get(col, 5), Some(255));

        let grid = rasterize(&[weak], g.width(), g.height(), &style);
        assert_relative_eq!(grid.get(col, 5).unwrap(), 0.25);
    }

    #[test]
    fn test_overlay_gaussian_blends_into_background() {
        let (band, g) = vertical_band(8);
        let style = BandStyle::default()
            .with_profile(BandProfile::Gaussian)
            .with_background(Some(0));
        let grid = rasterize(&[band.clone()], g.width(), g.height(), &style);
        let (cx, _) = g.pattern_center_px();
        let edge_col = (cx + 0.6 * band.near_half_width()).floor() as usize;
        let edge = grid.get(edge_col, 3).unwrap();
        assert!(edge > 0.0 && edge < grid.get(g.width() / 2, 3).unwrap());
    }

    #[test]
    fn test_no_bands_gives_zero_grid() {
        let grid = rasterize(&[], 8, 4, &BandStyle::default());
        assert_eq!(grid.min_max(), (0.0, 0.0));

        let style = BandStyle::default().with_background(Some(64));
        let grid = rasterize(&[], 8, 4, &style);
        assert_relative_eq!(grid.min_max().0, 64.0 / 255.0);
        assert_relative_eq!(grid.min_max().1, 64.0 / 255.0);
    }
}
