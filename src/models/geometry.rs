//! # 探测器几何
//!
//! 描述样品、电子束与荧光屏（探测器）之间的几何关系。
//!
//! ## 坐标系
//! - 探测器坐标系：原点为样品上的电子束入射点，z 轴垂直于荧光屏并指向屏幕，
//!   屏幕位于 z = L（`detector_distance`，mm）。x 轴对应像素列方向，
//!   y 轴向上（像素行号向下增大）。
//! - 样品先绕 x 轴倾转 `-tilt`，探测器再依次绕 z 轴旋转 `azimuth`、
//!   绕 x 轴旋转 `elevation`。
//!
//! ## 依赖关系
//! - 被 `projection/` 与 `simulation/` 使用
//! - 使用 `nalgebra` 的 `Rotation3`

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{KikuchiError, Result};

/// 物理像素尺寸默认值（mm），即 6.25 µm
pub const DEFAULT_PIXEL_SIZE: f64 = 0.00625;

/// 探测器几何配置（构造时校验，之后不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorGeometry {
    /// 图像宽度（像素）
    width: usize,
    /// 图像高度（像素）
    height: usize,
    /// 合并像素因子（≥ 1）
    binning: u32,
    /// 样品到探测器距离（mm）
    detector_distance: f64,
    /// 样品倾转角（弧度）
    tilt: f64,
    /// 电子束能量（keV）
    beam_energy_kev: f64,
    /// 探测器绕法线的旋转角（弧度）
    azimuth: f64,
    /// 探测器俯仰角（弧度）
    elevation: f64,
    /// 物理像素尺寸（mm，合并前）
    pixel_size: f64,
    /// 花样中心偏移（宽度的分数，向右为正）
    pattern_center_x: f64,
    /// 花样中心偏移（高度的分数，向上为正）
    pattern_center_y: f64,
}

impl DetectorGeometry {
    /// 创建探测器几何，参数非法时返回配置错误
    pub fn new(
        width: usize,
        height: usize,
        binning: u32,
        detector_distance: f64,
        tilt: f64,
        beam_energy_kev: f64,
    ) -> Result<Self> {
        let geometry = Self {
            width,
            height,
            binning,
            detector_distance,
            tilt,
            beam_energy_kev,
            azimuth: 0.0,
            elevation: 0.0,
            pixel_size: DEFAULT_PIXEL_SIZE,
            pattern_center_x: 0.0,
            pattern_center_y: 0.0,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// 设置与取向无关的两个探测器角度
    pub fn with_detector_angles(mut self, azimuth: f64, elevation: f64) -> Result<Self> {
        self.azimuth = azimuth;
        self.elevation = elevation;
        self.validate()?;
        Ok(self)
    }

    /// 设置物理像素尺寸（mm）
    pub fn with_pixel_size(mut self, pixel_size: f64) -> Result<Self> {
        self.pixel_size = pixel_size;
        self.validate()?;
        Ok(self)
    }

    /// 设置花样中心偏移（宽度/高度的分数，(0, 0) 为居中）
    pub fn with_pattern_center(mut self, x: f64, y: f64) -> Result<Self> {
        self.pattern_center_x = x;
        self.pattern_center_y = y;
        self.validate()?;
        Ok(self)
    }

    /// 校验全部字段（反序列化得到的配置也需要调用）
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(KikuchiError::config("width", "must be > 0"));
        }
        if self.height == 0 {
            return Err(KikuchiError::config("height", "must be > 0"));
        }
        if self.binning < 1 {
            return Err(KikuchiError::config("binning", "must be >= 1, got 0"));
        }
        positive("detector_distance", self.detector_distance)?;
        positive("beam_energy_kev", self.beam_energy_kev)?;
        positive("pixel_size", self.pixel_size)?;
        finite("tilt", self.tilt)?;
        finite("azimuth", self.azimuth)?;
        finite("elevation", self.elevation)?;
        finite("pattern_center_x", self.pattern_center_x)?;
        finite("pattern_center_y", self.pattern_center_y)?;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn binning(&self) -> u32 {
        self.binning
    }

    pub fn detector_distance(&self) -> f64 {
        self.detector_distance
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn beam_energy_kev(&self) -> f64 {
        self.beam_energy_kev
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// 有效像素间距（mm）= 物理像素尺寸 × binning
    pub fn pixel_pitch(&self) -> f64 {
        self.pixel_size * self.binning as f64
    }

    /// 花样中心的像素坐标（列, 行），以像素左上角为原点
    pub fn pattern_center_px(&self) -> (f64, f64) {
        let w = self.width as f64;
        let h = self.height as f64;
        (
            w / 2.0 + self.pattern_center_x * w,
            h / 2.0 - self.pattern_center_y * h,
        )
    }

    /// 样品坐标系 → 探测器坐标系
    pub fn sample_to_detector(&self) -> Rotation3<f64> {
        let sample_tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), -self.tilt);
        let detector = Rotation3::from_axis_angle(&Vector3::z_axis(), self.azimuth)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.elevation);
        detector.inverse() * sample_tilt
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KikuchiError::config(field, format!("must be > 0, got {}", value)))
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(KikuchiError::config(field, format!("must be finite, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> DetectorGeometry {
        DetectorGeometry::new(335, 255, 32, 70.0, 0.3, 20000.0).unwrap()
    }

    #[test]
    fn test_valid_geometry() {
        let g = reference();
        assert_eq!(g.width(), 335);
        assert_eq!(g.height(), 255);
        assert_relative_eq!(g.pixel_pitch(), 0.2);
    }

    #[test]
    fn test_invalid_fields_fail_fast() {
        assert!(DetectorGeometry::new(0, 255, 32, 70.0, 0.3, 20.0).is_err());
        assert!(DetectorGeometry::new(335, 0, 32, 70.0, 0.3, 20.0).is_err());
        assert!(DetectorGeometry::new(335, 255, 0, 70.0, 0.3, 20.0).is_err());
        assert!(DetectorGeometry::new(335, 255, 1, 0.0, 0.3, 20.0).is_err());
        assert!(DetectorGeometry::new(335, 255, 1, 70.0, 0.3, -1.0).is_err());
        assert!(DetectorGeometry::new(335, 255, 1, 70.0, f64::NAN, 20.0).is_err());
        assert!(reference().with_pixel_size(0.0).is_err());
    }

    #[test]
    fn test_pattern_center_offset() {
        let g = DetectorGeometry::new(100, 80, 1, 10.0, 0.0, 20.0)
            .unwrap()
            .with_pattern_center(0.1, 0.25)
            .unwrap();
        let (cx, cy) = g.pattern_center_px();
        assert_relative_eq!(cx, 60.0);
        assert_relative_eq!(cy, 20.0);
    }

    #[test]
    fn test_untilted_frame_is_identity() {
        let g = DetectorGeometry::new(10, 10, 1, 10.0, 0.0, 20.0).unwrap();
        let v = g.sample_to_detector() * Vector3::new(0.2, -0.4, 0.9);
        assert_relative_eq!(v, Vector3::new(0.2, -0.4, 0.9), epsilon = 1e-12);
    }

    #[test]
    fn test_binning_scales_pitch() {
        let a = DetectorGeometry::new(10, 10, 1, 10.0, 0.0, 20.0).unwrap();
        let b = DetectorGeometry::new(10, 10, 4, 10.0, 0.0, 20.0).unwrap();
        assert_relative_eq!(b.pixel_pitch(), 4.0 * a.pixel_pitch());
    }
}
