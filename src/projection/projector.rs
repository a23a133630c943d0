//! # Kikuchi 带投影
//!
//! 将晶面法向量旋转到探测器坐标系，并以电子束入射点为投影中心做
//! gnomonic 投影，得到荧光屏上的带中心线与两侧半宽。
//!
//! ## 算法概述
//! 1. 晶体坐标系法向量 n = (h, k, l) / |hkl|
//! 2. n' = S · gᵀ · n（gᵀ 由 Bunge 欧拉角给出，S 为样品倾转与探测器旋转）
//! 3. 由束流能量计算电子波长 λ，sin θ_B = λ / (2d)，不满足时跳过
//! 4. 中心线：n'x·x + n'y·y + n'z·L = 0（mm，花样中心为原点）
//! 5. 在包含 n' 与屏幕法线的截面内，中心线位于与花样中心夹角 φ 处，
//!    两侧边缘分别位于 φ ± θ_B
//!
//! ## 依赖关系
//! - 被 `simulation/simulator.rs` 调用
//! - 使用 `models/` 的 Orientation、DetectorGeometry
//! - 使用 `projection/wavelength.rs`

use log::trace;
use nalgebra::{Rotation3, Vector3};
use std::f64::consts::FRAC_PI_2;

use crate::crystal::DiffractingPlane;
use crate::models::{DetectorGeometry, MillerIndex, Orientation};
use crate::projection::wavelength::{bragg_angle, electron_wavelength};

/// 法向量在屏幕平面内的分量小于该值时，中心线位于无穷远
const PARALLEL_TOLERANCE: f64 = 1e-9;

/// 探测器上的一条 Kikuchi 带
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    hkl: MillerIndex,
    /// 探测器坐标系中的单位法向量
    normal: Vector3<f64>,
    /// 像素坐标中心线 a·x + b·y + c = 0，a² + b² = 1
    line: [f64; 3],
    bragg_angle: f64,
    /// 朝向花样中心一侧的像素半宽
    near_half_width: f64,
    /// 远离花样中心一侧的像素半宽（可能为 +∞）
    far_half_width: f64,
    /// 花样中心所在一侧的符号（+1、-1，中心线穿过花样中心时为 0）
    center_side: f64,
    weight: f64,
}

impl Band {
    pub fn hkl(&self) -> MillerIndex {
        self.hkl
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// 中心线系数 (a, b, c)
    pub fn line(&self) -> [f64; 3] {
        self.line
    }

    /// 角半宽，即 Bragg 角（弧度）
    pub fn half_width(&self) -> f64 {
        self.bragg_angle
    }

    pub fn near_half_width(&self) -> f64 {
        self.near_half_width
    }

    pub fn far_half_width(&self) -> f64 {
        self.far_half_width
    }

    /// 带在像素单位下的总宽度
    pub fn pixel_width(&self) -> f64 {
        self.near_half_width + self.far_half_width
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// 像素 (x, y) 到中心线的有符号距离（像素）
    pub fn signed_distance(&self, x: f64, y: f64) -> f64 {
        let [a, b, c] = self.line;
        a * x + b * y + c
    }

    /// 有符号距离 s 所在一侧的像素半宽
    pub fn half_width_towards(&self, s: f64) -> f64 {
        if s * self.center_side >= 0.0 {
            self.near_half_width
        } else {
            self.far_half_width
        }
    }
}

/// 带投影器：对给定探测器几何预先计算波长和坐标变换
#[derive(Debug, Clone)]
pub struct PatternProjector {
    sample_to_detector: Rotation3<f64>,
    wavelength: f64,
    distance: f64,
    pitch: f64,
    center: (f64, f64),
    obliquity_attenuation: bool,
}

impl PatternProjector {
    pub fn new(geometry: &DetectorGeometry) -> Self {
        Self {
            sample_to_detector: geometry.sample_to_detector(),
            wavelength: electron_wavelength(geometry.beam_energy_kev()),
            distance: geometry.detector_distance(),
            pitch: geometry.pixel_pitch(),
            center: geometry.pattern_center_px(),
            obliquity_attenuation: false,
        }
    }

    /// 启用后带权重乘以 cos φ（投影倾斜度）
    pub fn with_obliquity_attenuation(mut self, enabled: bool) -> Self {
        self.obliquity_attenuation = enabled;
        self
    }

    /// 电子波长（Å）
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// 晶体坐标系 → 探测器坐标系
    pub fn crystal_to_detector(&self, orientation: &Orientation) -> Rotation3<f64> {
        self.sample_to_detector * orientation.crystal_to_sample()
    }

    /// 投影晶面族的代表晶面
    pub fn project(&self, plane: &DiffractingPlane, orientation: &Orientation) -> Option<Band> {
        let rotation = self.crystal_to_detector(orientation);
        self.project_indices(plane.hkl(), plane.d_spacing(), plane.weight(), &rotation)
    }

    /// 投影晶面族内的每一个晶面，按成员顺序输出
    pub fn project_family(&self, plane: &DiffractingPlane, orientation: &Orientation) -> Vec<Band> {
        let rotation = self.crystal_to_detector(orientation);
        plane
            .members()
            .iter()
            .filter_map(|&hkl| {
                self.project_indices(hkl, plane.d_spacing(), plane.weight(), &rotation)
            })
            .collect()
    }

    /// 投影族内的单个成员；`rotation` 由 [`Self::crystal_to_detector`] 给出
    pub fn project_member(
        &self,
        plane: &DiffractingPlane,
        hkl: MillerIndex,
        rotation: &Rotation3<f64>,
    ) -> Option<Band> {
        self.project_indices(hkl, plane.d_spacing(), plane.weight(), rotation)
    }

    fn project_indices(
        &self,
        hkl: MillerIndex,
        d_spacing: f64,
        weight: f64,
        rotation: &Rotation3<f64>,
    ) -> Option<Band> {
        let Some(theta) = bragg_angle(d_spacing, self.wavelength) else {
            trace!("{} skipped: Bragg condition unsatisfiable", hkl);
            return None;
        };

        let n = rotation * hkl.unit_normal();
        let in_plane = n.x.hypot(n.y);
        if in_plane < PARALLEL_TOLERANCE {
            trace!("{} skipped: trace at infinity", hkl);
            return None;
        }

        let l = self.distance;
        let (cx, cy) = self.center;

        // 像素坐标: x_mm = (px - cx)·pitch, y_mm = (cy - py)·pitch
        let a = n.x / in_plane;
        let b = -n.y / in_plane;
        let c = (-n.x * cx + n.y * cy) / in_plane + n.z * l / (self.pitch * in_plane);

        let phi = (n.z.abs() / in_plane).atan();
        let near = l * (phi.tan() - (phi - theta).tan()) / self.pitch;
        let far = if phi + theta < FRAC_PI_2 {
            l * ((phi + theta).tan() - phi.tan()) / self.pitch
        } else {
            f64::INFINITY
        };

        let weight = if self.obliquity_attenuation {
            weight * phi.cos()
        } else {
            weight
        };

        Some(Band {
            hkl,
            normal: n,
            line: [a, b, c],
            bragg_angle: theta,
            near_half_width: near,
            far_half_width: far,
            center_side: if n.z.abs() < PARALLEL_TOLERANCE { 0.0 } else { n.z.signum() },
            weight,
        })
    }
}

/// 投影单个衍射晶面，无法衍射或中心线位于无穷远时返回 `None`
pub fn project_band(
    plane: &DiffractingPlane,
    orientation: &Orientation,
    geometry: &DetectorGeometry,
) -> Option<Band> {
    PatternProjector::new(geometry).project(plane, orientation)
}
