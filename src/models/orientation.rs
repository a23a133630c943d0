//! # 晶体取向
//!
//! Bunge (z-x-z) 欧拉角 (φ1, Φ, φ2)，单位弧度。
//!
//! 约定：Bunge 矩阵 g 将样品坐标系中的向量变换到晶体坐标系
//! (v_c = g · v_s)。将晶面法向量从晶体坐标系转到样品坐标系使用
//! gᵀ = Rz(φ1) · Rx(Φ) · Rz(φ2)。
//!
//! ## 依赖关系
//! - 被 `projection/projector.rs` 使用
//! - 使用 `nalgebra` 的 `Rotation3`

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{KikuchiError, Result};

/// Bunge 欧拉角取向（值类型）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub phi1: f64,
    pub phi: f64,
    pub phi2: f64,
}

impl Orientation {
    /// 从弧度创建
    pub fn new(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self { phi1, phi, phi2 }
    }

    /// 从角度创建
    pub fn from_degrees(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self::new(phi1.to_radians(), phi.to_radians(), phi2.to_radians())
    }

    /// 检查三个角都是有限值
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("phi1", self.phi1), ("Phi", self.phi), ("phi2", self.phi2)] {
            if !value.is_finite() {
                return Err(KikuchiError::config(
                    name,
                    format!("Euler angle must be finite, got {}", value),
                ));
            }
        }
        Ok(())
    }

    /// 晶体 → 样品 的旋转 gᵀ
    pub fn crystal_to_sample(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), self.phi1)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.phi)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.phi2)
    }

    /// Bunge 矩阵 g（样品 → 晶体）
    pub fn bunge_matrix(&self) -> Matrix3<f64> {
        self.crystal_to_sample().inverse().into_inner()
    }
}
