//! # 晶面族 CSV 导出
//!
//! 每行一个晶面族：排名、族代表指数、多重度、d、权重与 Bragg 角。
//!
//! ## 依赖关系
//! - 被 `commands/reflectors.rs` 调用
//! - 使用 `csv` 与 `serde` 写入

use serde::Serialize;
use std::path::Path;

use kikuchi::error::{KikuchiError, Result};
use kikuchi::{bragg_angle, DiffractingPlane};

#[derive(Debug, Serialize)]
struct ReflectorRecord {
    rank: usize,
    h: i32,
    k: i32,
    l: i32,
    multiplicity: usize,
    d_spacing: f64,
    weight: f64,
    /// 不满足 Bragg 条件时为空
    bragg_angle_deg: Option<f64>,
}

/// 导出晶面族为 CSV，`wavelength` 单位 Å
pub fn to_csv(planes: &[DiffractingPlane], wavelength: f64, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for (i, plane) in planes.iter().enumerate() {
        let hkl = plane.hkl();
        wtr.serialize(ReflectorRecord {
            rank: i + 1,
            h: hkl.h,
            k: hkl.k,
            l: hkl.l,
            multiplicity: plane.multiplicity(),
            d_spacing: plane.d_spacing(),
            weight: plane.weight(),
            bragg_angle_deg: bragg_angle(plane.d_spacing(), wavelength).map(f64::to_degrees),
        })?;
    }

    wtr.flush().map_err(|e| KikuchiError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
