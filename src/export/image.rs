//! # 灰度图像写出
//!
//! 逐像素绘制到 `plotters` 的 BitMapBackend，格式由扩展名决定（PNG/BMP）。
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 与 `commands/mask.rs` 调用
//! - 使用 `plotters` crate

use plotters::prelude::*;
use std::path::Path;

use kikuchi::error::{KikuchiError, Result};
use kikuchi::{DiscMask, SimulatedPattern};

/// 写出灰度花样
pub fn write_pattern(pattern: &SimulatedPattern, output_path: &Path) -> Result<()> {
    write_gray(
        output_path,
        pattern.width(),
        pattern.height(),
        pattern.pixels(),
    )
}

/// 写出遮罩：圆盘内为白色，其余为黑色
pub fn write_mask(mask: &DiscMask, output_path: &Path) -> Result<()> {
    let pixels: Vec<u8> = mask
        .binary_map()
        .as_slice()
        .iter()
        .map(|&inside| if inside { 255 } else { 0 })
        .collect();
    write_gray(output_path, mask.width(), mask.height(), &pixels)
}

fn write_gray(output_path: &Path, width: usize, height: usize, pixels: &[u8]) -> Result<()> {
    let image_error = |reason: String| KikuchiError::ImageError {
        path: output_path.display().to_string(),
        reason,
    };

    let size = (
        u32::try_from(width).map_err(|e| image_error(e.to_string()))?,
        u32::try_from(height).map_err(|e| image_error(e.to_string()))?,
    );

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    for (row, line) in pixels.chunks(width).enumerate() {
        for (col, &v) in line.iter().enumerate() {
            root.draw_pixel((col as i32, row as i32), &RGBColor(v, v, v))
                .map_err(|e| image_error(e.to_string()))?;
        }
    }
    root.present().map_err(|e| image_error(e.to_string()))?;
    Ok(())
}
