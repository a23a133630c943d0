//! # mask 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/mask.rs`

use clap::Args;
use std::path::PathBuf;

/// mask 子命令参数
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Mask width in pixels
    #[arg(long, default_value_t = 168)]
    pub width: usize,

    /// Mask height in pixels
    #[arg(long, default_value_t = 128)]
    pub height: usize,

    /// Disc centre column (default: width / 2)
    #[arg(long, allow_hyphen_values = true)]
    pub centroid_x: Option<i64>,

    /// Disc centre row (default: height / 2)
    #[arg(long, allow_hyphen_values = true)]
    pub centroid_y: Option<i64>,

    /// Disc radius in pixels (boundary pixels included)
    #[arg(short, long, default_value_t = 64)]
    pub radius: i64,

    /// Output image file (.png or .bmp)
    #[arg(short, long, default_value = "mask.png")]
    pub output: PathBuf,
}
