//! # mask 子命令实现
//!
//! 生成圆盘遮罩并写出黑白图像（圆盘内为白色）。
//!
//! ## 依赖关系
//! - 使用 `cli/mask.rs` 定义的 MaskArgs
//! - 使用 `export/image.rs` 写出图像

use anyhow::{Context, Result};

use crate::cli::mask::MaskArgs;
use crate::export;
use crate::utils::output;
use kikuchi::{DiscMaskFactory, MaskFactory};

/// 执行 mask
pub fn execute(args: MaskArgs) -> Result<()> {
    output::print_header("Disc Mask");

    let factory = DiscMaskFactory::new(
        args.centroid_x.unwrap_or((args.width / 2) as i64),
        args.centroid_y.unwrap_or((args.height / 2) as i64),
        args.radius,
    );
    let mask = factory.create(args.width, args.height)?;

    output::print_param("size", &format!("{} x {} px", mask.width(), mask.height()));
    output::print_param(
        "centroid",
        &format!("({}, {})", mask.centroid_x(), mask.centroid_y()),
    );
    output::print_param("radius", &format!("{} px", mask.radius()));
    output::print_param("pixels set", &mask.binary_map().count().to_string());

    if mask.binary_map().count() == 0 {
        output::print_warning("Mask is empty");
    }

    export::write_mask(&mask, &args.output)
        .with_context(|| format!("writing mask to '{}'", args.output.display()))?;

    output::print_image_written("Mask", mask.width(), mask.height(), &args.output);
    Ok(())
}
