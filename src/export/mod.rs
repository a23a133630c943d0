//! # 文件导出模块
//!
//! 命令行前端唯一的写文件位置：灰度图像、遮罩图像与晶面族 CSV。
//!
//! ## 子模块
//! - `image`: 基于 `plotters` BitMapBackend 的图像写出
//! - `reflectors`: 晶面族 CSV 导出
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 kikuchi 库的 SimulatedPattern、DiscMask、DiffractingPlane

pub mod image;
pub mod reflectors;

pub use image::{write_mask, write_pattern};
pub use reflectors::to_csv;
