//! # 花样模拟模块
//!
//! 编排晶面枚举与带投影，叠加光栅化并归一化为灰度花样。
//!
//! ## 子模块
//! - `pattern`: 强度网格与灰度花样
//! - `raster`: 带的光栅化与绘制样式
//! - `simulator`: 模拟器入口与配置
//!
//! ## 依赖关系
//! - 使用 `crystal/`、`projection/`、`models/`
//! - 被命令行 `simulate` 子命令使用

pub mod pattern;
pub mod raster;
pub mod simulator;

pub use pattern::{IntensityGrid, Mirror, SimulatedPattern, MID_GRAY};
pub use raster::{BandProfile, BandStyle, IntensityScale, DEFAULT_BACKGROUND};
pub use simulator::{
    PatternSimulator, SimulatorConfig, DEFAULT_MAX_INDEX_ORDER, DEFAULT_MAX_REFLECTORS,
};
