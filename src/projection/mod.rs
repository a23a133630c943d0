//! # 投影模块
//!
//! 将衍射晶面投影为荧光屏上的 Kikuchi 带。
//!
//! ## 子模块
//! - `wavelength`: 电子波长与 Bragg 角
//! - `projector`: gnomonic 投影与带宽计算
//!
//! ## 依赖关系
//! - 被 `simulation/` 使用
//! - 使用 `models/` 与 `crystal/`

pub mod projector;
pub mod wavelength;

pub use projector::{project_band, Band, PatternProjector};
pub use wavelength::{bragg_angle, electron_wavelength};
