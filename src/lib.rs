//! # kikuchi - EBSD Kikuchi 花样模拟
//!
//! 对已知晶体结构与取向模拟电子背散射衍射（EBSD）Kikuchi 花样，
//! 并提供把分析限制在圆形探测器区域内的圆盘遮罩。
//!
//! 库本身不做文件 I/O，只产生内存中的像素网格与二值遮罩。
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── mask/        (圆盘遮罩，独立)
//!   ├── simulation/  (模拟入口、光栅化、归一化)
//!   │     ├── projection/ (gnomonic 投影、Bragg 角)
//!   │     └── crystal/    (晶面族枚举、结构因子)
//!   ├── models/      (取向、探测器几何、晶体结构)
//!   └── error.rs     (错误处理)
//! ```

pub mod crystal;
pub mod error;
pub mod mask;
pub mod models;
pub mod projection;
pub mod simulation;

pub use crystal::{enumerate_planes, DiffractingPlane, MAX_INDEX_ORDER_LIMIT};
pub use error::{KikuchiError, Result};
pub use mask::{create_disc_mask, BinaryMap, DiscMask, DiscMaskFactory, MaskFactory};
pub use models::{CrystalStructure, DetectorGeometry, LatticeFamily, MillerIndex, Orientation};
pub use projection::{bragg_angle, electron_wavelength, project_band, Band, PatternProjector};
pub use simulation::{
    BandProfile, BandStyle, IntensityScale, Mirror, PatternSimulator, SimulatedPattern,
    SimulatorConfig,
};
