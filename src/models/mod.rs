//! # 数据模型模块
//!
//! 定义晶体结构、取向与探测器几何的统一数据模型。
//!
//! ## 依赖关系
//! - 被 `crystal/`、`projection/` 和 `simulation/` 使用
//! - 子模块: miller, orientation, geometry, structure

pub mod geometry;
pub mod miller;
pub mod orientation;
pub mod structure;

pub use geometry::DetectorGeometry;
pub use miller::MillerIndex;
pub use orientation::Orientation;
pub use structure::{Atom, CrystalStructure, LatticeFamily};
