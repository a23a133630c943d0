//! # 晶体学模块
//!
//! 枚举衍射晶面族，提供晶面间距与相对衍射强度。
//!
//! ## 子模块
//! - `scattering`: 原子散射因子数据
//! - `reflectors`: 衍射晶面族枚举与结构因子
//!
//! ## 依赖关系
//! - 被 `simulation/` 和命令行 `reflectors` 子命令使用
//! - 使用 `models/structure.rs`

pub mod reflectors;
pub mod scattering;

pub use reflectors::{enumerate_planes, structure_factor, DiffractingPlane, MAX_INDEX_ORDER_LIMIT};
