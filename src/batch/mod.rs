//! # 批量处理模块
//!
//! 对一组相互独立的任务（如 CSV 中的每个取向）并行执行并汇总结果。
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod runner;

pub use runner::{BatchResult, BatchRunner, ProcessResult};
