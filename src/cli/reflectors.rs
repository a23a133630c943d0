//! # reflectors 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 复用 `cli/simulate.rs` 的 CrystalArgs
//! - 参数传递给 `commands/reflectors.rs`

use clap::Args;
use std::path::PathBuf;

use super::simulate::CrystalArgs;

/// reflectors 子命令参数
#[derive(Args, Debug)]
pub struct ReflectorsArgs {
    #[command(flatten)]
    pub crystal: CrystalArgs,

    /// Beam energy in keV (for Bragg angles)
    #[arg(long, default_value_t = 20.0)]
    pub energy: f64,

    /// Number of families to print (0 = all)
    #[arg(long, default_value_t = 20)]
    pub top_n: usize,

    /// Export all families to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
