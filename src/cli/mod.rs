//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `simulate`: 模拟 Kikuchi 花样（单个取向或 CSV 批量）
//! - `mask`: 生成圆盘遮罩图像
//! - `reflectors`: 列出衍射晶面族
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: simulate, mask, reflectors

pub mod mask;
pub mod reflectors;
pub mod simulate;

use clap::{Parser, Subcommand};

/// kikuchi - EBSD Kikuchi 花样模拟工具
#[derive(Parser)]
#[command(name = "kikuchi")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "EBSD Kikuchi pattern simulation and detector masks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Simulate Kikuchi patterns for one orientation or a CSV of orientations
    Simulate(simulate::SimulateArgs),

    /// Write a circular detector mask image
    Mask(mask::MaskArgs),

    /// List the diffracting plane families of a crystal structure
    Reflectors(reflectors::ReflectorsArgs),
}

/// 解析逗号分隔的浮点数列表，要求恰好 `count` 个
pub fn parse_floats(input: &str, count: usize) -> Result<Vec<f64>, String> {
    let values: Vec<f64> = input
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid number '{}' in '{}'", s.trim(), input))
        })
        .collect::<Result<_, _>>()?;

    if values.len() != count {
        return Err(format!(
            "Expected {} comma-separated values, got {} in '{}'",
            count,
            values.len(),
            input
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_floats() {
        assert_eq!(parse_floats("1, -2.5,3", 3).unwrap(), vec![1.0, -2.5, 3.0]);
        assert!(parse_floats("1,2", 3).is_err());
        assert!(parse_floats("1,x,3", 3).is_err());
    }

    #[test]
    fn test_parse_simulate_command() {
        let cli = Cli::try_parse_from([
            "kikuchi",
            "simulate",
            "--euler=-0.5,1,2",
            "--binning",
            "4",
            "--lattice",
            "bcc",
            "--mirror",
            "vertical",
            "--profile",
            "gaussian",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.euler, [-0.5, 1.0, 2.0]);
                assert_eq!(args.detector.binning, 4);
                assert_eq!(args.crystal.lattice, simulate::LatticeArg::Bcc);
                assert_eq!(args.detector.mirror, simulate::MirrorArg::Vertical);
                assert_eq!(args.render.profile, simulate::ProfileArg::Gaussian);
                assert_eq!(args.render.intensity_scale, simulate::ScaleArg::Linear);
            }
            _ => panic!("expected simulate"),
        }
    }
}
