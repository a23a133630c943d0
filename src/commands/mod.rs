//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑，以及由命令行参数构造库配置的公共函数。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `export/`, `utils/` 与 kikuchi 库
//! - 子模块: simulate, mask, reflectors

pub mod mask;
pub mod reflectors;
pub mod simulate;

use anyhow::{bail, Result};

use crate::cli::simulate::{CrystalArgs, DetectorArgs, LatticeArg, RenderArgs};
use crate::cli::Commands;
use kikuchi::{BandStyle, CrystalStructure, DetectorGeometry, SimulatorConfig};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Simulate(args) => simulate::execute(args),
        Commands::Mask(args) => mask::execute(args),
        Commands::Reflectors(args) => reflectors::execute(args),
    }
}

/// 由晶体参数构造结构，缺省时使用晶格族的默认元素与晶格常数
pub fn build_structure(args: &CrystalArgs) -> Result<CrystalStructure> {
    let (element, a) = match (args.lattice, &args.element, args.lattice_parameter) {
        (LatticeArg::Fcc, None, None) => return Ok(CrystalStructure::silicon_fcc()),
        (LatticeArg::Bcc, None, None) => return Ok(CrystalStructure::iron_bcc()),
        (_, Some(element), Some(a)) => (element.as_str(), a),
        (LatticeArg::Fcc, Some(element), None) => (element.as_str(), 5.43),
        (LatticeArg::Bcc, Some(element), None) => (element.as_str(), 2.8665),
        (LatticeArg::Fcc, None, Some(a)) => ("Si", a),
        (LatticeArg::Bcc, None, Some(a)) => ("Fe", a),
        (LatticeArg::Sc, _, _) => {
            bail!("Simple cubic lattices require both --element and --lattice-parameter")
        }
    };
    Ok(CrystalStructure::new(args.lattice.into(), a, element)?)
}

/// 由探测器、晶体与绘制参数构造模拟器配置；`degrees` 为真时角度按度解析
pub fn build_config(
    detector: &DetectorArgs,
    crystal: &CrystalArgs,
    render: &RenderArgs,
    degrees: bool,
) -> Result<SimulatorConfig> {
    let angle = |v: f64| if degrees { v.to_radians() } else { v };

    let mut geometry = DetectorGeometry::new(
        detector.width,
        detector.height,
        detector.binning,
        detector.distance,
        angle(detector.tilt),
        detector.energy,
    )?
    .with_detector_angles(angle(detector.azimuth), angle(detector.elevation))?
    .with_pixel_size(detector.pixel_size)?;

    if let Some((x, y)) = detector.pattern_center {
        geometry = geometry.with_pattern_center(x, y)?;
    }

    let style = BandStyle::default()
        .with_profile(render.profile.into())
        .with_scale(render.intensity_scale.into())
        .with_weight_by_intensity(!render.uniform_bands)
        .with_intensity_range(render.intensity_min, render.intensity_max)
        .with_background(render.background);

    let config = SimulatorConfig::new(geometry)
        .with_mirror(detector.mirror.into())
        .with_max_index_order(crystal.max_index)
        .with_max_reflectors((crystal.reflectors > 0).then_some(crystal.reflectors))
        .with_obliquity_attenuation(detector.obliquity)
        .with_style(style);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use kikuchi::{BandProfile, IntensityScale, LatticeFamily, Mirror};

    fn simulate_args(extra: &[&str]) -> crate::cli::simulate::SimulateArgs {
        let argv = ["kikuchi", "simulate"].iter().chain(extra.iter()).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Simulate(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_default_structures() {
        let fcc = build_structure(&simulate_args(&[]).crystal).unwrap();
        assert_eq!(fcc, CrystalStructure::silicon_fcc());

        let bcc = build_structure(&simulate_args(&["--lattice", "bcc"]).crystal).unwrap();
        assert_eq!(bcc, CrystalStructure::iron_bcc());
    }

    #[test]
    fn test_custom_structure() {
        let args = simulate_args(&["--element", "Cu", "--lattice-parameter", "3.615"]);
        let cu = build_structure(&args.crystal).unwrap();
        assert_eq!(cu.family(), LatticeFamily::Fcc);
        assert_eq!(cu.lattice_parameter(), 3.615);

        let sc = simulate_args(&["--lattice", "sc"]);
        assert!(build_structure(&sc.crystal).is_err());

        let unknown = simulate_args(&["--element", "Xx"]);
        assert!(build_structure(&unknown.crystal).is_err());
    }

    #[test]
    fn test_config_in_degrees() {
        let args = simulate_args(&["--tilt", "70", "--degrees", "--reflectors", "5"]);
        let config = build_config(&args.detector, &args.crystal, &args.render, args.degrees).unwrap();
        assert!((config.geometry.tilt() - 70f64.to_radians()).abs() < 1e-12);
        assert_eq!(config.max_reflectors, Some(5));
    }

    #[test]
    fn test_default_config() {
        let args = simulate_args(&[]);
        let config = build_config(&args.detector, &args.crystal, &args.render, false).unwrap();
        assert_eq!(config.mirror, Mirror::None);
        assert_eq!(config.max_reflectors, Some(32));
        assert_eq!(config.style, BandStyle::default());

        let args = simulate_args(&["--reflectors", "0"]);
        let config = build_config(&args.detector, &args.crystal, &args.render, false).unwrap();
        assert_eq!(config.max_reflectors, None);
    }

    #[test]
    fn test_mirror_modes() {
        for (flag, expected) in [
            ("none", Mirror::None),
            ("horizontal", Mirror::Horizontal),
            ("vertical", Mirror::Vertical),
        ] {
            let args = simulate_args(&["--mirror", flag]);
            let config = build_config(&args.detector, &args.crystal, &args.render, false).unwrap();
            assert_eq!(config.mirror, expected);
        }
        assert!(Cli::try_parse_from(["kikuchi", "simulate", "--mirror", "diagonal"]).is_err());
    }

    #[test]
    fn test_render_style_flags() {
        let args = simulate_args(&[
            "--profile",
            "gaussian",
            "--intensity-scale",
            "log10",
            "--uniform-bands",
            "--intensity-min",
            "20",
            "--intensity-max",
            "230",
            "--background",
            "128",
        ]);
        let config = build_config(&args.detector, &args.crystal, &args.render, false).unwrap();
        assert_eq!(config.style.profile, BandProfile::Gaussian);
        assert_eq!(config.style.scale, IntensityScale::Log10);
        assert!(!config.style.weight_by_intensity);
        assert_eq!((config.style.intensity_min, config.style.intensity_max), (20, 230));
        assert_eq!(config.style.background, Some(128));

        let flat = simulate_args(&["--profile", "flat", "--intensity-scale", "log"]);
        let config = build_config(&flat.detector, &flat.crystal, &flat.render, false).unwrap();
        assert_eq!(config.style.profile, BandProfile::Flat);
        assert_eq!(config.style.scale, IntensityScale::Log);
    }

    #[test]
    fn test_invalid_config() {
        let args = simulate_args(&["--binning", "0"]);
        assert!(build_config(&args.detector, &args.crystal, &args.render, false).is_err());

        let inverted = simulate_args(&["--intensity-min", "200", "--intensity-max", "100"]);
        assert!(build_config(&inverted.detector, &inverted.crystal, &inverted.render, false).is_err());
        assert!(simulate_args(&[]).render.intensity_max == 255);
        assert!(Cli::try_parse_from(["kikuchi", "simulate", "--background", "256"]).is_err());
    }
}
