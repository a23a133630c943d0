//! # simulate 子命令实现
//!
//! 对单个取向或 CSV 中的一组取向模拟 Kikuchi 花样并写出图像。
//!
//! ## 功能
//! - 单取向模式：写出一张图像
//! - 批量模式（`--orientations`）：晶面只枚举一次，各取向并行模拟（rayon）
//! - 可选圆盘遮罩
//!
//! ## 依赖关系
//! - 使用 `cli/simulate.rs` 定义的 SimulateArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `export/image.rs` 写出图像

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::{BatchRunner, ProcessResult};
use crate::cli::simulate::{ImageFormat, SimulateArgs};
use crate::commands::{build_config, build_structure};
use crate::export;
use crate::utils::{output, progress};
use kikuchi::error::KikuchiError;
use kikuchi::{
    create_disc_mask, enumerate_planes, CrystalStructure, DiffractingPlane, DiscMask, Orientation,
    PatternSimulator, SimulatedPattern,
};

/// CSV 中的一条取向记录
#[derive(Debug, Clone, Deserialize)]
pub struct OrientationRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub phi1: f64,
    #[serde(rename = "Phi")]
    pub phi: f64,
    pub phi2: f64,
}

/// 执行 simulate
pub fn execute(args: SimulateArgs) -> Result<()> {
    output::print_header("Kikuchi Pattern Simulation");

    let structure = build_structure(&args.crystal)?;
    let config = build_config(&args.detector, &args.crystal, &args.render, args.degrees)?;
    let simulator = PatternSimulator::from_config(config)?;
    print_setup(&simulator, &structure);

    let mask = match args.mask_radius {
        Some(radius) => Some(centred_mask(&simulator, radius)?),
        None => None,
    };

    match &args.orientations {
        Some(path) => execute_batch(&args, path, &simulator, &structure, mask.as_ref()),
        None => execute_single(&args, &simulator, &structure, mask.as_ref()),
    }
}

/// 单取向模式
fn execute_single(
    args: &SimulateArgs,
    simulator: &PatternSimulator,
    structure: &CrystalStructure,
    mask: Option<&DiscMask>,
) -> Result<()> {
    let orientation = to_orientation(args.euler, args.degrees);
    output::print_info(&format!(
        "Orientation (rad): φ1 = {:.4}, Φ = {:.4}, φ2 = {:.4}",
        orientation.phi1, orientation.phi, orientation.phi2
    ));

    if args.output.exists() && !args.overwrite {
        output::print_skip(&format!(
            "'{}' exists (use --overwrite to replace)",
            args.output.display()
        ));
        return Ok(());
    }

    let spinner = progress::create_spinner("Rasterizing bands");
    let planes = enumerate_planes(structure, simulator.config().max_index_order)?;
    let pattern = render(simulator, &planes, &orientation, mask);
    spinner.finish_and_clear();
    let pattern = pattern?;

    export::write_pattern(&pattern, &args.output)
        .with_context(|| format!("writing pattern to '{}'", args.output.display()))?;

    if let Some(summary) = output::gray_summary(pattern.pixels()) {
        output::print_param("levels", &summary);
    }
    output::print_image_written("Pattern", pattern.width(), pattern.height(), &args.output);
    Ok(())
}

/// 批量模式
fn execute_batch(
    args: &SimulateArgs,
    csv_path: &Path,
    simulator: &PatternSimulator,
    structure: &CrystalStructure,
    mask: Option<&DiscMask>,
) -> Result<()> {
    output::print_info(&format!("Batch mode: orientations from '{}'", csv_path.display()));

    let records = read_orientations(csv_path)
        .with_context(|| format!("reading orientations from '{}'", csv_path.display()))?;
    if records.is_empty() {
        output::print_warning("No orientations found");
        return Ok(());
    }
    output::print_info(&format!("Found {} orientations", records.len()));

    fs::create_dir_all(&args.output).map_err(|e| KikuchiError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let planes = enumerate_planes(structure, simulator.config().max_index_order)?;
    let jobs: Vec<(usize, OrientationRecord)> = records.into_iter().enumerate().collect();

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running on {} threads", runner.jobs()));
    let result = runner.run(&jobs, |(index, record)| {
        let path = output_path(&args.output, *index, record, args.format);
        if path.exists() && !args.overwrite {
            return ProcessResult::Skipped(path.display().to_string());
        }
        let orientation = to_orientation([record.phi1, record.phi, record.phi2], args.degrees);
        let written = render(simulator, &planes, &orientation, mask)
            .and_then(|pattern| export::write_pattern(&pattern, &path));
        match written {
            Ok(()) => ProcessResult::Success(path.display().to_string()),
            Err(e) => ProcessResult::Failed(path.display().to_string(), e.to_string()),
        }
    })?;

    output::print_batch_summary("orientations", &result);
    Ok(())
}

/// 模拟并按需遮罩
fn render(
    simulator: &PatternSimulator,
    planes: &[DiffractingPlane],
    orientation: &Orientation,
    mask: Option<&DiscMask>,
) -> kikuchi::Result<SimulatedPattern> {
    let pattern = simulator.pattern(planes, orientation)?;
    match mask {
        Some(mask) => mask.apply(&pattern),
        None => Ok(pattern),
    }
}

/// 以图像中心为圆心的遮罩
fn centred_mask(simulator: &PatternSimulator, radius: i64) -> Result<DiscMask> {
    let geometry = simulator.geometry();
    let (w, h) = (geometry.width(), geometry.height());
    let mask = create_disc_mask(w, h, (w / 2) as i64, (h / 2) as i64, radius)?;
    output::print_info(&format!(
        "Mask: radius {} px, {} of {} pixels kept",
        radius,
        mask.binary_map().count(),
        w * h
    ));
    Ok(mask)
}

/// 读取取向 CSV（列：name（可选）, phi1, Phi, phi2）
pub fn read_orientations(path: &Path) -> kikuchi::Result<Vec<OrientationRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

fn to_orientation(euler: [f64; 3], degrees: bool) -> Orientation {
    let [phi1, phi, phi2] = euler;
    if degrees {
        Orientation::from_degrees(phi1, phi, phi2)
    } else {
        Orientation::new(phi1, phi, phi2)
    }
}

fn output_path(dir: &Path, index: usize, record: &OrientationRecord, format: ImageFormat) -> PathBuf {
    let stem = match &record.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => format!("pattern_{:04}", index + 1),
    };
    dir.join(format!("{}.{}", stem, format.extension()))
}

fn print_setup(simulator: &PatternSimulator, structure: &CrystalStructure) {
    let config = simulator.config();
    let g = &config.geometry;
    output::print_info("Configuration:");
    output::print_param(
        "structure",
        &format!("{} (a = {} Å)", structure.name(), structure.lattice_parameter()),
    );
    output::print_param("size", &format!("{} x {} px", g.width(), g.height()));
    output::print_param("binning", &g.binning().to_string());
    output::print_param("distance", &format!("{} mm", g.detector_distance()));
    output::print_param("tilt", &format!("{:.2}°", g.tilt().to_degrees()));
    output::print_param("beam energy", &format!("{} keV", g.beam_energy_kev()));
    output::print_param(
        "wavelength",
        &format!("{:.5} Å", kikuchi::electron_wavelength(g.beam_energy_kev())),
    );
    output::print_param("max index", &config.max_index_order.to_string());
    if let Some(n) = config.max_reflectors {
        output::print_param("reflectors", &n.to_string());
    }
    let style = &config.style;
    output::print_param(
        "bands",
        &format!(
            "{:?} profile, {:?} scale, gray {}-{}",
            style.profile, style.scale, style.intensity_min, style.intensity_max
        ),
    );
    if let Some(bg) = style.background {
        output::print_param("background", &bg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_orientations() {
        let path = std::env::temp_dir()
            .join(format!("kikuchi_orientations_{}.csv", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "name,phi1,Phi,phi2").unwrap();
        writeln!(file, "grain_a, 0.1, 0.2, 0.3").unwrap();
        writeln!(file, ",1.0,2.0,3.0").unwrap();
        drop(file);

        let records = read_orientations(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("grain_a"));
        assert_eq!(records[0].phi, 0.2);

        let dir = Path::new("out");
        assert_eq!(
            output_path(dir, 0, &records[0], ImageFormat::Png),
            dir.join("grain_a.png")
        );
        assert_eq!(
            output_path(dir, 1, &records[1], ImageFormat::Bmp),
            dir.join("pattern_0002.bmp")
        );
    }

    #[test]
    fn test_to_orientation_degrees() {
        let o = to_orientation([180.0, 90.0, 0.0], true);
        assert!((o.phi1 - std::f64::consts::PI).abs() < 1e-12);
        assert!((o.phi - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
