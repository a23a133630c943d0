//! # reflectors 子命令实现
//!
//! 打印晶面族表格（`tabled`），可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/reflectors.rs` 定义的 ReflectorsArgs
//! - 使用 `export/reflectors.rs` 导出 CSV

use anyhow::{ensure, Context, Result};
use tabled::{Table, Tabled};

use crate::cli::reflectors::ReflectorsArgs;
use crate::commands::build_structure;
use crate::export;
use crate::utils::output;
use kikuchi::{
    bragg_angle, electron_wavelength, enumerate_planes, CrystalStructure, DiffractingPlane,
    MAX_INDEX_ORDER_LIMIT,
};

/// 执行 reflectors
pub fn execute(args: ReflectorsArgs) -> Result<()> {
    output::print_header("Diffracting Plane Families");

    let (structure, planes) = collect_planes(&args)?;
    let wavelength = electron_wavelength(args.energy);

    output::print_info(&format!(
        "{}: a = {} Å, max index {}",
        structure.name(),
        structure.lattice_parameter(),
        args.crystal.max_index
    ));
    output::print_info(&format!(
        "Electron wavelength at {} keV: {:.5} Å",
        args.energy, wavelength
    ));

    if planes.is_empty() {
        output::print_warning("No diffracting plane families");
    } else {
        let count = if args.top_n == 0 { planes.len() } else { args.top_n };
        print_plane_table(&planes, wavelength, count);
    }

    if let Some(path) = &args.csv {
        export::to_csv(&planes, wavelength, path)
            .with_context(|| format!("exporting reflectors to '{}'", path.display()))?;
        output::print_success(&format!(
            "{} families exported to '{}'",
            planes.len(),
            path.display()
        ));
    }

    Ok(())
}

/// 校验参数并枚举晶面族
fn collect_planes(args: &ReflectorsArgs) -> Result<(CrystalStructure, Vec<DiffractingPlane>)> {
    ensure!(
        args.energy.is_finite() && args.energy > 0.0,
        "Beam energy must be > 0 keV, got {}",
        args.energy
    );
    ensure!(
        args.crystal.max_index <= MAX_INDEX_ORDER_LIMIT,
        "--max-index must be <= {}, got {}",
        MAX_INDEX_ORDER_LIMIT,
        args.crystal.max_index
    );

    let structure = build_structure(&args.crystal)?;
    let planes = enumerate_planes(&structure, args.crystal.max_index)?;
    Ok((structure, planes))
}

/// 打印晶面族表格
fn print_plane_table(planes: &[DiffractingPlane], wavelength: f64, count: usize) {
    #[derive(Tabled)]
    struct PlaneRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "{hkl}")]
        hkl: String,
        #[tabled(rename = "mult.")]
        multiplicity: usize,
        #[tabled(rename = "d (Å)")]
        d_spacing: String,
        #[tabled(rename = "weight")]
        weight: String,
        #[tabled(rename = "θB (°)")]
        bragg: String,
    }

    let rows: Vec<PlaneRow> = planes
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, p)| PlaneRow {
            rank: i + 1,
            hkl: p.hkl().to_string(),
            multiplicity: p.multiplicity(),
            d_spacing: format!("{:.4}", p.d_spacing()),
            weight: format!("{:.4}", p.weight()),
            bragg: bragg_angle(p.d_spacing(), wavelength)
                .map(|t| format!("{:.3}", t.to_degrees()))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    output::print_header(&format!("Top {} of {} families", rows.len(), planes.len()));
    println!("{}", Table::new(&rows));
}
