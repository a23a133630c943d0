//! # simulate 子命令 CLI 定义
//!
//! 探测器几何、晶体结构、带绘制样式与取向参数。`CrystalArgs`
//! 也被 `reflectors` 子命令复用。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/simulate.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use kikuchi::models::geometry::DEFAULT_PIXEL_SIZE;
use kikuchi::simulation::DEFAULT_MAX_REFLECTORS;
use kikuchi::{BandProfile, IntensityScale, LatticeFamily, Mirror};

use super::parse_floats;

// ─────────────────────────────────────────────────────────────
// 探测器几何
// ─────────────────────────────────────────────────────────────

/// 探测器几何参数
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// Pattern width in pixels
    #[arg(long, default_value_t = 335)]
    pub width: usize,

    /// Pattern height in pixels
    #[arg(long, default_value_t = 255)]
    pub height: usize,

    /// Flip the output to match the detector mounting
    #[arg(long, value_enum, default_value = "none")]
    pub mirror: MirrorArg,

    /// Detector azimuth about the screen normal
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub azimuth: f64,

    /// Detector elevation
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub elevation: f64,

    /// Sample tilt
    #[arg(long, default_value_t = 0.3, allow_hyphen_values = true)]
    pub tilt: f64,

    /// Beam energy in keV
    #[arg(long, default_value_t = 20.0)]
    pub energy: f64,

    /// Binning factor (>= 1)
    #[arg(long, default_value_t = 1)]
    pub binning: u32,

    /// Sample-to-detector distance in mm
    #[arg(long, default_value_t = 15.0)]
    pub distance: f64,

    /// Physical pixel size in mm (before binning)
    #[arg(long, default_value_t = DEFAULT_PIXEL_SIZE)]
    pub pixel_size: f64,

    /// Pattern-centre offset as fractions of width,height (e.g., "0.05,-0.1")
    #[arg(long, value_parser = parse_pattern_center, allow_hyphen_values = true)]
    pub pattern_center: Option<(f64, f64)>,

    /// Weight bands by the cosine of their projection obliquity
    #[arg(long, default_value_t = false)]
    pub obliquity: bool,
}

/// 输出镜像方式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum MirrorArg {
    #[default]
    None,
    /// Swap left and right
    Horizontal,
    /// Swap top and bottom
    Vertical,
}

impl From<MirrorArg> for Mirror {
    fn from(arg: MirrorArg) -> Self {
        match arg {
            MirrorArg::None => Mirror::None,
            MirrorArg::Horizontal => Mirror::Horizontal,
            MirrorArg::Vertical => Mirror::Vertical,
        }
    }
}

// ─────────────────────────────────────────────────────────────
// 带绘制样式
// ─────────────────────────────────────────────────────────────

/// 带截面轮廓
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ProfileArg {
    /// Uniform fill across the band
    Flat,
    /// Peak on the centre line, falling linearly to the edges
    #[default]
    Linear,
    /// Gaussian across the band (sigma = width / 10)
    Gaussian,
}

impl From<ProfileArg> for BandProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Flat => BandProfile::Flat,
            ProfileArg::Linear => BandProfile::Linear,
            ProfileArg::Gaussian => BandProfile::Gaussian,
        }
    }
}

/// 强度到灰度的映射
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ScaleArg {
    #[default]
    Linear,
    /// ln(I + 1) / ln 2
    Log,
    /// log10(I + 1) / log10 2
    Log10,
}

impl From<ScaleArg> for IntensityScale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Linear => IntensityScale::Linear,
            ScaleArg::Log => IntensityScale::Log,
            ScaleArg::Log10 => IntensityScale::Log10,
        }
    }
}

/// 带绘制参数
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Band cross-section profile
    #[arg(long, value_enum, default_value = "linear")]
    pub profile: ProfileArg,

    /// Mapping from reflector intensity to band gray level
    #[arg(long, value_enum, default_value = "linear")]
    pub intensity_scale: ScaleArg,

    /// Draw every band at full intensity instead of weighting by |F|²
    #[arg(long, default_value_t = false)]
    pub uniform_bands: bool,

    /// Gray level of the weakest band (0-255)
    #[arg(long, default_value_t = 0)]
    pub intensity_min: u8,

    /// Gray level of the strongest band (0-255)
    #[arg(long, default_value_t = 255)]
    pub intensity_max: u8,

    /// Paint bands over this background gray level (0-255) without contrast stretching
    #[arg(long)]
    pub background: Option<u8>,
}

// ─────────────────────────────────────────────────────────────
// 晶体结构
// ─────────────────────────────────────────────────────────────

/// 晶格族
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum LatticeArg {
    /// Face-centred cubic (default: Si, a = 5.43 Å)
    #[default]
    Fcc,
    /// Body-centred cubic (default: Fe, a = 2.8665 Å)
    Bcc,
    /// Simple cubic (requires --element and --lattice-parameter)
    Sc,
}

impl From<LatticeArg> for LatticeFamily {
    fn from(arg: LatticeArg) -> Self {
        match arg {
            LatticeArg::Fcc => LatticeFamily::Fcc,
            LatticeArg::Bcc => LatticeFamily::Bcc,
            LatticeArg::Sc => LatticeFamily::SimpleCubic,
        }
    }
}

impl std::fmt::Display for LatticeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LatticeArg::Fcc => write!(f, "fcc"),
            LatticeArg::Bcc => write!(f, "bcc"),
            LatticeArg::Sc => write!(f, "sc"),
        }
    }
}

/// 晶体结构参数
#[derive(Args, Debug, Clone)]
pub struct CrystalArgs {
    /// Lattice family
    #[arg(long, value_enum, default_value = "fcc")]
    pub lattice: LatticeArg,

    /// Scattering element symbol (e.g., Si, Fe, Cu)
    #[arg(long)]
    pub element: Option<String>,

    /// Lattice parameter in Å
    #[arg(long)]
    pub lattice_parameter: Option<f64>,

    /// Maximum Miller index order
    #[arg(long, default_value_t = 4)]
    pub max_index: u32,

    /// Draw only the strongest N reflectors, counting each plane of a family (0 = all)
    #[arg(long, default_value_t = DEFAULT_MAX_REFLECTORS)]
    pub reflectors: usize,
}

// ─────────────────────────────────────────────────────────────
// simulate 子命令
// ─────────────────────────────────────────────────────────────

/// simulate 子命令参数
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub detector: DetectorArgs,

    #[command(flatten)]
    pub crystal: CrystalArgs,

    #[command(flatten)]
    pub render: RenderArgs,

    /// Bunge Euler angles "phi1,Phi,phi2"
    #[arg(long, value_parser = parse_euler, default_value = "0,0,0", allow_hyphen_values = true)]
    pub euler: [f64; 3],

    /// Read every angle flag (Euler angles, tilt, azimuth, elevation) in degrees instead of radians
    #[arg(long, default_value_t = false)]
    pub degrees: bool,

    /// CSV file of orientations (columns: name,phi1,Phi,phi2); enables batch mode
    #[arg(long)]
    pub orientations: Option<PathBuf>,

    /// Zero pixels outside a centred disc of this radius (pixels)
    #[arg(long)]
    pub mask_radius: Option<i64>,

    /// Output: image file (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "pattern.png")]
    pub output: PathBuf,

    /// Image format for batch mode
    #[arg(long, value_enum, default_value = "png")]
    pub format: ImageFormat,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

/// 批量模式输出图像格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Bmp,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
        }
    }
}

fn parse_euler(input: &str) -> Result<[f64; 3], String> {
    let v = parse_floats(input, 3)?;
    Ok([v[0], v[1], v[2]])
}

fn parse_pattern_center(input: &str) -> Result<(f64, f64), String> {
    let v = parse_floats(input, 2)?;
    Ok((v[0], v[1]))
}
