//! # Kikuchi 花样模拟器
//!
//! 对外的模拟入口：构造时一次性校验探测器配置，之后对任意取向生成灰度花样。
//!
//! ## 流程
//! 1. 枚举晶面族（默认 FCC/BCC 结构的结果在首次使用后缓存）
//! 2. 按强度顺序展开各族成员，截取前 `max_reflectors` 个晶面投影为 Kikuchi 带
//! 3. 按 `BandStyle` 光栅化：叠加后 min/max 拉伸到 0-255，
//!    或在背景灰度上覆盖绘制后按绝对刻度量化；最后按需镜像
//!
//! ## 依赖关系
//! - 使用 `crystal/` 枚举晶面
//! - 使用 `projection/` 投影
//! - 使用 `simulation/raster.rs` 与 `simulation/pattern.rs`

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::sync::OnceLock;

use crate::crystal::{enumerate_planes, DiffractingPlane, MAX_INDEX_ORDER_LIMIT};
use crate::error::{KikuchiError, Result};
use crate::models::geometry::DEFAULT_PIXEL_SIZE;
use crate::models::{CrystalStructure, DetectorGeometry, Orientation};
use crate::projection::{Band, PatternProjector};
use crate::simulation::pattern::{IntensityGrid, Mirror, SimulatedPattern};
use crate::simulation::raster::{rasterize, BandProfile, BandStyle, DEFAULT_BACKGROUND};

/// 默认最大 Miller 指数级次
pub const DEFAULT_MAX_INDEX_ORDER: u32 = 4;

/// 默认绘制的晶面数（按强度顺序）
pub const DEFAULT_MAX_REFLECTORS: usize = 32;

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub geometry: DetectorGeometry,
    #[serde(default)]
    pub mirror: Mirror,
    #[serde(default = "default_max_index_order")]
    pub max_index_order: u32,
    /// 只绘制最强的若干个晶面（族成员逐个计数）；`None` 表示全部
    #[serde(default = "default_max_reflectors")]
    pub max_reflectors: Option<usize>,
    /// 带权重乘以投影倾斜度 cos φ
    #[serde(default)]
    pub obliquity_attenuation: bool,
    #[serde(default)]
    pub style: BandStyle,
}

fn default_max_index_order() -> u32 {
    DEFAULT_MAX_INDEX_ORDER
}

fn default_max_reflectors() -> Option<usize> {
    Some(DEFAULT_MAX_REFLECTORS)
}

impl SimulatorConfig {
    pub fn new(geometry: DetectorGeometry) -> Self {
        Self {
            geometry,
            mirror: Mirror::None,
            max_index_order: DEFAULT_MAX_INDEX_ORDER,
            max_reflectors: default_max_reflectors(),
            obliquity_attenuation: false,
            style: BandStyle::default(),
        }
    }

    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_max_index_order(mut self, order: u32) -> Self {
        self.max_index_order = order;
        self
    }

    pub fn with_max_reflectors(mut self, count: Option<usize>) -> Self {
        self.max_reflectors = count;
        self
    }

    pub fn with_obliquity_attenuation(mut self, enabled: bool) -> Self {
        self.obliquity_attenuation = enabled;
        self
    }

    pub fn with_style(mut self, style: BandStyle) -> Self {
        self.style = style;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.style.validate()?;
        if self.max_index_order > MAX_INDEX_ORDER_LIMIT {
            return Err(KikuchiError::config(
                "max_index_order",
                format!("must be <= {}, got {}", MAX_INDEX_ORDER_LIMIT, self.max_index_order),
            ));
        }
        Ok(())
    }
}

/// Kikuchi 花样模拟器
///
/// 构造后不可变，可在多个线程间共享（`&self` 调用）。
#[derive(Debug)]
pub struct PatternSimulator {
    config: SimulatorConfig,
    projector: PatternProjector,
    fcc_planes: OnceLock<Vec<DiffractingPlane>>,
    bcc_planes: OnceLock<Vec<DiffractingPlane>>,
}

impl PatternSimulator {
    /// 由探测器参数创建模拟器
    ///
    /// `angle1`/`angle2` 为探测器方位角与俯仰角，`tilt` 为样品倾转角，均为弧度；
    /// `detector_distance` 单位 mm。
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: usize,
        height: usize,
        mirror: bool,
        angle1: f64,
        angle2: f64,
        tilt: f64,
        beam_energy_kev: f64,
        binning: u32,
        detector_distance: f64,
    ) -> Result<Self> {
        let geometry =
            DetectorGeometry::new(width, height, binning, detector_distance, tilt, beam_energy_kev)?
                .with_detector_angles(angle1, angle2)?;
        Self::from_config(SimulatorConfig::new(geometry).with_mirror(Mirror::from(mirror)))
    }

    /// 以荧光屏比例参数创建模拟器
    ///
    /// - `pattern_center_x`/`pattern_center_y`：花样中心相对宽、高的偏移，(0, 0) 居中
    /// - `detector_distance`：样品到荧光屏的距离，以花样宽度为单位
    /// - `energy_ev`：束流能量（eV）；`tilt_deg`：样品倾转角（度）
    /// - `intensity`：为真时带的灰度随衍射强度变化，否则所有带同为白色
    ///
    /// 荧光屏竖直放置（俯仰 −90°），带在 128 灰度背景上均匀填充。
    #[allow(clippy::too_many_arguments)]
    pub fn from_screen_fraction(
        width: usize,
        height: usize,
        intensity: bool,
        pattern_center_x: f64,
        pattern_center_y: f64,
        detector_distance: f64,
        energy_ev: f64,
        number_of_reflectors: usize,
        tilt_deg: f64,
    ) -> Result<Self> {
        if !(detector_distance.is_finite() && detector_distance > 0.0) {
            return Err(KikuchiError::config(
                "detector_distance",
                format!("must be > 0 (fraction of width), got {}", detector_distance),
            ));
        }
        let distance_mm = detector_distance * width as f64 * DEFAULT_PIXEL_SIZE;

        let geometry = DetectorGeometry::new(
            width,
            height,
            1,
            distance_mm,
            tilt_deg.to_radians(),
            energy_ev / 1000.0,
        )?
        .with_detector_angles(0.0, -FRAC_PI_2)?
        .with_pattern_center(pattern_center_x, pattern_center_y)?;

        let style = BandStyle::default()
            .with_profile(BandProfile::Flat)
            .with_weight_by_intensity(intensity)
            .with_background(Some(DEFAULT_BACKGROUND));

        Self::from_config(
            SimulatorConfig::new(geometry)
                .with_max_reflectors(Some(number_of_reflectors))
                .with_style(style),
        )
    }

    pub fn from_config(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        let projector = PatternProjector::new(&config.geometry)
            .with_obliquity_attenuation(config.obliquity_attenuation);
        debug!(
            "Simulator {}x{} px, λ = {:.5} Å",
            config.geometry.width(),
            config.geometry.height(),
            projector.wavelength()
        );
        Ok(Self {
            config,
            projector,
            fcc_planes: OnceLock::new(),
            bcc_planes: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn geometry(&self) -> &DetectorGeometry {
        &self.config.geometry
    }

    /// 默认 FCC 结构（硅，a = 5.43 Å）的晶面族
    pub fn fcc_planes(&self) -> Result<&[DiffractingPlane]> {
        cached_planes(&self.fcc_planes, &CrystalStructure::silicon_fcc(), self.config.max_index_order)
    }

    /// 默认 BCC 结构（铁，a = 2.8665 Å）的晶面族
    pub fn bcc_planes(&self) -> Result<&[DiffractingPlane]> {
        cached_planes(&self.bcc_planes, &CrystalStructure::iron_bcc(), self.config.max_index_order)
    }

    /// FCC 硅在给定 Bunge 欧拉角（弧度）下的花样
    pub fn pattern_fcc(&self, phi1: f64, phi: f64, phi2: f64) -> Result<SimulatedPattern> {
        self.pattern(self.fcc_planes()?, &Orientation::new(phi1, phi, phi2))
    }

    /// BCC 铁在给定 Bunge 欧拉角（弧度）下的花样
    pub fn pattern_bcc(&self, phi1: f64, phi: f64, phi2: f64) -> Result<SimulatedPattern> {
        self.pattern(self.bcc_planes()?, &Orientation::new(phi1, phi, phi2))
    }

    /// 任意晶体结构的花样（每次调用都重新枚举晶面）
    pub fn simulate(
        &self,
        structure: &CrystalStructure,
        orientation: &Orientation,
    ) -> Result<SimulatedPattern> {
        let planes = enumerate_planes(structure, self.config.max_index_order)?;
        self.pattern(&planes, orientation)
    }

    /// 给定晶面集合的花样
    pub fn pattern(
        &self,
        planes: &[DiffractingPlane],
        orientation: &Orientation,
    ) -> Result<SimulatedPattern> {
        let grid = self.intensity(planes, orientation)?;
        let pattern = match self.config.style.background {
            Some(_) => grid.quantize(),
            None => grid.normalize(),
        };
        Ok(pattern.mirrored(self.config.mirror))
    }

    /// 归一化之前的强度网格
    pub fn intensity(
        &self,
        planes: &[DiffractingPlane],
        orientation: &Orientation,
    ) -> Result<IntensityGrid> {
        orientation.validate()?;
        let bands = self.bands(planes, orientation);
        let geometry = &self.config.geometry;
        let reflectors: usize = planes.iter().map(|p| p.multiplicity()).sum();
        info!(
            "Rasterizing {} bands from {} reflectors",
            bands.len(),
            reflectors.min(self.config.max_reflectors.unwrap_or(usize::MAX))
        );
        Ok(rasterize(
            &bands,
            geometry.width(),
            geometry.height(),
            &self.config.style,
        ))
    }

    /// 投影得到的全部带，按晶面族顺序、族内成员顺序排列
    ///
    /// `max_reflectors` 在投影之前截取，与荧光屏平行而被跳过的晶面同样计数。
    pub fn bands(&self, planes: &[DiffractingPlane], orientation: &Orientation) -> Vec<Band> {
        let limit = self.config.max_reflectors.unwrap_or(usize::MAX);
        let rotation = self.projector.crystal_to_detector(orientation);
        planes
            .iter()
            .flat_map(|plane| plane.members().iter().map(move |&hkl| (plane, hkl)))
            .take(limit)
            .filter_map(|(plane, hkl)| self.projector.project_member(plane, hkl, &rotation))
            .collect()
    }
}

/// 首次调用时枚举并缓存
fn cached_planes<'a>(
    cache: &'a OnceLock<Vec<DiffractingPlane>>,
    structure: &CrystalStructure,
    max_index_order: u32,
) -> Result<&'a [DiffractingPlane]> {
    if let Some(planes) = cache.get() {
        return Ok(planes.as_slice());
    }
    let planes = enumerate_planes(structure, max_index_order)?;
    Ok(cache.get_or_init(|| planes).as_slice())
}
