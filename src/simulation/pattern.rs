//! # 花样网格
//!
//! 累加用的浮点强度网格，以及归一化后的 0-255 灰度花样。
//! 两者均为按行优先存储的稠密数组，由产生它们的调用独占。
//!
//! ## 依赖关系
//! - 被 `simulation/raster.rs` 和 `simulation/simulator.rs` 使用
//! - 被 `mask/` 用于遮罩花样

use serde::{Deserialize, Serialize};

/// 零方差网格归一化后的灰度值
pub const MID_GRAY: u8 = 128;

/// 输出镜像方式（匹配探测器的物理安装方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mirror {
    #[default]
    None,
    /// 左右翻转
    Horizontal,
    /// 上下翻转
    Vertical,
}

impl From<bool> for Mirror {
    fn from(mirror: bool) -> Self {
        if mirror {
            Mirror::Horizontal
        } else {
            Mirror::None
        }
    }
}

/// 浮点强度累加网格
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl IntensityGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// (最小值, 最大值)
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// 线性拉伸到 [0, 255]；零方差时输出均匀的中灰
    pub fn normalize(&self) -> SimulatedPattern {
        let (lo, hi) = self.min_max();
        let range = hi - lo;

        let pixels = if range > 0.0 && range.is_finite() {
            self.data
                .iter()
                .map(|&v| ((v - lo) / range * 255.0).round().clamp(0.0, 255.0) as u8)
                .collect()
        } else {
            vec![MID_GRAY; self.data.len()]
        };

        SimulatedPattern {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// 按绝对刻度量化：[0, 1] 映射到 [0, 255]，超出部分截断
    pub fn quantize(&self) -> SimulatedPattern {
        let pixels = self
            .data
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    0
                } else {
                    (v * 255.0).round().clamp(0.0, 255.0) as u8
                }
            })
            .collect();

        SimulatedPattern {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// 归一化后的灰度花样
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulatedPattern {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl SimulatedPattern {
    /// 由原始像素创建；宽高必须为正，长度必须等于 width × height
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        let valid = width > 0 && height > 0 && width.checked_mul(height) == Some(pixels.len());
        valid.then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// 行优先的原始像素，用于与参考图像逐字节比较
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// 所有像素是否相同
    pub fn is_uniform(&self) -> bool {
        self.pixels.windows(2).all(|w| w[0] == w[1])
    }

    /// 按镜像方式翻转
    pub fn mirrored(mut self, mirror: Mirror) -> Self {
        if self.pixels.is_empty() {
            return self;
        }
        match mirror {
            Mirror::None => {}
            Mirror::Horizontal => {
                for row in self.pixels.chunks_mut(self.width) {
                    row.reverse();
                }
            }
            Mirror::Vertical => {
                let flipped: Vec<u8> = self
                    .pixels
                    .chunks(self.width)
                    .rev()
                    .flatten()
                    .copied()
                    .collect();
                self.pixels = flipped;
            }
        }
        self
    }
}
