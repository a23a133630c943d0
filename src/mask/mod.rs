//! # 探测器遮罩
//!
//! 在矩形像素网格上生成二值遮罩，用于把计算或分析限制在圆形探测器区域内。
//!
//! ## 判定规则
//! 像素 (x, y) 属于圆盘当且仅当 (x − cx)² + (y − cy)² ≤ r²（含边界），
//! 使用 i128 精确运算。半径为 0 时遮罩全为 false。圆心可以位于网格之外。
//!
//! ## 依赖关系
//! - 使用 `simulation/pattern.rs` 的 SimulatedPattern（遮罩花样）
//! - 被命令行 `mask` 与 `simulate` 子命令使用

use log::debug;

use crate::error::{KikuchiError, Result};
use crate::simulation::SimulatedPattern;

/// 遮罩生成器：给定网格尺寸生成一种形状的遮罩
pub trait MaskFactory {
    type Output;

    fn create(&self, width: usize, height: usize) -> Result<Self::Output>;
}

/// 行优先的二值网格
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryMap {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl BinaryMap {
    /// 由谓词逐像素生成
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// 被置位的像素数
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// 圆盘遮罩
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscMask {
    centroid_x: i64,
    centroid_y: i64,
    radius: i64,
    map: BinaryMap,
}

impl DiscMask {
    pub fn radius(&self) -> i64 {
        self.radius
    }

    pub fn centroid_x(&self) -> i64 {
        self.centroid_x
    }

    pub fn centroid_y(&self) -> i64 {
        self.centroid_y
    }

    pub fn centroid(&self) -> (i64, i64) {
        (self.centroid_x, self.centroid_y)
    }

    pub fn width(&self) -> usize {
        self.map.width()
    }

    pub fn height(&self) -> usize {
        self.map.height()
    }

    pub fn binary_map(&self) -> &BinaryMap {
        &self.map
    }

    /// 网格外的像素视为不在遮罩内
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.map.get(x, y).unwrap_or(false)
    }

    /// 将遮罩外的像素置 0
    pub fn apply(&self, pattern: &SimulatedPattern) -> Result<SimulatedPattern> {
        if pattern.width() != self.width() || pattern.height() != self.height() {
            return Err(KikuchiError::InvalidArgument(format!(
                "mask is {}x{} but pattern is {}x{}",
                self.width(),
                self.height(),
                pattern.width(),
                pattern.height()
            )));
        }

        let pixels = pattern
            .pixels()
            .iter()
            .zip(self.map.as_slice())
            .map(|(&p, &inside)| if inside { p } else { 0 })
            .collect();

        SimulatedPattern::from_pixels(self.width(), self.height(), pixels)
            .ok_or_else(|| KikuchiError::Other("masked pattern size mismatch".to_string()))
    }
}

/// 圆盘遮罩生成器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscMaskFactory {
    pub centroid_x: i64,
    pub centroid_y: i64,
    pub radius: i64,
}

impl DiscMaskFactory {
    pub fn new(centroid_x: i64, centroid_y: i64, radius: i64) -> Self {
        Self {
            centroid_x,
            centroid_y,
            radius,
        }
    }
}

impl MaskFactory for DiscMaskFactory {
    type Output = DiscMask;

    fn create(&self, width: usize, height: usize) -> Result<DiscMask> {
        if width == 0 {
            return Err(KikuchiError::config("width", "must be > 0"));
        }
        if height == 0 {
            return Err(KikuchiError::config("height", "must be > 0"));
        }
        if self.radius < 0 {
            return Err(KikuchiError::config(
                "radius",
                format!("must be >= 0, got {}", self.radius),
            ));
        }

        let (cx, cy, r) = (self.centroid_x, self.centroid_y, self.radius);
        let map = if r == 0 {
            BinaryMap::from_fn(width, height, |_, _| false)
        } else {
            // r² ≤ 2^126；平方和溢出 i128 时必然在圆外
            let r2 = i128::from(r) * i128::from(r);
            let (cx, cy) = (i128::from(cx), i128::from(cy));
            BinaryMap::from_fn(width, height, |x, y| {
                let dx = x as i128 - cx;
                let dy = y as i128 - cy;
                dx.checked_mul(dx)
                    .zip(dy.checked_mul(dy))
                    .and_then(|(a, b)| a.checked_add(b))
                    .is_some_and(|d2| d2 <= r2)
            })
        };

        debug!(
            "Disc mask {}x{} at ({}, {}) r = {}: {} pixels set",
            width,
            height,
            cx,
            cy,
            r,
            map.count()
        );

        Ok(DiscMask {
            centroid_x: cx,
            centroid_y: cy,
            radius: r,
            map,
        })
    }
}

/// 创建圆盘遮罩
pub fn create_disc_mask(
    width: usize,
    height: usize,
    centroid_x: i64,
    centroid_y: i64,
    radius: i64,
) -> Result<DiscMask> {
    DiscMaskFactory::new(centroid_x, centroid_y, radius).create(width, height)
}
