//! # 网格描述
//!
//! 显式的网格描述符：原点、各轴步长、各轴采样点数，
//! 以及可选的显式坐标数组（非均匀网格）。
//! 所有格式写入器都通过参数接收它。
//!
//! ## 依赖关系
//! - 被 `writers/` 和 `h5/result.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, VoxportError};

/// 均匀网格判定的相对容差
const UNIFORM_TOL: f64 = 1e-8;

/// 三维网格描述符
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    /// 各轴最小值
    pub origin: [f64; 3],
    /// 各轴步长
    pub delta: [f64; 3],
    /// 各轴采样点数
    pub counts: [usize; 3],
    /// 非均匀网格的显式坐标
    pub coords: Option<[Vec<f64>; 3]>,
}

impl GridDescriptor {
    /// 均匀网格
    pub fn uniform(origin: [f64; 3], delta: [f64; 3], counts: [usize; 3]) -> Self {
        GridDescriptor {
            origin,
            delta,
            counts,
            coords: None,
        }
    }

    /// 从各轴坐标数组构建；间距一致时视为均匀网格
    pub fn from_axes(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        let axes = [x, y, z];
        let mut origin = [0.0; 3];
        let mut delta = [0.0; 3];
        let mut counts = [0; 3];
        let mut uniform = true;

        for (i, axis) in axes.iter().enumerate() {
            if axis.is_empty() {
                return Err(VoxportError::MalformedInput(format!(
                    "Grid axis {} has no points",
                    i
                )));
            }
            origin[i] = axis[0];
            counts[i] = axis.len();
            if axis.len() > 1 {
                delta[i] = (axis[axis.len() - 1] - axis[0]) / (axis.len() - 1) as f64;
                uniform &= is_evenly_spaced(axis, delta[i]);
            }
        }

        Ok(GridDescriptor {
            origin,
            delta,
            counts,
            coords: if uniform { None } else { Some(axes) },
        })
    }

    /// 是否为均匀网格
    pub fn is_uniform(&self) -> bool {
        self.coords.is_none()
    }

    /// 第 `i` 轴坐标
    pub fn axis(&self, i: usize) -> Vec<f64> {
        match &self.coords {
            Some(coords) => coords[i].clone(),
            None => (0..self.counts[i])
                .map(|k| self.origin[i] + k as f64 * self.delta[i])
                .collect(),
        }
    }

    /// 各轴最大值
    pub fn max(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, v) in out.iter_mut().enumerate() {
            *v = match &self.coords {
                Some(coords) => coords[i].last().copied().unwrap_or(self.origin[i]),
                None => {
                    self.origin[i] + self.counts[i].saturating_sub(1) as f64 * self.delta[i]
                }
            };
        }
        out
    }

    /// 校验三维数据形状与网格一致
    pub fn check_shape(&self, shape: &[usize]) -> Result<()> {
        if shape != self.counts {
            return Err(VoxportError::MalformedInput(format!(
                "Data shape {:?} does not match grid {:?}",
                shape, self.counts
            )));
        }
        Ok(())
    }
}

fn is_evenly_spaced(axis: &[f64], delta: f64) -> bool {
    let scale = delta.abs().max(f64::MIN_POSITIVE);
    axis.windows(2)
        .all(|w| ((w[1] - w[0]) - delta).abs() <= UNIFORM_TOL * scale)
}
