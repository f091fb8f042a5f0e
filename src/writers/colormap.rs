//! # ZIBAmira 颜色表写入器
//!
//! 生成 `.cmap`（ColormapVisage2.0）文件，由有序的不透明度/颜色控制点组成。
//!
//! ## 两种模式
//! - 百分位模式：按数据分布的 `start`..`stop` 百分位确定等值面范围，
//!   均匀放置 `n_peaks` 个峰
//! - 峰值模式：显式给出峰位，每个峰左右各一个零不透明度控制点
//!
//! ## 依赖关系
//! - 被 `writers/hx.rs` 调用，参数来自 `output/options.rs`
//! - 无外部模块依赖

use crate::error::{Result, VoxportError};
use crate::writers::{with_extension, write_file};

use std::path::{Path, PathBuf};

/// 百分位颜色表参数
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileColormap {
    pub n_peaks: usize,
    pub start: f64,
    pub stop: f64,
    pub peak_width: f64,
}

impl Default for PercentileColormap {
    fn default() -> Self {
        PercentileColormap {
            n_peaks: 5,
            start: 0.01,
            stop: 0.999,
            peak_width: 0.1,
        }
    }
}

/// 峰颜色
#[derive(Debug, Clone, PartialEq)]
pub enum PeakColor {
    /// 所有峰同一灰度
    Grey(f64),
    /// 每个峰一个灰度
    GreyPerPeak(Vec<f64>),
    /// 所有峰同一 RGB
    Rgb([f64; 3]),
    /// 每个峰一个 RGB
    RgbPerPeak(Vec<[f64; 3]>),
}

impl PeakColor {
    /// 展开为每个峰的 RGB
    fn expand(&self, n: usize) -> Result<Vec<[f64; 3]>> {
        let per_peak = |len: usize| {
            if len == n {
                Ok(())
            } else {
                Err(VoxportError::MalformedInput(format!(
                    "Expected {} peak colors, got {}",
                    n, len
                )))
            }
        };
        match self {
            PeakColor::Grey(g) => Ok(vec![[*g; 3]; n]),
            PeakColor::Rgb(rgb) => Ok(vec![*rgb; n]),
            PeakColor::GreyPerPeak(greys) => {
                per_peak(greys.len())?;
                Ok(greys.iter().map(|g| [*g; 3]).collect())
            }
            PeakColor::RgbPerPeak(colors) => {
                per_peak(colors.len())?;
                Ok(colors.clone())
            }
        }
    }
}

/// 峰值颜色表参数
#[derive(Debug, Clone, PartialEq)]
pub struct PeakColormap {
    pub peaks: Vec<f64>,
    pub peak_width: f64,
    /// 下边界（无高度的峰），默认最小峰位减 2 倍峰宽
    pub peak_minus: Option<f64>,
    /// 上边界，默认最大峰位加 2 倍峰宽
    pub peak_plus: Option<f64>,
    /// 峰的透明度（opacity = 1 - alpha）
    pub alpha: f64,
    pub color: PeakColor,
}

impl PeakColormap {
    pub fn new(peaks: Vec<f64>) -> Self {
        PeakColormap {
            peaks,
            peak_width: 0.02,
            peak_minus: None,
            peak_plus: None,
            alpha: 0.2,
            color: PeakColor::Grey(0.2),
        }
    }
}

/// `hx` 网络使用的颜色表
#[derive(Debug, Clone, PartialEq)]
pub enum Colormap {
    Percentile(PercentileColormap),
    Peaks(PeakColormap),
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::Percentile(PercentileColormap::default())
    }
}

impl Colormap {
    /// 写出 `<base>.cmap`；峰值模式不使用数据
    pub fn write(&self, data: &[f64], base: &Path) -> Result<PathBuf> {
        match self {
            Colormap::Percentile(params) => write_colormap(data, base, params),
            Colormap::Peaks(params) => write_peak_colormap(base, params),
        }
    }
}

/// 控制点
#[derive(Debug, Clone, Copy, PartialEq)]
struct Control {
    opacity: f64,
    rgb: [f64; 3],
    value: f64,
}

impl Control {
    fn blank(value: f64) -> Self {
        Control {
            opacity: 0.0,
            rgb: [0.0; 3],
            value,
        }
    }
}

/// 数据第 `start`..`stop` 百分位处的值
pub fn determine_rho_range(data: &[f64], start: f64, stop: f64) -> Result<(f64, f64)> {
    if data.is_empty() {
        return Err(VoxportError::MalformedInput(
            "Cannot derive a colormap from empty data".to_string(),
        ));
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let last = sorted.len() - 1;
    let n1 = ((start * sorted.len() as f64) as usize).min(last);
    let n2 = ((stop * sorted.len() as f64) as usize).min(last);
    Ok((sorted[n1], sorted[n2]))
}

/// 百分位模式的控制点
fn percentile_controls(data: &[f64], params: &PercentileColormap) -> Result<Vec<Control>> {
    if params.n_peaks < 2 {
        return Err(VoxportError::MalformedInput(format!(
            "Colormap needs at least 2 peaks, got {}",
            params.n_peaks
        )));
    }
    let (rho_min, rho_max) = determine_rho_range(data, params.start, params.stop)?;
    let delta = (rho_max - rho_min) / (params.n_peaks - 1) as f64;

    let mut controls = vec![Control::blank(0.0)];
    let mut last_plus = 0.0;
    for i in 0..params.n_peaks {
        let peak = rho_min + delta * (i + 1) as f64;
        let minus = peak * (1.0 - params.peak_width / 2.0);
        let plus = peak * (1.0 + params.peak_width / 2.0);
        let grey = 1.0 - ((i + 1) as f64 / (params.n_peaks + 1) as f64 * 0.9);

        controls.push(Control {
            opacity: 0.0,
            rgb: [grey; 3],
            value: minus,
        });
        controls.push(Control {
            opacity: 1.0 - grey,
            rgb: [grey; 3],
            value: peak,
        });
        controls.push(Control {
            opacity: 0.0,
            rgb: [grey; 3],
            value: plus,
        });
        last_plus = plus;
    }
    controls.push(Control::blank(last_plus * 1.5));
    Ok(controls)
}

/// 峰值模式的控制点
fn peak_controls(params: &PeakColormap) -> Result<Vec<Control>> {
    if params.peaks.is_empty() {
        return Err(VoxportError::MalformedInput(
            "Peak colormap needs at least one peak".to_string(),
        ));
    }
    let mut peaks = params.peaks.clone();
    peaks.sort_by(|a, b| a.total_cmp(b));
    let colors = params.color.expand(peaks.len())?;

    let lower = params
        .peak_minus
        .unwrap_or(peaks[0] - 2.0 * params.peak_width);
    let upper = params
        .peak_plus
        .unwrap_or(peaks[peaks.len() - 1] + 2.0 * params.peak_width);

    let mut controls = vec![Control::blank(lower)];
    for (p, rgb) in peaks.iter().zip(colors) {
        controls.push(Control {
            opacity: 0.0,
            rgb,
            value: p - params.peak_width / 2.0,
        });
        controls.push(Control {
            opacity: 1.0 - params.alpha,
            rgb,
            value: *p,
        });
        controls.push(Control {
            opacity: 0.0,
            rgb,
            value: p + params.peak_width / 2.0,
        });
    }
    controls.push(Control::blank(upper));
    Ok(controls)
}

fn render(name: &str, controls: &[Control]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE Colormap>\n");
    out.push_str(&format!("<ColormapVisage2.0 Name=\"{}\">\n", name));
    out.push_str("  <Graph Active=\"1\" Type=\"0\" Name=\"\">\n");
    for (i, c) in controls.iter().enumerate() {
        out.push_str(&format!(
            "    <Control Opacity=\"{:.6}\" Number=\"{}\" Blue=\"{:.6}\" Red=\"{:.6}\" Green=\"{:.6}\" Value=\"{:.6}\"/>\n",
            c.opacity, i, c.rgb[2], c.rgb[0], c.rgb[1], c.value
        ));
    }
    out.push_str("  </Graph>\n");
    out.push_str("</ColormapVisage2.0>");
    out
}

fn colormap_name(base: &Path) -> String {
    base.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| base.display().to_string())
}

/// 根据数据分布写出 `<base>.cmap`
pub fn write_colormap(data: &[f64], base: &Path, params: &PercentileColormap) -> Result<PathBuf> {
    let path = with_extension(base, "cmap");
    let controls = percentile_controls(data, params)?;
    write_file(&path, &render(&colormap_name(base), &controls))?;
    Ok(path)
}

/// 根据显式峰位写出 `<base>.cmap`
pub fn write_peak_colormap(base: &Path, params: &PeakColormap) -> Result<PathBuf> {
    let path = with_extension(base, "cmap");
    let controls = peak_controls(params)?;
    write_file(&path, &render(&colormap_name(base), &controls))?;
    Ok(path)
}
