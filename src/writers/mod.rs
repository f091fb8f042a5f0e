//! # 格式写入器模块
//!
//! 可视化工具使用的各种文本格式写入器。每个写入器接收显式的
//! 数据、几何与网格描述，写出 `<base>.<ext>` 并返回文件路径。
//!
//! ## 支持格式
//! - `cube`: Gaussian cube 体数据 (.cb)
//! - `amira`: ZIBAmira 网格 (.am)
//! - `colormap`: ZIBAmira 颜色表 (.cmap)
//! - `hx`: ZIBAmira 网络脚本 (.hx)
//! - `vmd`: VMD 网络脚本 (.vmd)
//! - `pdb` / `xyz`: 分子结构坐标 (.pdb, .xyz)
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 调用
//! - 使用 `models/`

pub mod amira;
pub mod colormap;
pub mod cube;
pub mod hx;
pub mod pdb;
mod templates;
pub mod vmd;
pub mod xyz;

use crate::error::{Result, VoxportError};
use crate::models::{Geometry, GridDescriptor};

use ndarray::{ArrayD, ArrayView3, Ix3};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// a₀ → Å
pub const BOHR_TO_ANGSTROM: f64 = 0.52917720859;

/// 在基础名后追加扩展名（不替换基础名中已有的点号部分）
pub fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// 写入文本文件
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| VoxportError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "wrote file");
    Ok(())
}

/// 将数据视为与网格一致的三维数组；一维（向量网格）数据不被支持
pub(crate) fn as_grid3<'a>(
    data: &'a ArrayD<f64>,
    grid: &GridDescriptor,
    format: &str,
) -> Result<ArrayView3<'a, f64>> {
    if data.ndim() != 3 {
        return Err(VoxportError::FormatUnsupported(format!(
            "{} output needs data on a regular 3D grid (got {} dimension(s))",
            format,
            data.ndim()
        )));
    }
    grid.check_shape(data.shape())?;
    data.view()
        .into_dimensionality::<Ix3>()
        .map_err(|e| VoxportError::MalformedInput(e.to_string()))
}

/// 每个原子一个部分电荷，缺省为零
pub(crate) fn partial_charges(geometry: &Geometry, charges: Option<&[f64]>) -> Result<Vec<f64>> {
    match charges {
        Some(q) if q.len() != geometry.len() => Err(VoxportError::MalformedInput(format!(
            "Got {} partial charges for {} atoms",
            q.len(),
            geometry.len()
        ))),
        Some(q) => Ok(q.to_vec()),
        None => Ok(vec![0.0; geometry.len()]),
    }
}

/// `%.6E` 风格科学计数法（指数至少两位）
pub fn fmt_sci(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{}", value).to_uppercase();
    }
    let raw = format!("{:.*E}", precision, value);
    match raw.split_once('E') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}E{}{:02}", mantissa, sign, exp.abs())
        }
        None => raw,
    }
}

/// `%g` 风格：6 位有效数字，去掉末尾零
pub fn fmt_g(value: f64) -> String {
    const PRECISION: i32 = 6;
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    if !value.is_finite() {
        return format!("{}", value).to_lowercase();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
