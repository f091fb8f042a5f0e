//! # XYZ 结构写入器
//!
//! 第一行为原子数，第二行为总能量（未知时留空），之后每个原子一行：
//! 元素符号与 Å 单位坐标，给出部分电荷时追加第五列。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `models/geometry.rs`

use crate::error::Result;
use crate::models::Geometry;
use crate::writers::{partial_charges, with_extension, write_file, BOHR_TO_ANGSTROM};

use std::path::{Path, PathBuf};

/// 写出 `<base>.xyz`
pub fn write_xyz(
    base: &Path,
    geometry: &Geometry,
    energy: Option<f64>,
    charges: Option<&[f64]>,
) -> Result<PathBuf> {
    let path = with_extension(base, "xyz");
    let content = to_xyz_string(geometry, energy, charges)?;
    write_file(&path, &content)?;
    Ok(path)
}

/// 生成 XYZ 文件内容
pub fn to_xyz_string(
    geometry: &Geometry,
    energy: Option<f64>,
    charges: Option<&[f64]>,
) -> Result<String> {
    if charges.is_some() {
        partial_charges(geometry, charges)?;
    }

    let mut result = String::new();
    match energy.filter(|e| *e != 0.0) {
        Some(e) => result.push_str(&format!("{}\n Energy = {:22.15} E_h\n", geometry.len(), e)),
        None => result.push_str(&format!("{}\n\n", geometry.len())),
    }

    for (i, (atom, r)) in geometry.atoms.iter().zip(&geometry.coords).enumerate() {
        result.push_str(&format!("{:<2}", atom.symbol));
        for v in r {
            result.push_str(&format!(" {:22.15}", v * BOHR_TO_ANGSTROM));
        }
        if let Some(q) = charges {
            result.push_str(&format!(" {:22.15}", q[i]));
        }
        result.push('\n');
    }

    Ok(result)
}
