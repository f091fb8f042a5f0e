//! # PDB 结构写入器
//!
//! 只写出原子坐标（Å），不含连接信息：
//! ```text
//! HEADER    <name>
//! AUTHOR    voxport
//! ATOM      1  O           1       0.000   0.000   0.117  1.00  +0.000000
//! MASTER        0    0    0    0    0    0    0    0    3    0    0    0
//! END
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `models/geometry.rs`

use crate::error::Result;
use crate::models::Geometry;
use crate::writers::{partial_charges, with_extension, write_file, BOHR_TO_ANGSTROM};

use std::path::{Path, PathBuf};

/// 写出 `<base>.pdb`
pub fn write_pdb(base: &Path, geometry: &Geometry, charges: Option<&[f64]>) -> Result<PathBuf> {
    let path = with_extension(base, "pdb");
    let header = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = to_pdb_string(geometry, &header, charges)?;
    write_file(&path, &content)?;
    Ok(path)
}

/// 生成 PDB 文件内容；未给出部分电荷时电荷列为零
pub fn to_pdb_string(geometry: &Geometry, header: &str, charges: Option<&[f64]>) -> Result<String> {
    let charges = partial_charges(geometry, charges)?;

    let mut result = String::new();
    result.push_str(&format!("HEADER    {}\n", header));
    result.push_str("AUTHOR    voxport\n");

    for (i, (atom, r)) in geometry.atoms.iter().zip(&geometry.coords).enumerate() {
        result.push_str(&format!("ATOM  {:>5}{:>3}{:>12}    ", i + 1, atom.symbol, 1));
        for v in r {
            result.push_str(&format!("{:>8.3}", v * BOHR_TO_ANGSTROM));
        }
        result.push_str(&format!("  1.00  {:+.6}\n", charges[i]));
    }

    result.push_str(&format!(
        "MASTER        0    0    0    0    0    0    0    0 {:>4}    0    0    0\n",
        geometry.len()
    ));
    result.push_str("END\n");
    Ok(result)
}
