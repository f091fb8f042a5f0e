//! # 结构坐标输出
//!
//! 与体数据帧无关，每个输入只写一次分子结构文件。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 和 `cli/export.rs` 使用
//! - 使用 `writers/pdb.rs`、`writers/xyz.rs`

use crate::error::Result;
use crate::models::Geometry;
use crate::writers::{pdb, xyz};

use clap::ValueEnum;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum StructureFormat {
    /// Protein Data Bank coordinates (.pdb)
    Pdb,
    /// XYZ coordinates (.xyz)
    Xyz,
}

/// 按请求写出结构文件，重复的格式只写一次
pub fn write_structures(
    base: &Path,
    geometry: &Geometry,
    formats: &[StructureFormat],
    energy: Option<f64>,
) -> Result<Vec<PathBuf>> {
    let mut formats = formats.to_vec();
    formats.sort();
    formats.dedup();

    formats
        .into_iter()
        .map(|format| match format {
            StructureFormat::Pdb => pdb::write_pdb(base, geometry, None),
            StructureFormat::Xyz => xyz::write_xyz(base, geometry, energy, None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AtomRecord;

    #[test]
    fn test_write_structures() {
        let dir = tempfile::tempdir().unwrap();
        let geometry =
            Geometry::new(vec![AtomRecord::new("He", 2.0, "1")], vec![[0.0, 0.0, 0.0]]).unwrap();
        let base = dir.path().join("he");

        let files = write_structures(
            &base,
            &geometry,
            &[StructureFormat::Xyz, StructureFormat::Pdb, StructureFormat::Xyz],
            Some(-2.86),
        )
        .unwrap();

        assert_eq!(files, vec![dir.path().join("he.pdb"), dir.path().join("he.xyz")]);
        let xyz = std::fs::read_to_string(dir.path().join("he.xyz")).unwrap();
        assert!(xyz.starts_with("1\n Energy = "));
    }
}
