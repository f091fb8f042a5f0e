//! # VMD 网络写入器
//!
//! 写出 `.vmd` Tcl 脚本，为每个引用的 cube 文件生成一个分子块
//! （CPK 表示 + 正负两个等值面）。分子名取 cube 文件的注释行，
//! 注释为空时使用文件名。
//!
//! 未给出 cube 文件列表时，扫描输出目录下的 `.cb` 文件。
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 调用
//! - 使用 `writers/templates.rs`

use crate::error::{Result, VoxportError};
use crate::writers::templates::{VMD_MOLECULE, VMD_NETWORK};
use crate::writers::{with_extension, write_file};

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// VMD 网络参数
#[derive(Debug, Clone, PartialEq)]
pub struct VmdOptions {
    /// (负, 正) 等值面值
    pub iso: (f64, f64),
    /// 是否在脚本中启用渲染命令
    pub render: bool,
    /// 使用绝对路径引用 cube 文件
    pub abspath: bool,
}

impl Default for VmdOptions {
    fn default() -> Self {
        VmdOptions {
            iso: (-0.01, 0.01),
            render: false,
            abspath: true,
        }
    }
}

/// 写出 `<base>.vmd`
pub fn write_vmd_network(
    base: &Path,
    cube_files: Option<&[PathBuf]>,
    options: &VmdOptions,
) -> Result<PathBuf> {
    let out_dir = match base.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let cubes = match cube_files {
        Some(files) => files.to_vec(),
        None => find_cube_files(&out_dir)?,
    };

    let mut molecules = String::new();
    for (i, cube) in cubes.iter().enumerate() {
        let title = cube_title(cube)?;
        let reference = if options.abspath {
            fs::canonicalize(cube).map_err(|e| VoxportError::FileReadError {
                path: cube.display().to_string(),
                source: e,
            })?
        } else {
            cube.strip_prefix(&out_dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| cube.clone())
        };

        molecules.push_str(
            &VMD_MOLECULE
                .replace("INDEX", &i.to_string())
                .replace("ISORED", &format!("{:.6}", options.iso.0))
                .replace("ISOBLUE", &format!("{:.6}", options.iso.1))
                .replace("RENDER", if options.render { "" } else { "#" })
                .replace("TITLE", &title)
                .replace("CUBEFILE", &reference.display().to_string()),
        );
    }

    let path = with_extension(base, "vmd");
    write_file(&path, &VMD_NETWORK.replace("MOLECULES", &molecules))?;
    Ok(path)
}

/// 目录下所有 `.cb` 文件（按名称排序）
fn find_cube_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| VoxportError::FileReadError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut cubes: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "cb"))
        .collect();
    cubes.sort();

    if cubes.is_empty() {
        return Err(VoxportError::NotFound {
            path: format!("{}/*.cb", dir.display()),
        });
    }
    Ok(cubes)
}

/// cube 文件第二行（注释行）去除空白后作为标题
fn cube_title(cube: &Path) -> Result<String> {
    let file = File::open(cube).map_err(|e| VoxportError::FileReadError {
        path: cube.display().to_string(),
        source: e,
    })?;

    let comment = BufReader::new(file)
        .lines()
        .nth(1)
        .transpose()
        .map_err(|e| VoxportError::FileReadError {
            path: cube.display().to_string(),
            source: e,
        })?
        .unwrap_or_default();

    let title: String = comment.chars().filter(|c| !c.is_whitespace()).collect();
    if title.is_empty() {
        Ok(cube
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default())
    } else {
        Ok(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_cube(dir: &Path, name: &str, comment: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("voxport calculation\n {}\n    0\n", comment)).unwrap();
        path
    }

    #[test]
    fn test_vmd_with_explicit_cubes() {
        let dir = tempfile::tempdir().unwrap();
        let cube = fake_cube(dir.path(), "rho.cb", "");

        let options = VmdOptions {
            abspath: false,
            ..VmdOptions::default()
        };
        let path =
            write_vmd_network(&dir.path().join("rho"), Some(&[cube]), &options).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.contains("mol new {rho.cb} type cube"));
        assert!(content.contains("mol rename top {rho}"));
        assert!(content.contains("Isosurface -0.010000"));
        assert!(content.contains("Isosurface 0.010000"));
        assert!(content.contains("#render TachyonInternal rho.tga"));
        assert!(!content.contains("MOLECULES"));
    }

    #[test]
    fn test_vmd_scans_directory_and_uses_titles() {
        let dir = tempfile::tempdir().unwrap();
        fake_cube(dir.path(), "b.cb", "MO 2");
        fake_cube(dir.path(), "a.cb", "MO 1");
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let options = VmdOptions {
            render: true,
            ..VmdOptions::default()
        };
        let path = write_vmd_network(&dir.path().join("all"), None, &options).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        let first = content.find("mol rename top {MO1}").unwrap();
        let second = content.find("mol rename top {MO2}").unwrap();
        assert!(first < second);
        assert!(content.contains("\nrender TachyonInternal MO1.tga"));
        assert!(!content.contains("notes.txt"));
    }

    #[test]
    fn test_vmd_without_cubes_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_vmd_network(&dir.path().join("x"), None, &VmdOptions::default());
        assert!(matches!(result, Err(VoxportError::NotFound { .. })));
    }
}
