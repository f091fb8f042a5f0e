//! # Gaussian cube 写入器
//!
//! ## 格式说明
//! ```text
//! voxport calculation
//!  <comments>
//!     N    x0          y0          z0           # 原子数 + 原点
//!    Nx    dx          0.000000    0.000000     # 三行轴定义，仅对角线非零
//!    ...
//!     Z    charge      x           y           z  # 每个原子一行
//!   v000 v001 ...                               # 数据，z 最快，每行 6 个
//! ```
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 调用
//! - 使用 `models/geometry.rs`、`models/grid.rs`

use crate::error::Result;
use crate::models::{Geometry, GridDescriptor};
use crate::writers::{as_grid3, fmt_sci, with_extension, write_file};

use ndarray::ArrayD;
use std::path::{Path, PathBuf};

/// 每行数据个数
const VALUES_PER_LINE: usize = 6;

/// 写出 `<base>.cb`
pub fn write_cube(
    data: &ArrayD<f64>,
    base: &Path,
    geometry: &Geometry,
    grid: &GridDescriptor,
    comments: &str,
) -> Result<PathBuf> {
    let path = with_extension(base, "cb");
    let content = to_cube_string(data, geometry, grid, comments)?;
    write_file(&path, &content)?;
    Ok(path)
}

/// 生成 cube 文件内容
pub fn to_cube_string(
    data: &ArrayD<f64>,
    geometry: &Geometry,
    grid: &GridDescriptor,
    comments: &str,
) -> Result<String> {
    let rho = as_grid3(data, grid, "cube")?;

    let mut out = String::with_capacity(64 * (geometry.len() + 6) + 14 * rho.len());
    out.push_str("voxport calculation\n");
    out.push_str(&format!(" {}\n", comments));

    out.push_str(&format!("{:>5}", geometry.len()));
    for v in grid.origin {
        out.push_str(&format!("{:>12.6}", v));
    }

    for i in 0..3 {
        out.push_str(&format!("\n{:>5}", grid.counts[i]));
        for j in 0..3 {
            let step = if i == j { grid.delta[i] } else { 0.0 };
            out.push_str(&format!("{:>12.6}", step));
        }
    }

    for (atom, r) in geometry.atoms.iter().zip(&geometry.coords) {
        out.push_str(&format!("\n{:>5}{:>12.6}", atom.atomic_number(), atom.charge));
        for v in r {
            out.push_str(&format!("{:>12.6}", v));
        }
    }
    out.push('\n');

    let mut count = 0;
    for v in rho.iter() {
        out.push_str(&format!("{:>13}", fmt_sci(*v, 6)));
        count += 1;
        if count % VALUES_PER_LINE == 0 {
            out.push('\n');
        }
    }
    if count % VALUES_PER_LINE != 0 {
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoxportError;
    use crate::models::AtomRecord;

    use ndarray::IxDyn;

    fn hydrogen() -> Geometry {
        Geometry::new(vec![AtomRecord::new("H", 1.0, "1")], vec![[0.0, 0.0, 0.5]]).unwrap()
    }

    #[test]
    fn test_cube_2x2x2_one_atom() {
        let grid = GridDescriptor::uniform([-1.0, -1.0, -1.0], [2.0, 2.0, 2.0], [2, 2, 2]);
        let data = ArrayD::from_shape_fn(IxDyn(&[2, 2, 2]), |d| {
            (d[0] * 4 + d[1] * 2 + d[2]) as f64 * 0.01
        });

        let content = to_cube_string(&data, &hydrogen(), &grid, "density").unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "voxport calculation");
        assert_eq!(lines[1], " density");
        assert_eq!(lines[2], "    1   -1.000000   -1.000000   -1.000000");
        assert_eq!(lines[3], "    2    2.000000    0.000000    0.000000");
        assert_eq!(lines[5], "    2    0.000000    0.000000    2.000000");
        assert_eq!(lines[6], "    1    1.000000    0.000000    0.000000    0.500000");

        let data_lines = &lines[7..];
        assert_eq!(data_lines.len(), 2);
        assert_eq!(data_lines[0].split_whitespace().count(), 6);
        assert_eq!(data_lines[1].split_whitespace().count(), 2);

        let values: Vec<f64> = data_lines
            .iter()
            .flat_map(|l| l.split_whitespace())
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(values.len(), 8);
        // z 最快
        assert!((values[1] - 0.01).abs() < 1e-12);
        assert!((values[2] - 0.02).abs() < 1e-12);
        assert!((values[7] - 0.07).abs() < 1e-12);
        assert!(data_lines[0].starts_with(" 0.000000E+00 1.000000E-02"));
    }

    #[test]
    fn test_cube_rejects_vector_data() {
        let grid = GridDescriptor::uniform([0.0; 3], [1.0; 3], [2, 2, 2]);
        let data = ArrayD::zeros(IxDyn(&[8]));
        let result = to_cube_string(&data, &hydrogen(), &grid, "");
        assert!(matches!(result, Err(VoxportError::FormatUnsupported(_))));
    }

    #[test]
    fn test_write_cube_file() {
        let dir = tempfile::tempdir().unwrap();
        let grid = GridDescriptor::uniform([0.0; 3], [1.0; 3], [1, 1, 6]);
        let data = ArrayD::from_elem(IxDyn(&[1, 1, 6]), 1.5);

        let path = write_cube(&data, &dir.path().join("rho"), &hydrogen(), &grid, "").unwrap();
        assert_eq!(path.file_name().unwrap(), "rho.cb");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("1.500000E+00\n"));
        assert!(!content.ends_with("\n\n"));
    }
}
