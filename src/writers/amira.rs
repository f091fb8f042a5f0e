//! # ZIBAmira 网格写入器
//!
//! 写出 AmiraMesh 3D ASCII 2.0 文件：
//! - 均匀网格：`CoordType "uniform"` + 包围盒，数据按 x 最快排列
//! - 非均匀网格：`CoordType "rectilinear"`，数据段 `@1` 之后
//!   追加坐标段 `@2`（x、y、z 坐标依次排列）
//!
//! 在 Amira 中打开后可通过 Compute → Arithmetic 转为规则网格显示。
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 调用
//! - 使用 `models/grid.rs`

use crate::error::Result;
use crate::models::GridDescriptor;
use crate::writers::{as_grid3, fmt_g, with_extension, write_file};

use ndarray::{ArrayD, ArrayView3};
use std::path::{Path, PathBuf};

/// 写出 `<base>.am`，网格类型决定均匀或非均匀变体
pub fn write_amira(data: &ArrayD<f64>, base: &Path, grid: &GridDescriptor) -> Result<PathBuf> {
    let path = with_extension(base, "am");
    let content = to_amira_string(data, grid)?;
    write_file(&path, &content)?;
    Ok(path)
}

pub fn to_amira_string(data: &ArrayD<f64>, grid: &GridDescriptor) -> Result<String> {
    let rho = as_grid3(data, grid, "amira")?;
    let [nx, ny, nz] = grid.counts;
    let coord_type = if grid.is_uniform() {
        "uniform"
    } else {
        "rectilinear"
    };

    let mut out = String::with_capacity(256 + 16 * rho.len());
    out.push_str("# AmiraMesh 3D ASCII 2.0\n\n\n");
    out.push_str(&format!("define Lattice {} {} {}\n", nx, ny, nz));
    out.push_str(&format!("define Coordinates {}\n\n", nx + ny + nz));
    out.push_str("Parameters {\n");
    out.push_str(&format!(
        "    Content \"{}x{}x{} float, {} coordinates\",\n",
        nx, ny, nz, coord_type
    ));

    if grid.is_uniform() {
        let min = grid.origin;
        let max = grid.max();
        out.push_str(&format!(
            "    BoundingBox {:.6} {:.6} {:.6} {:.6} {:.6} {:.6},\n",
            min[0], max[0], min[1], max[1], min[2], max[2]
        ));
        out.push_str("    CoordType \"uniform\"\n}\n\n");
        out.push_str("Lattice { float Data } @1\n");
        out.push_str("# Data section follows\n@1\n");
        push_x_fastest(&mut out, &rho, fmt_g);
    } else {
        out.push_str("    CoordType \"rectilinear\"\n}\n\n");
        out.push_str("Lattice { float Data } @1\n");
        out.push_str("Coordinates { float xyz } @2\n\n");
        out.push_str("# Data section follows\n@1\n");
        push_x_fastest(&mut out, &rho, |v| format!("{:.8}", v));
        out.push_str("\n@2\n");
        for i in 0..3 {
            for v in grid.axis(i) {
                out.push_str(&format!("{:.8}\n", v));
            }
        }
    }

    Ok(out)
}

fn push_x_fastest(out: &mut String, rho: &ArrayView3<f64>, fmt: impl Fn(f64) -> String) {
    let (nx, ny, nz) = rho.dim();
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                out.push_str(&fmt(rho[[i, j, k]]));
                out.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::IxDyn;

    #[test]
    fn test_uniform_amira() {
        let grid = GridDescriptor::uniform([0.0, 0.0, 0.0], [0.5, 1.0, 1.0], [2, 1, 2]);
        let data = ArrayD::from_shape_fn(IxDyn(&[2, 1, 2]), |d| (d[0] * 10 + d[2]) as f64);

        let content = to_amira_string(&data, &grid).unwrap();
        assert!(content.starts_with("# AmiraMesh 3D ASCII 2.0\n"));
        assert!(content.contains("define Lattice 2 1 2\n"));
        assert!(content.contains("define Coordinates 5\n"));
        assert!(content.contains("BoundingBox 0.000000 0.500000 0.000000 0.000000 0.000000 1.000000,"));
        assert!(content.contains("CoordType \"uniform\""));

        let data_section = content.split("@1\n").last().unwrap();
        let values: Vec<&str> = data_section.lines().collect();
        // x 最快: (0,0,0) (1,0,0) (0,0,1) (1,0,1)
        assert_eq!(values, vec!["0", "10", "1", "11"]);
    }

    #[test]
    fn test_rectilinear_amira() {
        let grid = GridDescriptor::from_axes(vec![0.0, 0.1, 0.5], vec![0.0], vec![0.0]).unwrap();
        let data = ArrayD::from_shape_vec(IxDyn(&[3, 1, 1]), vec![1.0, 2.0, 3.0]).unwrap();

        let content = to_amira_string(&data, &grid).unwrap();
        assert!(content.contains("CoordType \"rectilinear\""));
        assert!(content.contains("Coordinates { float xyz } @2"));
        assert!(!content.contains("BoundingBox"));

        let coords = content.split("\n@2\n").nth(1).unwrap();
        let coords: Vec<&str> = coords.lines().collect();
        assert_eq!(
            coords,
            vec!["0.00000000", "0.10000000", "0.50000000", "0.00000000", "0.00000000"]
        );
        assert!(content.contains("@1\n1.00000000\n2.00000000\n3.00000000\n"));
    }
}
