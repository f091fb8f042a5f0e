//! # ZIBAmira 网络写入器
//!
//! 写出 `.hx` 网络脚本，并按数据分布生成配套的 `.cmap` 颜色表。
//! 网络脚本引用同名 `.am` 文件，因此调度器总是先写网格文件。
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 调用
//! - 使用 `writers/colormap.rs`、`writers/templates.rs`

use crate::error::Result;
use crate::writers::colormap::Colormap;
use crate::writers::templates::HX_NETWORK;
use crate::writers::{with_extension, write_file};

use std::path::{Path, PathBuf};

/// 写出 `<base>.cmap` 与 `<base>.hx`，返回网络文件路径
pub fn write_hx_network(
    data: &[f64],
    base: &Path,
    colormap: &Colormap,
) -> Result<PathBuf> {
    colormap.write(data, base)?;

    let path = with_extension(base, "hx");
    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    write_file(&path, &HX_NETWORK.replace("FILENAME", &name))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hx_network_and_colormap() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("water_rho");
        let data: Vec<f64> = (0..64).map(|i| i as f64 * 0.01).collect();

        let path = write_hx_network(&data, &base, &Colormap::default()).unwrap();
        assert_eq!(path, dir.path().join("water_rho.hx"));
        assert!(dir.path().join("water_rho.cmap").exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("load ${SCRIPTDIR}/water_rho.am"));
        assert!(content.contains("Voltex colormap connect water_rho.cmap"));
        assert!(!content.contains("FILENAME"));
        assert!(!content.contains(dir.path().to_str().unwrap()));
    }
}
