//! # export 子命令 CLI 定义
//!
//! 将结果容器导出为一种或多种可视化格式。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/export.rs`

use crate::output::{OutputFormat, StructureFormat};

use clap::Args;
use std::path::PathBuf;

/// export 子命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Input: result container (.h5) or directory containing result containers
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Output formats, comma separated (h5, am, hx, cb/cube, vmd)
    #[arg(short, long, value_enum, value_delimiter = ',', default_value = "cb")]
    pub formats: Vec<OutputFormat>,

    /// Formats to leave out even when requested or implied
    #[arg(long, value_enum, value_delimiter = ',')]
    pub omit: Vec<OutputFormat>,

    /// Derivative axis tags; the primary array holds one frame per tag along its first axis
    #[arg(long, value_delimiter = ',')]
    pub drv: Option<Vec<String>>,

    /// Name of the primary dataset in the input container
    #[arg(long, default_value = "rho", env = "VOXPORT_DATA_ID")]
    pub data_id: String,

    /// Treat the data as a vector grid (only h5 can be written)
    #[arg(long, default_value_t = false)]
    pub vector: bool,

    /// Molecular structure files written once per input, comma separated (pdb, xyz)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub structure: Vec<StructureFormat>,

    /// Total energy in E_h for the xyz comment line
    #[arg(long, allow_negative_numbers = true)]
    pub energy: Option<f64>,

    /// Comment line for cube files
    #[arg(long, default_value = "")]
    pub comments: String,

    // ─────────────────────────────────────────────────────────────
    // HDF5 输出参数
    // ─────────────────────────────────────────────────────────────
    /// Write h5 output into this group of an existing (or new) container
    #[arg(long)]
    pub append: Option<String>,

    /// Write only the primary dataset to h5 output (geometry goes to the container root)
    #[arg(long, default_value_t = false)]
    pub data_only: bool,

    /// Store only the z axis in h5 output (z-reduced densities)
    #[arg(long, default_value_t = false)]
    pub z_reduced: bool,

    // ─────────────────────────────────────────────────────────────
    // 网络脚本参数
    // ─────────────────────────────────────────────────────────────
    /// Number of colormap peaks for ZIBAmira networks
    #[arg(long, default_value_t = 5)]
    pub peaks: usize,

    /// Explicit colormap peak positions, comma separated (overrides --peaks)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub cmap_peaks: Option<Vec<f64>>,

    /// Negative isovalue for VMD networks
    #[arg(long, default_value_t = -0.01, allow_negative_numbers = true)]
    pub iso_neg: f64,

    /// Positive isovalue for VMD networks
    #[arg(long, default_value_t = 0.01)]
    pub iso_pos: f64,

    /// Enable the render commands in VMD networks
    #[arg(long, default_value_t = false)]
    pub render: bool,

    /// Reference cube files by relative path in VMD networks
    #[arg(long, default_value_t = false)]
    pub relative_paths: bool,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (directory mode, e.g., "*.h5")
    #[arg(long, default_value = "*.h5")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
