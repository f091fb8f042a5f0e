//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `export`: 结果容器导出为可视化格式
//! - `inspect`: 查看容器中的数据树
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: export, inspect

pub mod export;
pub mod inspect;

use clap::{Parser, Subcommand};

/// voxport - 体数据结果导出工具
#[derive(Parser)]
#[command(name = "voxport")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Export computed volumetric results to HDF5 and visualization formats", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Export result containers to cube, ZIBAmira, VMD and HDF5 files
    Export(export::ExportArgs),

    /// Show the data tree stored in a container
    Inspect(inspect::InspectArgs),
}
