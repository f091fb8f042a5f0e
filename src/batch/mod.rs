//! # 批量处理模块
//!
//! 为 `export` 提供多文件处理能力。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 收集匹配的结果容器
//! - 并行处理
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{ensure_unique_stems, output_stem, FileCollector};
pub use runner::{BatchResult, BatchRunner, ProcessResult};
