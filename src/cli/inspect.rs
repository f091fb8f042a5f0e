//! # inspect 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/inspect.rs`

use clap::Args;
use std::path::PathBuf;

/// inspect 子命令参数
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Container file to read
    pub file: PathBuf,

    /// Path inside the container (default: root)
    #[arg(default_value = "/")]
    pub path: String,

    /// Print the subtree as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Maximum number of array elements shown per row in the table
    #[arg(long, default_value_t = 6)]
    pub preview: usize,
}
