//! # voxport - 体数据结果导出工具
//!
//! 把计算得到的体数据（电子密度、分子轨道、几何结构）写成层次化结果容器，
//! 并导出为可视化工具使用的文本格式。
//!
//! ## 子命令
//! - `export`  - 结果容器导出为 h5 / cube / ZIBAmira / VMD 文件
//! - `inspect` - 查看容器中的数据树
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (批量并行处理)
//!   │     ├── output/    (输出调度器)
//!   │     ├── writers/   (格式写入器)
//!   │     └── h5/        (容器读写与序列化引擎)
//!   ├── models/     (数据模型)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod h5;
mod models;
mod output;
mod utils;
mod writers;

use clap::Parser;
use cli::Cli;

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    utils::logging::init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
