//! # 输出调度模块
//!
//! 决定每次调用写出哪些格式，并驱动结果容器与各文本写入器。
//!
//! ## 子模块
//! - `options`: 输出参数
//! - `format`: 格式标记与隐含依赖
//! - `dispatch`: 逐帧调度
//! - `structure`: 结构坐标文件
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 使用
//! - 使用 `h5/`、`writers/`

pub mod dispatch;
pub mod format;
pub mod options;
pub mod structure;

pub use dispatch::{produce_outputs, OutputRequest, Produced};
pub use format::OutputFormat;
pub use options::OutputOptions;
pub use structure::{write_structures, StructureFormat};
