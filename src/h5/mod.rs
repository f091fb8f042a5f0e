//! # HDF5 容器模块
//!
//! 层次容器的打开/关闭、通用数据树的序列化与反序列化，
//! 以及计算结果文件的读写。
//!
//! ## 依赖关系
//! - 被 `output/` 和 `commands/` 使用
//! - 使用 `models/`
//! - 子模块: container, write, read, result

pub mod container;
pub mod read;
pub mod result;
pub mod write;

pub use container::Container;
pub use read::read;
pub use result::{append_geometry, read_result, write_result, ResultFile};
pub use write::write;
