//! # 统一错误处理模块
//!
//! 定义 voxport 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `NotFound`: 读取时容器路径不存在
//! - `FormatUnsupported`: 请求的格式与向量网格数据不兼容（调度器降级为警告）
//! - `FileReadError` / `FileWriteError` / `Container`: 底层存储 I/O 失败
//! - `MalformedInput`: 重复或非法键、数据形状不匹配等
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// voxport 统一错误类型
#[derive(Error, Debug)]
pub enum VoxportError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HDF5 container error in {path}: {source}")]
    Container {
        path: String,
        #[source]
        source: hdf5::Error,
    },

    #[error("Not found: {path}")]
    NotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 格式与数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported format: {0}")]
    FormatUnsupported(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl VoxportError {
    /// 包装 HDF5 错误并附带容器路径
    pub fn container(path: impl Into<String>, source: hdf5::Error) -> Self {
        VoxportError::Container {
            path: path.into(),
            source,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, VoxportError>;
