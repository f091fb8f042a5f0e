//! # HDF5 容器 I/O
//!
//! 打开/创建/追加 HDF5 容器文件。句柄在 drop 时关闭，
//! 因此任何返回路径（包括 `?` 提前返回的错误路径）都会释放文件。
//!
//! ## 依赖关系
//! - 被 `h5/result.rs`、`commands/inspect.rs` 使用
//! - 使用 `hdf5` crate

use crate::error::{Result, VoxportError};

use hdf5::{File, Group};
use std::path::Path;

/// 已打开的容器文件
pub struct Container {
    file: File,
    path: String,
}

impl Container {
    /// 创建新容器（已存在则截断）
    pub fn create(path: &Path) -> Result<Self> {
        let display_path = path.display().to_string();
        let file = File::create(path).map_err(|e| VoxportError::container(&display_path, e))?;
        tracing::debug!(path = %display_path, "created container");
        Ok(Container {
            file,
            path: display_path,
        })
    }

    /// 以读写方式打开，不存在则创建
    pub fn append(path: &Path) -> Result<Self> {
        let display_path = path.display().to_string();
        let file = File::append(path).map_err(|e| VoxportError::container(&display_path, e))?;
        tracing::debug!(path = %display_path, "opened container for append");
        Ok(Container {
            file,
            path: display_path,
        })
    }

    /// 只读打开
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(VoxportError::NotFound { path: display });
        }
        let file = File::open(path).map_err(|e| VoxportError::container(&display, e))?;
        Ok(Container {
            file,
            path: display,
        })
    }

    /// 根组
    pub fn root(&self) -> &Group {
        &self.file
    }

    /// 获取（必要时逐级创建）`a/b/c` 形式的组
    pub fn require_group(&self, path: &str) -> Result<Group> {
        let mut group: Group = self.root().clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            group = if group.link_exists(segment) {
                group.group(segment)
            } else {
                group.create_group(segment)
            }
            .map_err(|e| VoxportError::container(&self.path, e))?;
        }
        Ok(group)
    }

    /// 显式关闭并刷新
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.file
            .close()
            .map_err(|e| VoxportError::container(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Container::open(&dir.path().join("missing.h5"));
        assert!(matches!(result, Err(VoxportError::NotFound { .. })));
    }

    #[test]
    fn test_require_group_nested_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.h5");

        let container = Container::create(&path).unwrap();
        container.require_group("a/b").unwrap();
        container.require_group("a/b/c").unwrap();
        container.close().unwrap();

        let container = Container::append(&path).unwrap();
        let group = container.require_group("a").unwrap();
        assert_eq!(group.member_names().unwrap(), vec!["b".to_string()]);
    }
}
