//! # 结果文件收集器
//!
//! 根据输入路径收集待导出的结果容器。
//!
//! ## 功能
//! - 单文件输入直接返回
//! - 目录输入按文件名模式匹配（逗号分隔多模式，支持 `*` 和 `?`）
//! - 可选递归搜索，结果按路径排序
//! - 输出全部落在同一目录，文件名（不含扩展名）重复的输入被拒绝
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{Result, VoxportError};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配模式
pub const DEFAULT_PATTERN: &str = "*.h5";

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<String>,
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![DEFAULT_PATTERN.to_string()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.patterns.is_empty() {
            self.patterns = vec![DEFAULT_PATTERN.to_string()];
        }
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件；输入不存在时返回 `NotFound`
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }
        if !self.input.is_dir() {
            return Err(VoxportError::NotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_patterns(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();

        tracing::debug!(count = files.len(), input = %self.input.display(), "collected files");
        Ok(files)
    }

    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        self.patterns.iter().any(|p| glob_match(p, filename))
    }
}

/// 输入对应的输出基础名
pub fn output_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("output")
}

/// 两个输入映射到同一输出基础名时返回 `InvalidArgument`
pub fn ensure_unique_stems(files: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<&str, &PathBuf> = HashMap::with_capacity(files.len());
    for file in files {
        if let Some(first) = seen.insert(output_stem(file), file) {
            return Err(VoxportError::InvalidArgument(format!(
                "'{}' and '{}' would write the same output files; export them separately",
                first.display(),
                file.display()
            )));
        }
    }
    Ok(())
}

/// 简单 glob 匹配（支持 * 和 ? 通配符）
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.as_bytes();
    let text = text.as_bytes();

    let mut p = 0;
    let mut t = 0;
    let mut star_p = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star_p = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(sp) = star_p {
            p = sp + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.h5", "h2o.h5"));
        assert!(glob_match("*.h5", "rho_dx.h5"));
        assert!(!glob_match("*.h5", "rho.cb"));
        assert!(glob_match("mo_?.h5", "mo_1.h5"));
        assert!(!glob_match("mo_?.h5", "mo_12.h5"));
    }

    #[test]
    fn test_collect_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        for name in ["b.h5", "a.h5", "c.cb", "sub/d.h5"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let flat = FileCollector::new(dir.path().to_path_buf()).collect().unwrap();
        assert_eq!(flat, vec![dir.path().join("a.h5"), dir.path().join("b.h5")]);

        let deep = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.h5, *.cb")
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(deep.len(), 4);
    }

    #[test]
    fn test_recursive_duplicate_stems_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            fs::write(dir.path().join(sub).join("rho.h5"), "").unwrap();
        }
        fs::write(dir.path().join("a").join("mo.h5"), "").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(files.len(), 3);
        assert!(matches!(
            ensure_unique_stems(&files),
            Err(VoxportError::InvalidArgument(_))
        ));

        let flat = FileCollector::new(dir.path().join("a")).collect().unwrap();
        assert!(ensure_unique_stems(&flat).is_ok());
    }

    #[test]
    fn test_collect_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileCollector::new(dir.path().join("nope")).collect();
        assert!(matches!(result, Err(VoxportError::NotFound { .. })));
    }
}
