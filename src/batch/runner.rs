//! # 批量执行器
//!
//! 在线程池上并行导出多个结果文件。每个文件内部的写出仍是单线程的，
//! 不同文件写入不同的输出路径。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{Result, VoxportError};
use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 写出的文件数与警告
    Success { produced: usize, warnings: Vec<String> },
    /// 跳过（输出已存在）
    Skipped(String),
    /// 处理失败 (文件路径, 错误信息)
    Failed(String, String),
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 所有输入共写出的文件数
    pub produced: usize,
    pub warnings: Vec<String>,
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success { produced, warnings } => {
                self.success += 1;
                self.produced += produced;
                self.warnings.extend(warnings);
            }
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    jobs: usize,
}

impl BatchRunner {
    /// `jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理文件列表，结果顺序与输入一致
    pub fn run<F>(&self, files: Vec<PathBuf>, processor: F) -> Result<BatchResult>
    where
        F: Fn(&PathBuf) -> ProcessResult + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Exporting");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| VoxportError::Other(format!("Failed to start worker pool: {}", e)))?;

        let results: Vec<ProcessResult> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    pb.inc(1);
                    result
                })
                .collect()
        });
        pb.finish_and_clear();

        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }
        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_merges_results() {
        let files: Vec<PathBuf> = ["a.h5", "b.h5", "c.h5"].iter().map(PathBuf::from).collect();
        let runner = BatchRunner::new(2);

        let result = runner
            .run(files, |f| match f.to_str() {
                Some("a.h5") => ProcessResult::Success {
                    produced: 3,
                    warnings: vec!["w".to_string()],
                },
                Some("b.h5") => ProcessResult::Skipped("b.h5".to_string()),
                _ => ProcessResult::Failed("c.h5".to_string(), "boom".to_string()),
            })
            .unwrap();

        assert_eq!(result.total(), 3);
        assert_eq!(result.produced, 3);
        assert_eq!(result.warnings, vec!["w".to_string()]);
        assert_eq!(result.failures, vec![("c.h5".to_string(), "boom".to_string())]);
    }
}
