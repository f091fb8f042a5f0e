//! # 输出配置
//!
//! 调度器和各写入器显式接收的配置，由命令行参数构造。
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs`、`h5/result.rs`、`commands/export.rs` 使用

use crate::models::{MolecularOrbital, Value};
use crate::writers::colormap::Colormap;
use crate::writers::vmd::VmdOptions;

use std::path::PathBuf;

/// 输出参数
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// 输出基础名（不含扩展名）
    pub outputname: PathBuf,
    /// 主数据在结果容器中的名称
    pub data_id: String,
    /// cube 文件注释行
    pub comments: String,
    /// 追加写入已有容器的该组，而不是新建文件
    pub append: Option<String>,
    /// 只写主数据
    pub data_only: bool,
    /// 只写 z 轴坐标
    pub z_reduced: bool,
    /// 主数据按轨道排列，写出 `MO:Content`
    pub is_mo_output: bool,
    pub ao_spec: Option<Value>,
    pub mo_spec: Option<Vec<MolecularOrbital>>,
    pub colormap: Colormap,
    pub vmd: VmdOptions,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions {
            outputname: PathBuf::from("new"),
            data_id: "rho".to_string(),
            comments: String::new(),
            append: None,
            data_only: false,
            z_reduced: false,
            is_mo_output: false,
            ao_spec: None,
            mo_spec: None,
            colormap: Colormap::default(),
            vmd: VmdOptions::default(),
        }
    }
}
