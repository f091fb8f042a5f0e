//! # 输出格式
//!
//! 格式标记解析与隐含依赖展开。
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 和 `cli/export.rs` 使用

use crate::error::{Result, VoxportError};

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// 支持的输出格式，声明顺序即每帧的写出顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum OutputFormat {
    /// Hierarchical result container (.h5)
    H5,
    /// ZIBAmira mesh (.am)
    Am,
    /// ZIBAmira network with colormap (.hx)
    Hx,
    /// Gaussian cube (.cb)
    #[value(alias = "cube")]
    Cb,
    /// VMD network (.vmd)
    Vmd,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::H5 => "h5",
            OutputFormat::Am => "am",
            OutputFormat::Hx => "hx",
            OutputFormat::Cb => "cb",
            OutputFormat::Vmd => "vmd",
        }
    }

    /// 网格文本格式，向量网格数据无法写出
    pub fn needs_regular_grid(&self) -> bool {
        !matches!(self, OutputFormat::H5)
    }

    /// 网络脚本引用的格式
    fn implied(&self) -> Option<OutputFormat> {
        match self {
            OutputFormat::Hx => Some(OutputFormat::Am),
            OutputFormat::Vmd => Some(OutputFormat::Cb),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = VoxportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h5" | "hdf5" => Ok(OutputFormat::H5),
            "am" => Ok(OutputFormat::Am),
            "hx" => Ok(OutputFormat::Hx),
            "cb" | "cube" => Ok(OutputFormat::Cb),
            "vmd" => Ok(OutputFormat::Vmd),
            other => Err(VoxportError::InvalidArgument(format!(
                "Unknown output format '{}'",
                other
            ))),
        }
    }
}

/// 展开隐含依赖并去掉排除项，按写出顺序返回
pub fn resolve_formats(requested: &[OutputFormat], excluded: &[OutputFormat]) -> Vec<OutputFormat> {
    let mut formats: Vec<OutputFormat> = requested
        .iter()
        .flat_map(|f| std::iter::once(*f).chain(f.implied()))
        .filter(|f| !excluded.contains(f))
        .collect();
    formats.sort();
    formats.dedup();
    formats
}
