//! # 输出调度器
//!
//! 对一次计算结果按请求的格式逐帧写出文件：
//! - 没有导数轴时只有一帧，否则每个导数轴一帧，基础名为 `<name>_d<tag>`
//! - 每帧内按 h5、am、hx、cb、vmd 的顺序写出，网络脚本总在其引用的文件之后
//! - 向量网格数据只能写 h5，其余格式整体跳过，整个调用只产生一条警告
//!
//! 写入器的致命错误立即中止并向上传播；已写出的文件保留在磁盘上。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `h5/result.rs`、`writers/`、`output/format.rs`

use crate::error::{Result, VoxportError};
use crate::h5::write_result;
use crate::models::{Geometry, GridDescriptor};
use crate::output::format::{resolve_formats, OutputFormat};
use crate::output::OutputOptions;
use crate::writers::{amira, as_grid3, cube, hx, vmd, with_extension};

use ndarray::ArrayD;
use std::path::{Path, PathBuf};

/// 一次调度请求
#[derive(Debug, Clone, Default)]
pub struct OutputRequest {
    pub formats: Vec<OutputFormat>,
    pub excluded: Vec<OutputFormat>,
    /// 导数轴标记，每个标记对应一帧数据
    pub derivative_axes: Option<Vec<String>>,
    /// 数据按单一平面索引排列，而非规则三维网格
    pub is_vector_grid: bool,
}

impl OutputRequest {
    pub fn new(formats: Vec<OutputFormat>) -> Self {
        OutputRequest {
            formats,
            ..OutputRequest::default()
        }
    }
}

/// 调度结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Produced {
    /// 实际写出的文件，按写出顺序
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// 按请求写出所有帧的所有格式
///
/// `frames` 在没有导数轴时应只含一个数组，否则与导数轴一一对应。
pub fn produce_outputs(
    frames: &[ArrayD<f64>],
    geometry: &Geometry,
    grid: Option<&GridDescriptor>,
    request: &OutputRequest,
    options: &OutputOptions,
) -> Result<Produced> {
    let tags: Vec<Option<&str>> = match &request.derivative_axes {
        Some(axes) => axes.iter().map(|a| Some(a.as_str())).collect(),
        None => vec![None],
    };
    if frames.len() != tags.len() {
        return Err(VoxportError::MalformedInput(format!(
            "Expected {} data frame(s), got {}",
            tags.len(),
            frames.len()
        )));
    }

    let formats = resolve_formats(&request.formats, &request.excluded);
    let mut produced = Produced::default();
    let mut grid_formats_refused = false;

    if request.is_vector_grid && formats.iter().any(|f| f.needs_regular_grid()) {
        refuse_grid_formats(&mut produced, &formats, "the data lies on a vector grid");
        grid_formats_refused = true;
    }

    for (data, tag) in frames.iter().zip(tags) {
        let base = frame_base(&options.outputname, tag);
        tracing::debug!(base = %base.display(), "writing frame");

        for format in &formats {
            if grid_formats_refused && format.needs_regular_grid() {
                continue;
            }
            match write_format(*format, data, &base, geometry, grid, options) {
                Ok(path) => produced.files.push(path),
                Err(VoxportError::FormatUnsupported(reason)) if format.needs_regular_grid() => {
                    refuse_grid_formats(&mut produced, &formats, &reason);
                    grid_formats_refused = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(produced)
}

/// 记录唯一的一条跳过警告
fn refuse_grid_formats(produced: &mut Produced, formats: &[OutputFormat], reason: &str) {
    let skipped: Vec<String> = formats
        .iter()
        .filter(|f| f.needs_regular_grid())
        .map(|f| f.to_string())
        .collect();
    let message = format!(
        "Only HDF5 output is available here ({}); skipping {}",
        reason,
        skipped.join(", ")
    );
    tracing::warn!("{}", message);
    produced.warnings.push(message);
}

pub(crate) fn frame_base(outputname: &Path, tag: Option<&str>) -> PathBuf {
    match tag {
        Some(tag) => {
            let mut name = outputname.as_os_str().to_owned();
            name.push(format!("_d{}", tag));
            PathBuf::from(name)
        }
        None => outputname.to_path_buf(),
    }
}

fn write_format(
    format: OutputFormat,
    data: &ArrayD<f64>,
    base: &Path,
    geometry: &Geometry,
    grid: Option<&GridDescriptor>,
    options: &OutputOptions,
) -> Result<PathBuf> {
    let need_grid = || {
        grid.ok_or_else(|| {
            VoxportError::MalformedInput(format!("{} output needs a grid descriptor", format))
        })
    };
    match format {
        OutputFormat::H5 => write_result(data, base, geometry, grid, options),
        OutputFormat::Am => amira::write_amira(data, base, need_grid()?),
        OutputFormat::Hx => {
            let values: Vec<f64> = as_grid3(data, need_grid()?, "hx")?.iter().copied().collect();
            hx::write_hx_network(&values, base, &options.colormap)
        }
        OutputFormat::Cb => {
            cube::write_cube(data, base, geometry, need_grid()?, &options.comments)
        }
        OutputFormat::Vmd => {
            let cube_file = with_extension(base, "cb");
            vmd::write_vmd_network(base, Some(&[cube_file]), &options.vmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AtomRecord;

    use ndarray::IxDyn;

    fn geometry() -> Geometry {
        Geometry::new(vec![AtomRecord::new("He", 2.0, "1")], vec![[0.0, 0.0, 0.0]]).unwrap()
    }

    fn grid() -> GridDescriptor {
        GridDescriptor::uniform([-0.5, -0.5, -0.5], [1.0, 1.0, 1.0], [2, 2, 2])
    }

    fn options(dir: &Path, name: &str) -> OutputOptions {
        OutputOptions {
            outputname: dir.join(name),
            ..OutputOptions::default()
        }
    }

    #[test]
    fn test_vector_grid_only_writes_container() {
        let dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[8]), 0.1);
        let request = OutputRequest {
            is_vector_grid: true,
            ..OutputRequest::new(vec![OutputFormat::H5, OutputFormat::Am])
        };

        let produced =
            produce_outputs(&[data], &geometry(), None, &request, &options(dir.path(), "vec"))
                .unwrap();

        assert_eq!(produced.files, vec![dir.path().join("vec.h5")]);
        assert_eq!(produced.warnings.len(), 1);
        assert!(!dir.path().join("vec.am").exists());
    }

    #[test]
    fn test_one_warning_for_all_frames_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![ArrayD::from_elem(IxDyn(&[8]), 0.1); 3];
        let request = OutputRequest {
            derivative_axes: Some(vec!["x".into(), "y".into(), "z".into()]),
            is_vector_grid: true,
            ..OutputRequest::new(vec![OutputFormat::Hx, OutputFormat::Vmd])
        };

        let produced =
            produce_outputs(&frames, &geometry(), None, &request, &options(dir.path(), "v"))
                .unwrap();

        assert!(produced.files.is_empty());
        assert_eq!(produced.warnings.len(), 1);
        assert!(produced.warnings[0].contains("am, hx, cb, vmd"));
    }

    #[test]
    fn test_flat_data_on_regular_request_is_downgraded() {
        let dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[8]), 0.1);
        let request = OutputRequest::new(vec![OutputFormat::Cb, OutputFormat::H5]);

        let produced = produce_outputs(
            &[data],
            &geometry(),
            Some(&grid()),
            &request,
            &options(dir.path(), "flat"),
        )
        .unwrap();

        assert_eq!(produced.files, vec![dir.path().join("flat.h5")]);
        assert_eq!(produced.warnings.len(), 1);
        assert!(!dir.path().join("flat.cb").exists());
    }

    #[test]
    fn test_derivative_frames_bound_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let frames: Vec<ArrayD<f64>> = (0..3)
            .map(|i| ArrayD::from_elem(IxDyn(&[2, 2, 2]), i as f64))
            .collect();
        let request = OutputRequest {
            derivative_axes: Some(vec!["x".into(), "y".into(), "z".into()]),
            ..OutputRequest::new(vec![OutputFormat::Cb, OutputFormat::H5])
        };

        let produced = produce_outputs(
            &frames,
            &geometry(),
            Some(&grid()),
            &request,
            &options(dir.path(), "drv"),
        )
        .unwrap();

        assert!(produced.warnings.is_empty());
        assert!(produced.files.len() <= 2 * 3);
        let names: Vec<String> = produced
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["drv_dx.h5", "drv_dx.cb", "drv_dy.h5", "drv_dy.cb", "drv_dz.h5", "drv_dz.cb"]
        );
        assert!(produced.files.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_networks_follow_referenced_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_shape_fn(IxDyn(&[2, 2, 2]), |d| (d[0] + d[1] + d[2]) as f64);
        let request = OutputRequest::new(vec![OutputFormat::Vmd, OutputFormat::Hx]);

        let produced = produce_outputs(
            &[data],
            &geometry(),
            Some(&grid()),
            &request,
            &options(dir.path(), "net"),
        )
        .unwrap();

        let exts: Vec<String> = produced
            .files
            .iter()
            .map(|p| p.extension().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(exts, vec!["am", "hx", "cb", "vmd"]);
        assert!(dir.path().join("net.cmap").exists());
    }

    #[test]
    fn test_excluded_formats_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[2, 2, 2]), 1.0);
        let request = OutputRequest {
            excluded: vec![OutputFormat::H5],
            ..OutputRequest::new(vec![OutputFormat::H5, OutputFormat::Am])
        };

        let produced = produce_outputs(
            &[data],
            &geometry(),
            Some(&grid()),
            &request,
            &options(dir.path(), "ex"),
        )
        .unwrap();

        assert_eq!(produced.files, vec![dir.path().join("ex.am")]);
        assert!(!dir.path().join("ex.h5").exists());
    }

    #[test]
    fn test_frame_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let request = OutputRequest {
            derivative_axes: Some(vec!["x".into(), "y".into()]),
            ..OutputRequest::new(vec![OutputFormat::H5])
        };
        let result = produce_outputs(
            &[ArrayD::zeros(IxDyn(&[2, 2, 2]))],
            &geometry(),
            Some(&grid()),
            &request,
            &options(dir.path(), "bad"),
        );
        assert!(matches!(result, Err(VoxportError::MalformedInput(_))));
    }

    #[test]
    fn test_fatal_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[2, 2, 2]), 1.0);
        let opts = OutputOptions {
            outputname: dir.path().join("missing").join("out"),
            ..OutputOptions::default()
        };
        let request = OutputRequest::new(vec![OutputFormat::Cb]);
        let result = produce_outputs(&[data], &geometry(), Some(&grid()), &request, &opts);
        assert!(matches!(result, Err(VoxportError::FileWriteError { .. })));
    }
}
