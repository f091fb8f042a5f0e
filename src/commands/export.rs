//! # export 命令实现
//!
//! 读取结果容器并通过输出调度器写出请求的格式。
//!
//! ## 功能
//! - 单文件或目录输入（模式匹配 + 可选递归）
//! - 多文件并行处理（rayon），单个文件内部串行写出
//! - 导数帧：主数组第一维按 `--drv` 标记拆分为多帧
//! - 一维主数组视为向量网格
//!
//! ## 依赖关系
//! - 使用 `cli/export.rs` 定义的 ExportArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `h5/result.rs` 读取输入，`output/` 写出

use crate::batch::{ensure_unique_stems, output_stem, BatchRunner, FileCollector, ProcessResult};
use crate::cli::export::ExportArgs;
use crate::error::{Result, VoxportError};
use crate::h5::{append_geometry, read_result, Container, ResultFile};
use crate::output::dispatch::frame_base;
use crate::output::format::resolve_formats;
use crate::output::{
    produce_outputs, write_structures, OutputFormat, OutputOptions, OutputRequest, Produced,
    StructureFormat,
};
use crate::utils::output;
use crate::writers::colormap::{Colormap, PeakColormap, PercentileColormap};
use crate::writers::vmd::VmdOptions;
use crate::writers::with_extension;

use ndarray::{ArrayD, Axis};
use std::fs;
use std::path::{Path, PathBuf};

/// 每个输入文件共享的导出配置
struct ExportConfig {
    output_dir: PathBuf,
    formats: Vec<OutputFormat>,
    omit: Vec<OutputFormat>,
    drv: Option<Vec<String>>,
    data_id: String,
    vector: bool,
    comments: String,
    structure: Vec<StructureFormat>,
    energy: Option<f64>,
    append: Option<String>,
    data_only: bool,
    z_reduced: bool,
    colormap: Colormap,
    vmd: VmdOptions,
    overwrite: bool,
}

impl ExportConfig {
    fn from_args(args: &ExportArgs) -> Self {
        ExportConfig {
            output_dir: args.output.clone(),
            formats: args.formats.clone(),
            omit: args.omit.clone(),
            drv: args.drv.clone(),
            data_id: args.data_id.clone(),
            vector: args.vector,
            comments: args.comments.clone(),
            structure: args.structure.clone(),
            energy: args.energy,
            append: args.append.clone(),
            data_only: args.data_only,
            z_reduced: args.z_reduced,
            colormap: match &args.cmap_peaks {
                Some(peaks) => Colormap::Peaks(PeakColormap::new(peaks.clone())),
                None => Colormap::Percentile(PercentileColormap {
                    n_peaks: args.peaks,
                    ..PercentileColormap::default()
                }),
            },
            vmd: VmdOptions {
                iso: (args.iso_neg, args.iso_pos),
                render: args.render,
                abspath: !args.relative_paths,
            },
            overwrite: args.overwrite,
        }
    }

    fn options_for(&self, input: &Path) -> OutputOptions {
        OutputOptions {
            outputname: self.output_dir.join(output_stem(input)),
            data_id: self.data_id.clone(),
            comments: self.comments.clone(),
            append: self.append.clone(),
            data_only: self.data_only,
            z_reduced: self.z_reduced,
            colormap: self.colormap.clone(),
            vmd: self.vmd.clone(),
            ..OutputOptions::default()
        }
    }

    /// 输入容器中的轨道元数据原样带到输出
    fn options_with_metadata(&self, input: &Path, result: &ResultFile) -> OutputOptions {
        OutputOptions {
            ao_spec: result.ao_spec.clone(),
            mo_spec: result.mo_spec.clone(),
            is_mo_output: result.is_mo_output,
            ..self.options_for(input)
        }
    }

    fn request(&self, is_vector_grid: bool) -> OutputRequest {
        OutputRequest {
            formats: self.formats.clone(),
            excluded: self.omit.clone(),
            derivative_axes: self.drv.clone(),
            is_vector_grid,
        }
    }
}

/// 执行 export 命令
pub fn execute(args: ExportArgs) -> Result<()> {
    output::print_header("Exporting Volumetric Results");

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }
    ensure_unique_stems(&files)?;

    let formats = resolve_formats(&args.formats, &args.omit);
    if formats.is_empty() {
        return Err(VoxportError::InvalidArgument(
            "Every requested format is omitted".to_string(),
        ));
    }
    let names: Vec<String> = formats.iter().map(|f| f.to_string()).collect();
    output::print_info(&format!("Output formats: {}", names.join(", ")));

    fs::create_dir_all(&args.output).map_err(|e| VoxportError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let config = ExportConfig::from_args(&args);

    if files.len() == 1 {
        execute_single_file(&files[0], &config)
    } else {
        execute_batch(files, &config, args.jobs)
    }
}

/// 单文件模式：逐个列出写出的文件
fn execute_single_file(input: &Path, config: &ExportConfig) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", input.display()));

    if let Some(existing) = existing_output(input, config) {
        output::print_skip(&format!(
            "Output exists, skipping: {} (use --overwrite)",
            existing.display()
        ));
        return Ok(());
    }

    let produced = export_file(input, config)?;
    for warning in &produced.warnings {
        output::print_warning(warning);
    }
    for file in &produced.files {
        output::print_written(input, file);
    }
    output::print_done(&format!("{} file(s) written", produced.files.len()));
    Ok(())
}

/// 批量处理模式
fn execute_batch(files: Vec<PathBuf>, config: &ExportConfig, jobs: usize) -> Result<()> {
    output::print_info(&format!("Batch mode: {} result files", files.len()));

    let runner = BatchRunner::new(jobs);
    let result = runner.run(files, |file| process_batch_file(file, config))?;

    output::print_separator();
    let mut warnings = result.warnings.clone();
    warnings.sort();
    warnings.dedup();
    for warning in &warnings {
        output::print_warning(warning);
    }
    output::print_success(&format!(
        "Batch complete: {} inputs, {} success, {} skipped, {} failed ({} files written)",
        result.total(),
        result.success,
        result.skipped,
        result.failed,
        result.produced
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

fn process_batch_file(input: &PathBuf, config: &ExportConfig) -> ProcessResult {
    if let Some(existing) = existing_output(input, config) {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            existing.display()
        ));
    }

    match export_file(input, config) {
        Ok(produced) => ProcessResult::Success {
            produced: produced.files.len(),
            warnings: produced.warnings,
        },
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 第一帧第一个目标文件已存在且未允许覆盖时返回该路径
///
/// 追加模式下已有容器是预期的写入目标，不算冲突。
fn existing_output(input: &Path, config: &ExportConfig) -> Option<PathBuf> {
    if config.overwrite || config.append.is_some() {
        return None;
    }
    let options = config.options_for(input);
    let tag = config
        .drv
        .as_ref()
        .and_then(|tags| tags.first())
        .map(String::as_str);
    let base = frame_base(&options.outputname, tag);

    resolve_formats(&config.formats, &config.omit)
        .first()
        .map(|f| with_extension(&base, f.extension()))
        .filter(|p| p.exists())
}

/// 导出单个结果容器
fn export_file(input: &Path, config: &ExportConfig) -> Result<Produced> {
    let result = read_result(input, &config.data_id)?;
    let frames = split_frames(result.data.clone(), config.drv.as_deref())?;
    let is_vector_grid = config.vector || frames.iter().any(|f| f.ndim() == 1);

    tracing::debug!(
        input = %input.display(),
        frames = frames.len(),
        is_vector_grid,
        "exporting"
    );

    let options = config.options_with_metadata(input, &result);
    let mut produced = produce_outputs(
        &frames,
        &result.geometry,
        result.grid.as_ref(),
        &config.request(is_vector_grid),
        &options,
    )?;
    produced.files.extend(write_structures(
        &options.outputname,
        &result.geometry,
        &config.structure,
        config.energy,
    )?);

    // 追加且只写数据时，几何结构放在容器根部，且只写一次
    if config.append.is_some() && config.data_only {
        for file in produced.files.iter().filter(|p| p.extension().map_or(false, |e| e == "h5")) {
            let has_geometry = Container::open(file)?.root().link_exists("geo_info");
            if !has_geometry {
                append_geometry(file, &result.geometry)?;
            }
        }
    }

    Ok(produced)
}

/// 按导数标记沿第一维拆分主数组
fn split_frames(data: ArrayD<f64>, drv: Option<&[String]>) -> Result<Vec<ArrayD<f64>>> {
    let Some(tags) = drv else {
        return Ok(vec![data]);
    };
    if data.ndim() < 2 || data.shape()[0] != tags.len() {
        return Err(VoxportError::MalformedInput(format!(
            "Expected {} derivative frames along the first axis, data has shape {:?}",
            tags.len(),
            data.shape()
        )));
    }
    Ok(data.axis_iter(Axis(0)).map(|frame| frame.to_owned()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h5::write_result;
    use crate::models::{AtomRecord, Geometry, GridDescriptor};

    use ndarray::IxDyn;

    fn config(dir: &Path, formats: Vec<OutputFormat>) -> ExportConfig {
        ExportConfig {
            output_dir: dir.to_path_buf(),
            formats,
            omit: Vec::new(),
            drv: None,
            data_id: "rho".to_string(),
            vector: false,
            comments: String::new(),
            structure: Vec::new(),
            energy: None,
            append: None,
            data_only: false,
            z_reduced: false,
            colormap: Colormap::default(),
            vmd: VmdOptions::default(),
            overwrite: false,
        }
    }

    fn write_input(dir: &Path, name: &str, data: &ArrayD<f64>) -> PathBuf {
        let geometry =
            Geometry::new(vec![AtomRecord::new("H", 1.0, "1")], vec![[0.0, 0.0, 0.0]]).unwrap();
        let shape = data.shape();
        let counts = [shape[shape.len() - 3], shape[shape.len() - 2], shape[shape.len() - 1]];
        let grid = GridDescriptor::uniform([0.0; 3], [0.5; 3], counts);
        write_result(
            data,
            &dir.join(name),
            &geometry,
            Some(&grid),
            &OutputOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_split_frames() {
        let data = ArrayD::from_shape_fn(IxDyn(&[3, 2, 2, 2]), |d| d[0] as f64);
        let tags: Vec<String> = vec!["x".into(), "y".into(), "z".into()];
        let frames = split_frames(data.clone(), Some(&tags)).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].shape(), &[2, 2, 2]);
        assert!(frames[2].iter().all(|v| *v == 2.0));

        assert_eq!(split_frames(data.clone(), None).unwrap().len(), 1);
        assert!(split_frames(data, Some(&tags[..2])).is_err());
    }

    #[test]
    fn test_export_file_to_cube() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[2, 2, 2]), 0.5);
        let input = write_input(input_dir.path(), "water", &data);

        let config = config(out_dir.path(), vec![OutputFormat::Cb]);
        let produced = export_file(&input, &config).unwrap();
        assert_eq!(produced.files, vec![out_dir.path().join("water.cb")]);

        assert_eq!(
            existing_output(&input, &config),
            Some(out_dir.path().join("water.cb"))
        );
    }

    #[test]
    fn test_export_structure_files_once() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[2, 2, 2, 2]), 0.5);
        let input = write_input(input_dir.path(), "grad", &data);

        let mut config = config(out_dir.path(), vec![OutputFormat::Cb]);
        config.drv = Some(vec!["x".into(), "y".into()]);
        config.structure = vec![StructureFormat::Pdb, StructureFormat::Xyz];
        let produced = export_file(&input, &config).unwrap();
        assert_eq!(
            produced.files,
            vec![
                out_dir.path().join("grad_dx.cb"),
                out_dir.path().join("grad_dy.cb"),
                out_dir.path().join("grad.pdb"),
                out_dir.path().join("grad.xyz"),
            ]
        );
    }

    #[test]
    fn test_export_derivative_frames() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[2, 2, 2, 2]), 0.5);
        let input = write_input(input_dir.path(), "grad", &data);

        let mut config = config(out_dir.path(), vec![OutputFormat::Am]);
        config.drv = Some(vec!["x".into(), "y".into()]);
        let produced = export_file(&input, &config).unwrap();
        assert_eq!(
            produced.files,
            vec![out_dir.path().join("grad_dx.am"), out_dir.path().join("grad_dy.am")]
        );
    }

    #[test]
    fn test_export_append_data_only() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let data = ArrayD::from_elem(IxDyn(&[2, 2, 2]), 0.5);
        let input = write_input(input_dir.path(), "frames", &data);

        let mut config = config(out_dir.path(), vec![OutputFormat::H5]);
        config.append = Some("step0".to_string());
        config.data_only = true;
        export_file(&input, &config).unwrap();
        config.append = Some("step1".to_string());
        export_file(&input, &config).unwrap();

        let container = Container::open(&out_dir.path().join("frames.h5")).unwrap();
        let root = container.root();
        assert!(root.link_exists("step0/rho"));
        assert!(root.link_exists("step1/rho"));
        assert!(root.link_exists("geo_info"));
        assert!(!root.link_exists("step0/geo_info"));
    }
}
