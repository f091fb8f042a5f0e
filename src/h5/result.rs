//! # 计算结果容器
//!
//! 按固定布局写出/读回一次计算的结果文件：
//!
//! ```text
//! /<data_id>        主数据（默认 rho）
//! /MO:Content       轨道名称（仅轨道输出）
//! /x /y /z          网格坐标，形状 (1, n)；z 约化模式只有 z
//! /ao_spec /mo_spec 轨道元数据树（通用序列化引擎）
//! /MO_info          occ_num, energy, sym，形状 (1, n_mo)
//! /geo_info         (n_atoms, 3) 文本: symbol, charge, label
//! /geo_spec         (n_atoms, 3) 坐标
//! ```
//!
//! ## 依赖关系
//! - 被 `output/dispatch.rs` 和 `commands/export.rs` 使用
//! - 使用 `h5/container.rs`、`h5/write.rs`、`h5/read.rs`

use crate::error::{Result, VoxportError};
use crate::h5::{read, write, Container};
use crate::models::orbital::{mo_spec_from_value, mo_spec_value};
use crate::models::{ArrayValue, Geometry, GridDescriptor, MolecularOrbital, Value};
use crate::output::OutputOptions;
use crate::writers::with_extension;

use hdf5::Group;
use ndarray::{Array2, ArrayD};
use std::path::{Path, PathBuf};

/// 从结果容器读回的数据
#[derive(Debug, Clone)]
pub struct ResultFile {
    pub data: ArrayD<f64>,
    pub geometry: Geometry,
    pub grid: Option<GridDescriptor>,
    pub ao_spec: Option<Value>,
    pub mo_spec: Option<Vec<MolecularOrbital>>,
    /// 容器含 `MO:Content`
    pub is_mo_output: bool,
}

/// 写出结果容器 `<base>.h5`，返回文件路径
pub fn write_result(
    data: &ArrayD<f64>,
    base: &Path,
    geometry: &Geometry,
    grid: Option<&GridDescriptor>,
    options: &OutputOptions,
) -> Result<PathBuf> {
    let path = with_extension(base, "h5");

    let container = match &options.append {
        Some(_) => Container::append(&path)?,
        None => Container::create(&path)?,
    };
    {
        let group = match &options.append {
            Some(name) => container.require_group(name)?,
            None => container.root().clone(),
        };
        write_layout(&group, data, geometry, grid, options)?;
    }

    container.close()?;
    tracing::info!(path = %path.display(), "wrote result container");
    Ok(path)
}

fn write_layout(
    group: &Group,
    data: &ArrayD<f64>,
    geometry: &Geometry,
    grid: Option<&GridDescriptor>,
    options: &OutputOptions,
) -> Result<()> {
    if options.is_mo_output {
        write_mo_content(group, data, options)?;
    }

    write(&Value::from(data.clone()), group, &options.data_id)?;

    if options.data_only {
        return Ok(());
    }

    if let Some(grid) = grid {
        let axes: &[(&str, usize)] = if options.z_reduced {
            &[("z", 2)]
        } else {
            &[("x", 0), ("y", 1), ("z", 2)]
        };
        for (name, i) in axes {
            write(&row_array(grid.axis(*i)), group, name)?;
        }
    }

    if let Some(ao_spec) = &options.ao_spec {
        write(ao_spec, group, "ao_spec")?;
    }
    if let Some(mo_spec) = &options.mo_spec {
        write(&mo_spec_value(mo_spec), group, "mo_spec")?;

        let mo_info = group
            .create_group("MO_info")
            .map_err(|e| VoxportError::container(group.filename(), e))?;
        let occ: Vec<f64> = mo_spec.iter().map(|mo| mo.occ_num).collect();
        let energy: Vec<f64> = mo_spec.iter().map(|mo| mo.energy).collect();
        let sym: Vec<String> = mo_spec.iter().map(|mo| mo.sym.clone()).collect();
        write(&row_array(occ), &mo_info, "occ_num")?;
        write(&row_array(energy), &mo_info, "energy")?;
        write(&row_text(sym), &mo_info, "sym")?;
    }

    write_geometry(group, geometry)
}

/// 向已有容器追加 `geo_info` / `geo_spec`
pub fn append_geometry(path: &Path, geometry: &Geometry) -> Result<()> {
    let path = if path.extension().map_or(false, |e| e == "h5") {
        path.to_path_buf()
    } else {
        with_extension(path, "h5")
    };
    let container = Container::append(&path)?;
    write_geometry(container.root(), geometry)?;
    container.close()
}

/// 读回结果容器
pub fn read_result(path: &Path, data_id: &str) -> Result<ResultFile> {
    let container = Container::open(path)?;
    let root = container.root();

    let data = expect_float(read(root, data_id)?, data_id)?;

    let info = match read(root, "geo_info")? {
        Value::Array(ArrayValue::Text(a)) => a,
        other => {
            return Err(VoxportError::MalformedInput(format!(
                "geo_info must be a text array, found {}",
                other.kind()
            )))
        }
    };
    let spec = expect_float(read(root, "geo_spec")?, "geo_spec")?;
    let geometry = Geometry::from_arrays(&info, &spec)?;

    let grid = if ["x", "y", "z"].iter().all(|a| root.link_exists(a)) {
        let x = expect_float(read(root, "x")?, "x")?;
        let y = expect_float(read(root, "y")?, "y")?;
        let z = expect_float(read(root, "z")?, "z")?;
        Some(GridDescriptor::from_axes(
            x.iter().copied().collect(),
            y.iter().copied().collect(),
            z.iter().copied().collect(),
        )?)
    } else {
        None
    };

    let ao_spec = if root.link_exists("ao_spec") {
        Some(read(root, "ao_spec")?)
    } else {
        None
    };
    let mo_spec = if root.link_exists("mo_spec") {
        Some(mo_spec_from_value(&read(root, "mo_spec")?)?)
    } else {
        None
    };

    Ok(ResultFile {
        data,
        geometry,
        grid,
        ao_spec,
        mo_spec,
        is_mo_output: root.link_exists("MO:Content"),
    })
}

fn write_geometry(group: &Group, geometry: &Geometry) -> Result<()> {
    write(
        &Value::Array(ArrayValue::Text(geometry.info_array().into_dyn())),
        group,
        "geo_info",
    )?;
    write(
        &Value::from(geometry.spec_array().into_dyn()),
        group,
        "geo_spec",
    )
}

/// 轨道名称：优先使用 `mo_spec` 中的 `sym`，否则用序号
fn write_mo_content(group: &Group, data: &ArrayD<f64>, options: &OutputOptions) -> Result<()> {
    let count = data.shape().first().copied().unwrap_or(0);
    let names: Vec<String> = (0..count)
        .map(|i| {
            options
                .mo_spec
                .as_ref()
                .and_then(|mos| mos.get(i))
                .map(|mo| mo.sym.clone())
                .unwrap_or_else(|| i.to_string())
        })
        .collect();
    write(
        &Value::Array(ArrayValue::Text(
            ArrayD::from_shape_vec(vec![names.len()], names)
                .map_err(|e| VoxportError::MalformedInput(e.to_string()))?,
        )),
        group,
        "MO:Content",
    )
}

fn row_array(values: Vec<f64>) -> Value {
    let n = values.len();
    Value::from(
        Array2::from_shape_vec((1, n), values)
            .unwrap_or_else(|_| Array2::zeros((1, 0)))
            .into_dyn(),
    )
}

fn row_text(values: Vec<String>) -> Value {
    let n = values.len();
    Value::Array(ArrayValue::Text(
        Array2::from_shape_vec((1, n), values)
            .unwrap_or_else(|_| Array2::from_elem((1, 0), String::new()))
            .into_dyn(),
    ))
}

fn expect_float(value: Value, name: &str) -> Result<ArrayD<f64>> {
    match value {
        Value::Array(ArrayValue::Float(a)) => Ok(a),
        Value::Array(ArrayValue::Int(a)) => Ok(a.mapv(|v| v as f64)),
        other => Err(VoxportError::MalformedInput(format!(
            "'{}' must be a numeric dataset, found {}",
            name,
            other.kind()
        ))),
    }
}
