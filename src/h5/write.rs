//! # 序列化引擎
//!
//! 将通用数据树 `Value` 递归写入 HDF5 组。
//!
//! ## 映射规则
//! - `Array` → 名为 `name` 的 Dataset，形状与元素类型原样保留
//! - `Sequence` → 子组（`name` 为空时直接写入当前组），
//!   属性 `num` = 元素个数，第 i 个元素以十进制字符串 `i` 命名
//! - `Mapping` → 子组（同上），每个条目以其键命名
//! - `Scalar` → 当前组上名为 `name` 的 Attribute
//!
//! 引擎写出的每个组都带类型标签属性 `__kind__`（`list` / `dict`），
//! 读取时据此区分序列与映射。子节点与属性名称冲突视为 `MalformedInput`，
//! 写入从不静默覆盖。
//!
//! ## 依赖关系
//! - 被 `h5/result.rs` 使用
//! - 使用 `models/value.rs`

use crate::error::{Result, VoxportError};
use crate::models::{ArrayValue, ScalarValue, Value};

use hdf5::types::VarLenUnicode;
use hdf5::Group;
use ndarray::ArrayD;

/// 类型标签属性名
pub const KIND_ATTR: &str = "__kind__";
/// 序列长度属性名
pub const NUM_ATTR: &str = "num";
/// 序列组标签
pub const KIND_SEQUENCE: &str = "list";
/// 映射组标签
pub const KIND_MAPPING: &str = "dict";

/// 将 `value` 以名称 `name` 写入 `group`
///
/// 只有顶层调用可以传入空名称（序列/映射直接展开到 `group` 中）。
pub fn write(value: &Value, group: &Group, name: &str) -> Result<()> {
    match value {
        Value::Array(array) => {
            check_name(group, name)?;
            ensure_free(group, name)?;
            write_dataset(group, name, array)
        }
        Value::Scalar(scalar) => {
            check_name(group, name)?;
            ensure_free(group, name)?;
            write_attribute(group, name, scalar)
        }
        Value::Sequence(items) => {
            let target = target_group(group, name)?;
            write_attribute(&target, KIND_ATTR, &ScalarValue::Text(KIND_SEQUENCE.into()))?;
            write_attribute(&target, NUM_ATTR, &ScalarValue::Int(items.len() as i64))?;
            for (i, item) in items.iter().enumerate() {
                write(item, &target, &i.to_string())?;
            }
            Ok(())
        }
        Value::Mapping(map) => {
            if map.contains_key(KIND_ATTR) {
                return Err(VoxportError::MalformedInput(format!(
                    "Mapping key '{}' is reserved",
                    KIND_ATTR
                )));
            }
            let target = target_group(group, name)?;
            write_attribute(&target, KIND_ATTR, &ScalarValue::Text(KIND_MAPPING.into()))?;
            for (key, item) in map {
                write(item, &target, key)?;
            }
            Ok(())
        }
    }
}

/// 序列/映射的目标组：名称为空时复用当前组
fn target_group(group: &Group, name: &str) -> Result<Group> {
    if name.is_empty() {
        return Ok(group.clone());
    }
    check_name(group, name)?;
    ensure_free(group, name)?;
    tracing::debug!(group = %group.name(), name, "create group");
    group
        .create_group(name)
        .map_err(|e| VoxportError::container(group.filename(), e))
}

/// 名称必须非空且不含路径分隔符
fn check_name(group: &Group, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name == "." {
        return Err(VoxportError::MalformedInput(format!(
            "Invalid member name '{}' under {}",
            name,
            group.name()
        )));
    }
    Ok(())
}

/// 名称在子节点与属性两个名字空间中都必须未被占用
fn ensure_free(group: &Group, name: &str) -> Result<()> {
    let attrs = group
        .attr_names()
        .map_err(|e| VoxportError::container(group.filename(), e))?;
    if group.link_exists(name) || attrs.iter().any(|a| a == name) {
        return Err(VoxportError::MalformedInput(format!(
            "Duplicate name '{}' under {}",
            name,
            group.name()
        )));
    }
    Ok(())
}

fn write_dataset(group: &Group, name: &str, array: &ArrayValue) -> Result<()> {
    tracing::debug!(group = %group.name(), name, shape = ?array.shape(), "write dataset");
    let builder = group.new_dataset_builder();
    let result = match array {
        ArrayValue::Float(a) => builder.with_data(a).create(name),
        ArrayValue::Int(a) => builder.with_data(a).create(name),
        ArrayValue::Text(a) => {
            let encoded = encode_text(a)?;
            builder.with_data(&encoded).create(name)
        }
    };
    result
        .map(|_| ())
        .map_err(|e| VoxportError::container(group.filename(), e))
}

fn write_attribute(group: &Group, name: &str, scalar: &ScalarValue) -> Result<()> {
    tracing::debug!(group = %group.name(), name, "write attribute");
    let result = match scalar {
        ScalarValue::Float(v) => group
            .new_attr::<f64>()
            .create(name)
            .and_then(|attr| attr.write_scalar(v)),
        ScalarValue::Int(v) => group
            .new_attr::<i64>()
            .create(name)
            .and_then(|attr| attr.write_scalar(v)),
        ScalarValue::Bool(v) => group
            .new_attr::<bool>()
            .create(name)
            .and_then(|attr| attr.write_scalar(v)),
        ScalarValue::Text(v) => {
            let text = to_varlen(v)?;
            group
                .new_attr::<VarLenUnicode>()
                .create(name)
                .and_then(|attr| attr.write_scalar(&text))
        }
    };
    result.map_err(|e| VoxportError::container(group.filename(), e))
}

fn to_varlen(text: &str) -> Result<VarLenUnicode> {
    text.parse::<VarLenUnicode>().map_err(|_| {
        VoxportError::MalformedInput(format!("String cannot be stored: {:?}", text))
    })
}

fn encode_text(array: &ArrayD<String>) -> Result<ArrayD<VarLenUnicode>> {
    let encoded = array
        .iter()
        .map(|s| to_varlen(s))
        .collect::<Result<Vec<_>>>()?;
    ArrayD::from_shape_vec(array.raw_dim(), encoded)
        .map_err(|e| VoxportError::MalformedInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h5::Container;

    use ndarray::IxDyn;
    use std::collections::BTreeMap;

    #[test]
    fn test_sequence_records_num() {
        let dir = tempfile::tempdir().unwrap();
        let container = Container::create(&dir.path().join("seq.h5")).unwrap();

        let value = Value::Sequence(vec![
            Value::from(1_i64),
            Value::from(ArrayD::from_elem(IxDyn(&[2]), 0.5)),
            Value::from("three"),
        ]);
        write(&value, container.root(), "items").unwrap();

        let group = container.root().group("items").unwrap();
        let num = group.attr(NUM_ATTR).unwrap().read_scalar::<i64>().unwrap();
        assert_eq!(num, 3);
        assert_eq!(group.member_names().unwrap(), vec!["1".to_string()]);
    }

    #[test]
    fn test_root_flattening() {
        let dir = tempfile::tempdir().unwrap();
        let container = Container::create(&dir.path().join("root.h5")).unwrap();

        let mut map = BTreeMap::new();
        map.insert("rho".to_string(), Value::from(ArrayD::from_elem(IxDyn(&[2, 2]), 1.0)));
        map.insert("name".to_string(), Value::from("water"));
        write(&Value::Mapping(map), container.root(), "").unwrap();

        assert!(container.root().link_exists("rho"));
        let names = container.root().attr_names().unwrap();
        assert!(names.contains(&"name".to_string()));
        assert!(names.contains(&KIND_ATTR.to_string()));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let container = Container::create(&dir.path().join("dup.h5")).unwrap();
        let root = container.root();

        write(&Value::from(ArrayD::from_elem(IxDyn(&[1]), 1.0)), root, "x").unwrap();
        let again = write(&Value::from(2_i64), root, "x");
        assert!(matches!(again, Err(VoxportError::MalformedInput(_))));

        write(&Value::from(3_i64), root, "y").unwrap();
        let clash = write(&Value::Sequence(vec![]), root, "y");
        assert!(matches!(clash, Err(VoxportError::MalformedInput(_))));
    }

    #[test]
    fn test_reserved_and_invalid_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let container = Container::create(&dir.path().join("keys.h5")).unwrap();

        let mut reserved = BTreeMap::new();
        reserved.insert(KIND_ATTR.to_string(), Value::from(1_i64));
        let result = write(&Value::Mapping(reserved), container.root(), "m");
        assert!(matches!(result, Err(VoxportError::MalformedInput(_))));

        let mut slashed = BTreeMap::new();
        slashed.insert("a/b".to_string(), Value::from(1_i64));
        let result = write(&Value::Mapping(slashed), container.root(), "n");
        assert!(matches!(result, Err(VoxportError::MalformedInput(_))));
    }

    #[test]
    fn test_array_needs_name() {
        let dir = tempfile::tempdir().unwrap();
        let container = Container::create(&dir.path().join("noname.h5")).unwrap();
        let result = write(
            &Value::from(ArrayD::from_elem(IxDyn(&[1]), 1.0)),
            container.root(),
            "",
        );
        assert!(matches!(result, Err(VoxportError::MalformedInput(_))));
    }
}
