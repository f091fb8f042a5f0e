//! # 反序列化引擎
//!
//! 将 HDF5 子树递归读回通用数据树 `Value`。
//!
//! ## 判定规则
//! 1. 路径指向 Dataset → 返回数组
//! 2. 路径指向 Group：
//!    - 有 `__kind__` 标签时按标签解析为序列或映射
//!    - 无标签（其他工具写出的文件）时按名称判定：所有成员名
//!      （及除 `num` 外的属性名）都能解析为整数 → 序列，否则 → 映射。
//!      键恰好全为数字的无标签映射会被误判为序列，这是已知限制。
//!
//! 序列元素可能是子节点，也可能是整数命名的属性（标量元素）；
//! 映射合并子节点与属性，同名冲突视为 `MalformedInput`。
//! 定长字符串（numpy 写出的 `S`/`U` 数组）去掉 NUL 填充后读为文本。
//!
//! ## 依赖关系
//! - 被 `h5/result.rs`、`commands/inspect.rs` 使用
//! - 使用 `h5/write.rs` 中的标签常量

use crate::error::{Result, VoxportError};
use crate::h5::write::{KIND_ATTR, KIND_MAPPING, KIND_SEQUENCE, NUM_ATTR};
use crate::models::{ArrayValue, ScalarValue, Value};

use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Container, Dataset, Group, H5Type, LocationType};
use ndarray::ArrayD;
use std::collections::BTreeMap;

/// 容器中的节点
pub enum Node {
    Dataset(Dataset),
    Group(Group),
}

/// 读取 `group` 下路径 `path` 处的子树；空路径表示 `group` 本身
pub fn read(group: &Group, path: &str) -> Result<Value> {
    match probe(group, path)? {
        Some(node) => read_node(&node),
        None => Err(VoxportError::NotFound {
            path: format!("{}:/{}", group.filename(), path.trim_matches('/')),
        }),
    }
}

/// 逐级探测路径，不存在时返回 `None`
pub fn probe(group: &Group, path: &str) -> Result<Option<Node>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut current = group.clone();

    let Some((last, parents)) = segments.split_last() else {
        return Ok(Some(Node::Group(current)));
    };

    for segment in parents {
        match member_type(&current, segment)? {
            Some(LocationType::Group) => current = open_group(&current, segment)?,
            _ => return Ok(None),
        }
    }

    match member_type(&current, last)? {
        Some(LocationType::Dataset) => current
            .dataset(last)
            .map(|ds| Some(Node::Dataset(ds)))
            .map_err(|e| VoxportError::container(current.filename(), e)),
        Some(LocationType::Group) => open_group(&current, last).map(|g| Some(Node::Group(g))),
        Some(_) => Err(VoxportError::MalformedInput(format!(
            "'{}' is neither a dataset nor a group",
            path
        ))),
        None => Ok(None),
    }
}

fn member_type(group: &Group, name: &str) -> Result<Option<LocationType>> {
    if !group.link_exists(name) {
        return Ok(None);
    }
    group
        .loc_type_by_name(name)
        .map(Some)
        .map_err(|e| VoxportError::container(group.filename(), e))
}

fn open_group(group: &Group, name: &str) -> Result<Group> {
    group
        .group(name)
        .map_err(|e| VoxportError::container(group.filename(), e))
}

fn read_node(node: &Node) -> Result<Value> {
    match node {
        Node::Dataset(ds) => read_array(ds, &ds.name()).map(Value::Array),
        Node::Group(group) => read_group(group),
    }
}

fn read_group(group: &Group) -> Result<Value> {
    let h5 = |e: hdf5::Error| VoxportError::container(group.filename(), e);
    let members = group.member_names().map_err(h5)?;
    let attrs = group.attr_names().map_err(h5)?;

    let kind = if attrs.iter().any(|a| a == KIND_ATTR) {
        let attr = group.attr(KIND_ATTR).map_err(h5)?;
        match read_scalar(&attr, KIND_ATTR)? {
            ScalarValue::Text(kind) => Some(kind),
            _ => None,
        }
    } else {
        None
    };

    tracing::debug!(group = %group.name(), kind = ?kind, "read group");

    match kind.as_deref() {
        Some(KIND_SEQUENCE) => read_sequence(group, &members, &attrs),
        Some(KIND_MAPPING) => read_mapping(group, &members, &attrs),
        Some(other) => Err(VoxportError::MalformedInput(format!(
            "Unknown group kind '{}' at {}",
            other,
            group.name()
        ))),
        None => {
            let all_indices = members
                .iter()
                .map(String::as_str)
                .chain(attrs.iter().map(String::as_str).filter(|a| *a != NUM_ATTR))
                .all(|name| name.parse::<i64>().is_ok());
            if all_indices {
                read_sequence(group, &members, &attrs)
            } else {
                read_mapping(group, &members, &attrs)
            }
        }
    }
}

fn read_sequence(group: &Group, members: &[String], attrs: &[String]) -> Result<Value> {
    let h5 = |e: hdf5::Error| VoxportError::container(group.filename(), e);
    let mut entries: Vec<(i64, Value)> = Vec::with_capacity(members.len() + attrs.len());

    for name in members {
        let index = parse_index(group, name)?;
        ensure_unique_index(group, &entries, index)?;
        entries.push((index, read(group, name)?));
    }

    let mut num = None;
    for name in attrs {
        if name == KIND_ATTR {
            continue;
        }
        let attr = group.attr(name).map_err(h5)?;
        if name == NUM_ATTR {
            num = Some(read_scalar(&attr, name)?);
            continue;
        }
        let index = parse_index(group, name)?;
        ensure_unique_index(group, &entries, index)?;
        entries.push((index, read_attr_value(&attr, name)?));
    }

    if let Some(num) = num {
        let expected = match num {
            ScalarValue::Int(n) => n,
            other => {
                return Err(VoxportError::MalformedInput(format!(
                    "Attribute 'num' of {} is not an integer: {:?}",
                    group.name(),
                    other
                )))
            }
        };
        if expected != entries.len() as i64 {
            return Err(VoxportError::MalformedInput(format!(
                "{} declares num = {} but holds {} elements",
                group.name(),
                expected,
                entries.len()
            )));
        }
    }

    entries.sort_by_key(|(i, _)| *i);
    Ok(Value::Sequence(entries.into_iter().map(|(_, v)| v).collect()))
}

fn parse_index(group: &Group, name: &str) -> Result<i64> {
    name.parse::<i64>().map_err(|_| {
        VoxportError::MalformedInput(format!(
            "Sequence {} has non-integer member '{}'",
            group.name(),
            name
        ))
    })
}

/// `"1"` 与 `"01"`、或同名的子节点与属性，都指向同一个元素
fn ensure_unique_index(group: &Group, entries: &[(i64, Value)], index: i64) -> Result<()> {
    if entries.iter().any(|(i, _)| *i == index) {
        return Err(VoxportError::MalformedInput(format!(
            "Element {} of {} is stored twice",
            index,
            group.name()
        )));
    }
    Ok(())
}

fn read_mapping(group: &Group, members: &[String], attrs: &[String]) -> Result<Value> {
    let h5 = |e: hdf5::Error| VoxportError::container(group.filename(), e);
    let mut map = BTreeMap::new();

    for name in members {
        map.insert(name.clone(), read(group, name)?);
    }

    for name in attrs {
        if name == KIND_ATTR {
            continue;
        }
        if map.contains_key(name) {
            return Err(VoxportError::MalformedInput(format!(
                "Attribute '{}' collides with a member of {}",
                name,
                group.name()
            )));
        }
        let attr = group.attr(name).map_err(h5)?;
        map.insert(name.clone(), read_attr_value(&attr, name)?);
    }

    Ok(Value::Mapping(map))
}

/// 属性：0 维为标量，否则为数组
fn read_attr_value(attr: &Container, name: &str) -> Result<Value> {
    if attr.ndim() == 0 {
        read_scalar(attr, name).map(Value::Scalar)
    } else {
        read_array(attr, name).map(Value::Array)
    }
}

fn descriptor(c: &Container, name: &str) -> Result<TypeDescriptor> {
    c.dtype()
        .and_then(|dt| dt.to_descriptor())
        .map_err(|e| VoxportError::container(name, e))
}

fn read_array(c: &Container, name: &str) -> Result<ArrayValue> {
    let h5 = |e: hdf5::Error| VoxportError::container(name, e);
    let value = match descriptor(c, name)? {
        TypeDescriptor::Float(_) => ArrayValue::Float(c.read_dyn::<f64>().map_err(h5)?),
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            ArrayValue::Int(c.read_dyn::<i64>().map_err(h5)?)
        }
        TypeDescriptor::Boolean => {
            ArrayValue::Int(c.read_dyn::<bool>().map_err(h5)?.mapv(i64::from))
        }
        TypeDescriptor::VarLenUnicode => ArrayValue::Text(
            c.read_dyn::<VarLenUnicode>()
                .map_err(h5)?
                .mapv(|s| s.as_str().to_string()),
        ),
        TypeDescriptor::VarLenAscii => ArrayValue::Text(
            c.read_dyn::<VarLenAscii>()
                .map_err(h5)?
                .mapv(|s| s.as_str().to_string()),
        ),
        TypeDescriptor::FixedAscii(size) => ArrayValue::Text(read_fixed_text(c, name, size, false)?),
        TypeDescriptor::FixedUnicode(size) => ArrayValue::Text(read_fixed_text(c, name, size, true)?),
        other => {
            return Err(VoxportError::MalformedInput(format!(
                "Unsupported element type {:?} in {}",
                other, name
            )))
        }
    };
    Ok(value)
}

fn read_scalar(c: &Container, name: &str) -> Result<ScalarValue> {
    let h5 = |e: hdf5::Error| VoxportError::container(name, e);
    let value = match descriptor(c, name)? {
        TypeDescriptor::Float(_) => ScalarValue::Float(c.read_scalar::<f64>().map_err(h5)?),
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            ScalarValue::Int(c.read_scalar::<i64>().map_err(h5)?)
        }
        TypeDescriptor::Boolean => ScalarValue::Bool(c.read_scalar::<bool>().map_err(h5)?),
        TypeDescriptor::VarLenUnicode => ScalarValue::Text(
            c.read_scalar::<VarLenUnicode>()
                .map_err(h5)?
                .as_str()
                .to_string(),
        ),
        TypeDescriptor::VarLenAscii => ScalarValue::Text(
            c.read_scalar::<VarLenAscii>()
                .map_err(h5)?
                .as_str()
                .to_string(),
        ),
        TypeDescriptor::FixedAscii(size) => {
            ScalarValue::Text(first_text(read_fixed_text(c, name, size, false)?))
        }
        TypeDescriptor::FixedUnicode(size) => {
            ScalarValue::Text(first_text(read_fixed_text(c, name, size, true)?))
        }
        other => {
            return Err(VoxportError::MalformedInput(format!(
                "Unsupported scalar type {:?} in {}",
                other, name
            )))
        }
    };
    Ok(value)
}

/// 定长字符串读入不小于其长度的缓冲类型，由 HDF5 完成补齐
fn read_fixed_text(c: &Container, name: &str, size: usize, unicode: bool) -> Result<ArrayD<String>> {
    macro_rules! read_with_capacity {
        ($($cap:literal),*) => {
            $(
                if size <= $cap {
                    return if unicode {
                        fixed_text::<FixedUnicode<$cap>>(c, name)
                    } else {
                        fixed_text::<FixedAscii<$cap>>(c, name)
                    };
                }
            )*
        };
    }
    read_with_capacity!(16, 64, 256, 1024, 4096);

    Err(VoxportError::MalformedInput(format!(
        "Fixed-length strings of {} bytes in {} are too long",
        size, name
    )))
}

fn first_text(text: ArrayD<String>) -> String {
    text.into_iter().next().unwrap_or_default()
}

fn fixed_text<T: H5Type + AsRef<str>>(c: &Container, name: &str) -> Result<ArrayD<String>> {
    let raw = c
        .read_dyn::<T>()
        .map_err(|e| VoxportError::container(name, e))?;
    Ok(raw.map(|s| s.as_ref().trim_end_matches('\0').to_string()))
}
