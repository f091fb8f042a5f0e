//! # 通用层次数据模型
//!
//! 序列化/反序列化引擎操作的内存数据树。
//!
//! ## 结构
//! - `Array`: 数值（或文本）数组，写为 Dataset，0 维数组同样写为 Dataset
//! - `Scalar`: 标量，写为所在 Group 的 Attribute
//! - `Sequence`: 有序列表，写为带 `num` 属性的 Group
//! - `Mapping`: 字符串键映射，写为 Group
//!
//! 数据树必须无环；`Box`/`Vec` 所有权保证了这一点。
//!
//! ## 依赖关系
//! - 被 `h5/` 和 `output/` 使用
//! - 使用 `ndarray` 存储数组

use ndarray::{Array1, ArrayD};
use serde::Serialize;
use std::collections::BTreeMap;

/// 数组叶节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArrayValue {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
    Text(ArrayD<String>),
}

impl ArrayValue {
    /// 数组形状
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayValue::Float(a) => a.shape(),
            ArrayValue::Int(a) => a.shape(),
            ArrayValue::Text(a) => a.shape(),
        }
    }

    /// 元素类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayValue::Float(_) => "f64",
            ArrayValue::Int(_) => "i64",
            ArrayValue::Text(_) => "str",
        }
    }

    /// 一维浮点数组
    pub fn from_f64(values: Vec<f64>) -> Self {
        ArrayValue::Float(Array1::from_vec(values).into_dyn())
    }
}

/// 标量叶节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

/// 层次数据树
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Array(ArrayValue),
    Scalar(ScalarValue),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// 节点类别名称（用于显示）
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Array(_) => "dataset",
            Value::Scalar(_) => "attribute",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// 按键取映射子节点
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// 结构相等比较：整数与文本精确相等，浮点数允许 `tol` 误差
    #[cfg(test)]
    pub fn approx_eq(&self, other: &Value, tol: f64) -> bool {
        match (self, other) {
            (Value::Array(ArrayValue::Float(a)), Value::Array(ArrayValue::Float(b))) => {
                a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tol)
            }
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Scalar(ScalarValue::Float(a)), Value::Scalar(ScalarValue::Float(b))) => {
                (a - b).abs() <= tol
            }
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, tol))
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map_or(false, |w| v.approx_eq(w, tol)))
            }
            _ => false,
        }
    }
}

impl From<ArrayD<f64>> for Value {
    fn from(a: ArrayD<f64>) -> Self {
        Value::Array(ArrayValue::Float(a))
    }
}

impl From<ArrayD<i64>> for Value {
    fn from(a: ArrayD<i64>) -> Self {
        Value::Array(ArrayValue::Int(a))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(ScalarValue::Float(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(ScalarValue::Int(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(ScalarValue::Bool(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(ScalarValue::Text(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(ScalarValue::Text(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Mapping(map)
    }
}
