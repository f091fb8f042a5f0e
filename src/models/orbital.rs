//! # 轨道元数据
//!
//! 分子轨道描述（`mo_spec`）。每个轨道转换为通用数据树中的映射，
//! 同时提供写入 `MO_info` 组所需的并列数组，以及从读回的数据树还原。
//!
//! ## 依赖关系
//! - 被 `h5/result.rs` 和 `output/options.rs` 使用
//! - 使用 `models/value.rs`

use crate::error::{Result, VoxportError};
use crate::models::value::{ArrayValue, ScalarValue, Value};

use std::collections::BTreeMap;

/// 单个分子轨道
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularOrbital {
    /// 对称性标签，如 `1.1` 或 `3.A1`
    pub sym: String,
    /// 占据数
    pub occ_num: f64,
    /// 轨道能量 (E_h)
    pub energy: f64,
    /// 原子轨道展开系数
    pub coeffs: Vec<f64>,
}

impl MolecularOrbital {
    pub fn new(sym: impl Into<String>, occ_num: f64, energy: f64, coeffs: Vec<f64>) -> Self {
        MolecularOrbital {
            sym: sym.into(),
            occ_num,
            energy,
            coeffs,
        }
    }

    /// 转换为通用数据树
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("sym".to_string(), Value::from(self.sym.as_str()));
        map.insert("occ_num".to_string(), Value::from(self.occ_num));
        map.insert("energy".to_string(), Value::from(self.energy));
        map.insert(
            "coeffs".to_string(),
            Value::Array(ArrayValue::from_f64(self.coeffs.clone())),
        );
        Value::Mapping(map)
    }
}

/// 整个 `mo_spec` 转换为序列
pub fn mo_spec_value(orbitals: &[MolecularOrbital]) -> Value {
    Value::Sequence(orbitals.iter().map(MolecularOrbital::to_value).collect())
}

/// 从读回的数据树还原 `mo_spec`
pub fn mo_spec_from_value(value: &Value) -> Result<Vec<MolecularOrbital>> {
    let Value::Sequence(items) = value else {
        return Err(malformed("mo_spec", "a sequence", value));
    };
    items.iter().map(orbital_from_value).collect()
}

fn orbital_from_value(value: &Value) -> Result<MolecularOrbital> {
    let sym = match field(value, "sym")? {
        Value::Scalar(ScalarValue::Text(s)) => s.clone(),
        Value::Scalar(ScalarValue::Int(i)) => i.to_string(),
        other => return Err(malformed("sym", "text", other)),
    };
    let coeffs = match field(value, "coeffs")? {
        Value::Array(ArrayValue::Float(a)) => a.iter().copied().collect(),
        Value::Array(ArrayValue::Int(a)) => a.iter().map(|v| *v as f64).collect(),
        other => return Err(malformed("coeffs", "a numeric array", other)),
    };

    Ok(MolecularOrbital::new(
        sym,
        number(value, "occ_num")?,
        number(value, "energy")?,
        coeffs,
    ))
}

fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    value
        .get(name)
        .ok_or_else(|| VoxportError::MalformedInput(format!("Orbital entry has no '{}'", name)))
}

fn number(value: &Value, name: &str) -> Result<f64> {
    match field(value, name)? {
        Value::Scalar(ScalarValue::Float(v)) => Ok(*v),
        Value::Scalar(ScalarValue::Int(v)) => Ok(*v as f64),
        other => Err(malformed(name, "a number", other)),
    }
}

fn malformed(name: &str, expected: &str, found: &Value) -> VoxportError {
    VoxportError::MalformedInput(format!(
        "'{}' must be {}, found {}",
        name,
        expected,
        found.kind()
    ))
}
