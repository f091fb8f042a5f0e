//! # 分子几何数据模型
//!
//! 每个原子一条记录 `{symbol, charge, label}`（容器中的 `geo_info`），
//! 与按索引对齐的笛卡尔坐标（`geo_spec`，单位 a₀）。
//!
//! ## 依赖关系
//! - 被 `h5/result.rs` 和 `writers/cube.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, VoxportError};

use ndarray::{Array2, ArrayD};
use serde::Serialize;

/// 原子记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomRecord {
    /// 元素符号
    pub symbol: String,
    /// 核电荷
    pub charge: f64,
    /// 原子标签（通常为序号）
    pub label: String,
}

impl AtomRecord {
    pub fn new(symbol: impl Into<String>, charge: f64, label: impl Into<String>) -> Self {
        AtomRecord {
            symbol: symbol.into(),
            charge,
            label: label.into(),
        }
    }

    /// 原子序数（核电荷取整）
    pub fn atomic_number(&self) -> i64 {
        self.charge.round() as i64
    }
}

/// 分子几何
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Geometry {
    pub atoms: Vec<AtomRecord>,
    pub coords: Vec<[f64; 3]>,
}

impl Geometry {
    /// 创建几何，两个数组长度必须一致
    pub fn new(atoms: Vec<AtomRecord>, coords: Vec<[f64; 3]>) -> Result<Self> {
        if atoms.len() != coords.len() {
            return Err(VoxportError::MalformedInput(format!(
                "geo_info has {} atoms but geo_spec has {}",
                atoms.len(),
                coords.len()
            )));
        }
        Ok(Geometry { atoms, coords })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// `geo_info` 文本数组，形状 (n_atoms, 3)
    pub fn info_array(&self) -> Array2<String> {
        let mut out = Array2::from_elem((self.atoms.len(), 3), String::new());
        for (i, atom) in self.atoms.iter().enumerate() {
            out[[i, 0]] = atom.symbol.clone();
            out[[i, 1]] = format_charge(atom.charge);
            out[[i, 2]] = atom.label.clone();
        }
        out
    }

    /// `geo_spec` 坐标数组，形状 (n_atoms, 3)
    pub fn spec_array(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.coords.len(), 3));
        for (i, r) in self.coords.iter().enumerate() {
            for k in 0..3 {
                out[[i, k]] = r[k];
            }
        }
        out
    }

    /// 从容器中读出的 `geo_info` / `geo_spec` 重建几何
    pub fn from_arrays(info: &ArrayD<String>, spec: &ArrayD<f64>) -> Result<Self> {
        let info_shape = info.shape();
        let spec_shape = spec.shape();
        if info_shape.len() != 2 || info_shape[1] != 3 {
            return Err(VoxportError::MalformedInput(format!(
                "geo_info must have shape (n, 3), got {:?}",
                info_shape
            )));
        }
        if spec_shape.len() != 2 || spec_shape[1] != 3 {
            return Err(VoxportError::MalformedInput(format!(
                "geo_spec must have shape (n, 3), got {:?}",
                spec_shape
            )));
        }

        let mut atoms = Vec::with_capacity(info_shape[0]);
        for i in 0..info_shape[0] {
            let charge_text = &info[[i, 1]];
            let charge = charge_text.trim().parse::<f64>().map_err(|_| {
                VoxportError::MalformedInput(format!(
                    "Invalid nuclear charge '{}' for atom {}",
                    charge_text, i
                ))
            })?;
            atoms.push(AtomRecord::new(
                info[[i, 0]].clone(),
                charge,
                info[[i, 2]].clone(),
            ));
        }

        let coords = (0..spec_shape[0])
            .map(|i| [spec[[i, 0]], spec[[i, 1]], spec[[i, 2]]])
            .collect();

        Geometry::new(atoms, coords)
    }
}

/// 核电荷文本：整数电荷不带小数
fn format_charge(charge: f64) -> String {
    if charge.fract() == 0.0 {
        format!("{}", charge as i64)
    } else {
        format!("{}", charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Geometry {
        Geometry::new(
            vec![
                AtomRecord::new("O", 8.0, "1"),
                AtomRecord::new("H", 1.0, "2"),
                AtomRecord::new("H", 1.0, "3"),
            ],
            vec![[0.0, 0.0, 0.0], [0.0, 1.43, 1.11], [0.0, -1.43, 1.11]],
        )
        .unwrap()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Geometry::new(vec![AtomRecord::new("H", 1.0, "1")], vec![]);
        assert!(matches!(result, Err(VoxportError::MalformedInput(_))));
    }

    #[test]
    fn test_array_round_trip() {
        let geo = water();
        let info = geo.info_array().into_dyn();
        let spec = geo.spec_array().into_dyn();
        assert_eq!(info[[0, 1]], "8");

        let back = Geometry::from_arrays(&info, &spec).unwrap();
        assert_eq!(back, geo);
    }

    #[test]
    fn test_atomic_number() {
        assert_eq!(AtomRecord::new("C", 6.0, "1").atomic_number(), 6);
        assert_eq!(AtomRecord::new("X", 0.4, "1").atomic_number(), 0);
    }
}
