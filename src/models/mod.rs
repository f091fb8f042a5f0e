//! # 数据模型模块
//!
//! 定义通用层次数据树、分子几何、网格描述与轨道元数据。
//!
//! ## 依赖关系
//! - 被 `h5/`、`writers/`、`output/` 和 `commands/` 使用
//! - 子模块: value, geometry, grid, orbital

pub mod geometry;
pub mod grid;
pub mod orbital;
pub mod value;

pub use geometry::{AtomRecord, Geometry};
pub use grid::GridDescriptor;
pub use orbital::MolecularOrbital;
pub use value::{ArrayValue, ScalarValue, Value};
