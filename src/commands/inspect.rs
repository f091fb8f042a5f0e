//! # inspect 命令实现
//!
//! 用反序列化引擎读取容器子树，以表格或 JSON 形式显示。
//!
//! ## 依赖关系
//! - 使用 `cli/inspect.rs` 定义的 InspectArgs
//! - 使用 `h5/` 读取数据树
//! - 使用 `tabled` 显示表格，`serde_json` 输出 JSON

use crate::cli::inspect::InspectArgs;
use crate::error::{Result, VoxportError};
use crate::h5::{read, Container};
use crate::models::{ArrayValue, ScalarValue, Value};
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, PartialEq, Tabled)]
struct NodeRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Shape / Value")]
    summary: String,
}

/// 执行 inspect 命令
pub fn execute(args: InspectArgs) -> Result<()> {
    let container = Container::open(&args.file)?;
    let value = read(container.root(), &args.path)?;
    drop(container);

    if args.json {
        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| VoxportError::Other(format!("JSON serialization failed: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    output::print_header(&format!("{}:{}", args.file.display(), args.path));
    let mut rows = Vec::new();
    let root = args.path.trim_end_matches('/').to_string();
    collect_rows(&value, &root, args.preview, &mut rows);

    if rows.is_empty() {
        output::print_info("Empty group");
    } else {
        println!("{}", Table::new(&rows));
    }
    Ok(())
}

/// 深度优先展开数据树
fn collect_rows(value: &Value, path: &str, preview: usize, rows: &mut Vec<NodeRow>) {
    let display_path = if path.is_empty() { "/" } else { path };
    match value {
        Value::Array(array) => rows.push(NodeRow {
            path: display_path.to_string(),
            kind: value.kind().to_string(),
            dtype: array.type_name().to_string(),
            summary: array_summary(array, preview),
        }),
        Value::Scalar(scalar) => {
            let (dtype, text) = scalar_summary(scalar);
            rows.push(NodeRow {
                path: display_path.to_string(),
                kind: value.kind().to_string(),
                dtype: dtype.to_string(),
                summary: text,
            });
        }
        Value::Sequence(items) => {
            rows.push(NodeRow {
                path: display_path.to_string(),
                kind: value.kind().to_string(),
                dtype: String::new(),
                summary: format!("{} item(s)", items.len()),
            });
            for (i, item) in items.iter().enumerate() {
                collect_rows(item, &format!("{}/{}", path, i), preview, rows);
            }
        }
        Value::Mapping(map) => {
            rows.push(NodeRow {
                path: display_path.to_string(),
                kind: value.kind().to_string(),
                dtype: String::new(),
                summary: format!("{} key(s)", map.len()),
            });
            for (key, child) in map {
                collect_rows(child, &format!("{}/{}", path, key), preview, rows);
            }
        }
    }
}

fn array_summary(array: &ArrayValue, preview: usize) -> String {
    let items: Vec<String> = match array {
        ArrayValue::Float(a) => a.iter().take(preview).map(|v| format!("{:.6}", v)).collect(),
        ArrayValue::Int(a) => a.iter().take(preview).map(|v| v.to_string()).collect(),
        ArrayValue::Text(a) => a.iter().take(preview).map(|v| format!("{:?}", v)).collect(),
    };
    let len: usize = array.shape().iter().product();
    let more = if len > preview { ", ..." } else { "" };
    format!("{:?} [{}{}]", array.shape(), items.join(", "), more)
}

fn scalar_summary(scalar: &ScalarValue) -> (&'static str, String) {
    match scalar {
        ScalarValue::Float(v) => ("float", v.to_string()),
        ScalarValue::Int(v) => ("int", v.to_string()),
        ScalarValue::Bool(v) => ("bool", v.to_string()),
        ScalarValue::Text(v) => ("text", format!("{:?}", v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{ArrayD, IxDyn};
    use std::collections::BTreeMap;

    #[test]
    fn test_collect_rows_walks_tree() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::from(1_i64));
        map.insert(
            "b".to_string(),
            Value::Sequence(vec![Value::from(ArrayD::from_elem(IxDyn(&[8]), 0.5))]),
        );
        let value = Value::Mapping(map);

        let mut rows = Vec::new();
        collect_rows(&value, "", 3, &mut rows);

        let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/a", "/b", "/b/0"]);
        assert_eq!(rows[1].summary, "1");
        assert_eq!(rows[2].summary, "1 item(s)");
        assert_eq!(rows[3].summary, "[8] [0.500000, 0.500000, 0.500000, ...]");
    }
}
