//! # 诊断日志
//!
//! 安装 `tracing-subscriber`：写到 stderr，过滤级别取自 `RUST_LOG`，
//! 默认只显示警告。用户可见的消息仍走 `utils/output.rs`。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // 重复初始化时保留已有的订阅者
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
