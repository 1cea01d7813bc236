//! 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 订阅器（`RUST_LOG` 控制过滤），
//! 并把 `log` crate 的记录桥接到 `tracing`。

use tracing::debug;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// 默认过滤级别
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 初始化日志（默认级别 `info`）
///
/// 返回是否由本次调用完成安装；已经存在全局订阅器时返回 `false`，不会 panic。
pub fn init_logger() -> bool {
    init_logger_with_default(DEFAULT_LOG_FILTER)
}

/// 初始化日志，`RUST_LOG` 未设置或无法解析时使用 `default_filter`
///
/// ```
/// // 第二次调用不会替换已有的订阅器
/// let _ = fri_driver::init_logger_with_default("fri_driver=debug");
/// assert!(!fri_driver::init_logger());
/// ```
pub fn init_logger_with_default(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    if let Err(e) = LogTracer::init() {
        debug!("log records are not bridged to tracing: {}", e);
    }
    true
}
