// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// 引擎只输出 debug/trace, API 层输出 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤器 (RUST_LOG 未设置时)
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=supply_planner::engine=trace
///
/// # 示例
/// ```no_run
/// use supply_planner::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化 JSON 格式日志 (宿主采集日志时使用)
pub fn init_json() {
    fmt().with_env_filter(env_filter()).json().init();
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试; 重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
