// ==========================================
// 供应链补货规划系统 - 核心错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 只有调用方错误 (非法日期/月份) 走 Err,
//       数据缺失一律降级为 warning/status
// ==========================================

use thiserror::Error;

/// 核心计算错误 (调用方错误)
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid month key: {0:?} (expected YYYY-MM)")]
    InvalidMonthKey(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type PlanningResult<T> = Result<T, PlanningError>;
