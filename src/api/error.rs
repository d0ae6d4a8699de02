// ==========================================
// 供应链补货规划系统 - API 层错误类型
// ==========================================
// 职责: 定义 API 层错误类型, 转换下层错误为可读消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::forecast_versions::VersionStoreError;
use crate::error::PlanningError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 版本存储的业务失败 (带稳定原因码)
    #[error("预测版本操作失败: {0}")]
    VersionStore(#[from] VersionStoreError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("状态锁获取失败: {0}")]
    LockError(String),

    #[error("状态存储失败: {0}")]
    StorageError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定原因码 (ACTIVE_VERSION / NOT_FOUND / ...)
    pub fn reason_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::VersionStore(err) => err.code(),
            ApiError::LockError(_) | ApiError::StorageError(_) => "STORAGE",
            ApiError::ConfigError(_) => "CONFIG",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL",
        }
    }
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => ApiError::LockError(msg),
            RepositoryError::Io(e) => ApiError::StorageError(e.to_string()),
            RepositoryError::Json(e) => ApiError::StorageError(format!("状态文件格式错误: {}", e)),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<PlanningError> for ApiError {
    fn from(err: PlanningError) -> Self {
        match err {
            PlanningError::InvalidDate(_) | PlanningError::InvalidMonthKey(_) => {
                ApiError::InvalidInput(err.to_string())
            }
            PlanningError::Json(e) => ApiError::InvalidInput(e.to_string()),
            PlanningError::Io(e) => ApiError::StorageError(e.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
