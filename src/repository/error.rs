// ==========================================
// 供应链补货规划系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("状态锁获取失败: {0}")]
    LockError(String),

    #[error("状态文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("状态序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
