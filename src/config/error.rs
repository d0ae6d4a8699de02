// ==========================================
// 供应链补货规划系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件格式错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置值无效: key={key}, value={value}")]
    InvalidValue { key: String, value: String },

    #[error("配置锁获取失败: {0}")]
    LockError(String),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
