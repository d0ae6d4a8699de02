// ==========================================
// 供应链补货规划系统 - 配置层
// ==========================================
// 职责: 系统配置管理, 支持文件 + 环境变量覆写
// 存储: key-value 表 (global scope)
// ==========================================

pub mod config_manager;
pub mod error;
pub mod settings_reader;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_config_path, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use settings_reader::PlanningConfigReader;
