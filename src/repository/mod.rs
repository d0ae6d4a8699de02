// ==========================================
// 供应链补货规划系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 应用状态的加载/保存, 屏蔽存储细节
// ==========================================

pub mod error;
pub mod state_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use state_repo::{InMemoryStateRepository, JsonFileStateRepository, PlanningStateRepository};
