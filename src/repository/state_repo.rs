// ==========================================
// 供应链补货规划系统 - 应用状态仓储
// ==========================================
// 职责: PlanningState 的整体加载与保存
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::state::PlanningState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ==========================================
// PlanningStateRepository Trait
// ==========================================
pub trait PlanningStateRepository: Send + Sync {
    /// 加载完整状态
    fn load(&self) -> RepositoryResult<PlanningState>;

    /// 保存完整状态 (整体覆盖)
    fn save(&self, state: &PlanningState) -> RepositoryResult<()>;
}

// ==========================================
// InMemoryStateRepository - 内存仓储 (测试/嵌入)
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateRepository {
    state: Arc<Mutex<PlanningState>>,
}

impl InMemoryStateRepository {
    pub fn new(state: PlanningState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

impl PlanningStateRepository for InMemoryStateRepository {
    fn load(&self) -> RepositoryResult<PlanningState> {
        let state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(state.clone())
    }

    fn save(&self, state: &PlanningState) -> RepositoryResult<()> {
        let mut stored = self
            .state
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        *stored = state.clone();
        Ok(())
    }
}

// ==========================================
// JsonFileStateRepository - JSON 文件仓储
// ==========================================
/// 文件不存在时 load 返回默认空状态
#[derive(Debug, Clone)]
pub struct JsonFileStateRepository {
    path: PathBuf,
}

impl JsonFileStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanningStateRepository for JsonFileStateRepository {
    fn load(&self) -> RepositoryResult<PlanningState> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "状态文件不存在, 使用空状态");
            return Ok(PlanningState::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&raw)?;
        Ok(state)
    }

    fn save(&self, state: &PlanningState) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("创建目录失败: {}", parent.display()))?;
        }

        // 先写临时文件再替换, 避免写一半
        let tmp_path = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(state)?;
        std::fs::write(&tmp_path, raw)?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("替换状态文件失败: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "状态已保存");
        Ok(())
    }
}
