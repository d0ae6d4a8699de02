// ==========================================
// 供应链补货规划系统 - 规划 API
// ==========================================
// 职责: 组装引擎 + 仓储, 对宿主应用暴露规划操作
// - FO 建议
// - 预测版本导入/改名/删除/激活 + 冲突决定
// - 预测影响分析 (结果汇总写回 last_impact_summary)
// - PO 到货任务
// ==========================================
// 并发: 状态由 Mutex 守护; 所有版本写操作在锁内执行 (单写者)
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlanningConfigReader;
use crate::domain::arrival::PoArrivalTask;
use crate::domain::impact::ForecastImpactResult;
use crate::domain::forecast::ForecastVersion;
use crate::domain::replenishment::{FoSuggestion, ReplenishmentInput};
use crate::domain::state::{plan_from_forecast, PlanningState};
use crate::domain::types::ConflictDecisionKind;
use crate::engine::abc_classification::RevenueAbcClassifier;
use crate::engine::arrival_tasks::ArrivalTaskBuilder;
use crate::engine::collaborators::{AbcClassifier, FoRecommender, InventoryProjector};
use crate::engine::fo_recommendation::CalculatorFoRecommender;
use crate::engine::forecast_impact::{ForecastImpactAnalyzer, ImpactRequest};
use crate::engine::forecast_versions::{ForecastVersionStore, NewForecastVersion, VersionMetaUpdate};
use crate::engine::impact_policy::ImpactPolicy;
use crate::engine::inventory_projection::SimpleInventoryProjector;
use crate::engine::replenishment::ReplenishmentCalculator;
use crate::repository::state_repo::PlanningStateRepository;

/// ABC 分类默认统计月数
const ABC_HORIZON_MONTHS: usize = 12;

// ==========================================
// 请求对象
// ==========================================

/// FO 建议请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoSuggestionRequest {
    pub sku: String,
    /// 基准日期 (None = 本地当天)
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub operational_coverage_days: Option<i64>,
    #[serde(default)]
    pub eta_override: Option<NaiveDate>,
}

/// 影响分析请求 (版本 ID 缺省: to = 激活版本, from = 其前一个版本)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactAnalysisRequest {
    #[serde(default)]
    pub from_version_id: Option<String>,
    #[serde(default)]
    pub to_version_id: Option<String>,
    #[serde(default)]
    pub now_month: Option<String>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

// ==========================================
// PlanningApi - 规划 API
// ==========================================
pub struct PlanningApi {
    repo: Arc<dyn PlanningStateRepository>,
    state: Arc<Mutex<PlanningState>>,
    version_store: ForecastVersionStore,
    calculator: ReplenishmentCalculator,
    arrival_builder: ArrivalTaskBuilder,
    projector: Box<dyn InventoryProjector + Send + Sync>,
    /// 宿主注入的分类器; None = 按请求日期构建营收分类
    abc_classifier: Option<Box<dyn AbcClassifier + Send + Sync>>,
    /// 宿主注入的推荐器; None = 基于当前计算引擎 (含告警语言)
    recommender: Option<Box<dyn FoRecommender + Send + Sync>>,
    impact_policy: ImpactPolicy,
}

impl PlanningApi {
    /// 从仓储加载状态并创建 API
    ///
    /// 加载后执行一次容器保障 (含旧数据迁移)
    pub fn new(repo: Arc<dyn PlanningStateRepository>) -> ApiResult<Self> {
        let mut state = repo.load()?;
        let version_store = ForecastVersionStore::new();
        if version_store.ensure_containers(&mut state.forecast) {
            tracing::info!("预测数据已迁移为版本结构");
        }

        Ok(Self {
            repo,
            state: Arc::new(Mutex::new(state)),
            version_store,
            calculator: ReplenishmentCalculator::new(),
            arrival_builder: ArrivalTaskBuilder::new(),
            projector: Box::new(SimpleInventoryProjector::new()),
            abc_classifier: None,
            recommender: None,
            impact_policy: ImpactPolicy::default(),
        })
    }

    /// 应用配置: 全局设置写入状态, 判定策略与告警语言写入引擎
    ///
    /// 已注入的协作者保持不变
    pub fn with_config(self, config: &dyn PlanningConfigReader) -> ApiResult<Self> {
        let settings = config.get_planning_settings()?;
        let impact_policy = config.get_impact_policy()?;
        let locale = config.get_warning_locale()?;

        self.lock_state()?.settings = settings;
        tracing::info!(locale = %locale, "应用规划配置");

        Ok(Self {
            calculator: ReplenishmentCalculator::with_locale(&locale),
            impact_policy,
            ..self
        })
    }

    pub fn with_projector(mut self, projector: Box<dyn InventoryProjector + Send + Sync>) -> Self {
        self.projector = projector;
        self
    }

    pub fn with_abc_classifier(mut self, classifier: Box<dyn AbcClassifier + Send + Sync>) -> Self {
        self.abc_classifier = Some(classifier);
        self
    }

    pub fn with_recommender(mut self, recommender: Box<dyn FoRecommender + Send + Sync>) -> Self {
        self.recommender = Some(recommender);
        self
    }

    fn lock_state(&self) -> ApiResult<MutexGuard<'_, PlanningState>> {
        self.state
            .lock()
            .map_err(|e| ApiError::LockError(e.to_string()))
    }

    // ==========================================
    // 状态访问
    // ==========================================

    /// 当前状态副本
    pub fn state_snapshot(&self) -> ApiResult<PlanningState> {
        Ok(self.lock_state()?.clone())
    }

    /// 在锁内修改宿主数据 (商品、PO、FO、快照等)
    pub fn update_state<F, R>(&self, f: F) -> ApiResult<R>
    where
        F: FnOnce(&mut PlanningState) -> R,
    {
        let mut state = self.lock_state()?;
        Ok(f(&mut state))
    }

    /// 保存当前状态到仓储
    pub fn persist(&self) -> ApiResult<()> {
        let state = self.lock_state()?;
        self.repo.save(&state)?;
        tracing::info!("规划状态已保存");
        Ok(())
    }

    // ==========================================
    // FO 建议
    // ==========================================

    /// 计算单 SKU 的 FO 建议 (基于激活预测)
    pub fn suggest_fo(&self, request: &FoSuggestionRequest) -> ApiResult<FoSuggestion> {
        let sku = request.sku.trim();
        if sku.is_empty() {
            return Err(ApiError::InvalidInput("SKU 不能为空".to_string()));
        }

        let state = self.lock_state()?;
        let plan = plan_from_forecast(&state.forecast.forecast_import);
        let suggestion = self.calculator.compute(&ReplenishmentInput {
            sku,
            today: request.today.unwrap_or_else(|| Local::now().date_naive()),
            operational_coverage_days: request.operational_coverage_days,
            eta_override: request.eta_override,
            policy_defaults: state.settings.policy_defaults,
            policy_override: state.find_product(sku).map(|p| p.policy),
            plan: &plan,
            snapshot: &state.inventory_snapshots,
        });
        Ok(suggestion)
    }

    // ==========================================
    // 预测版本
    // ==========================================

    /// 导入新预测版本
    ///
    /// # 参数
    /// - `activate`: 导入后立即激活 (同步导入元数据)
    pub fn import_forecast_version(
        &self,
        input: NewForecastVersion,
        activate: bool,
    ) -> ApiResult<ForecastVersion> {
        let mut state = self.lock_state()?;
        let version = self.version_store.append_version(&mut state.forecast, input);
        if activate {
            self.version_store
                .set_active_version(&mut state.forecast, &version.id, true)?;
        }

        tracing::info!(
            version_id = %version.id,
            rows = version.stats.row_count,
            activate,
            "导入预测版本"
        );
        Ok(version)
    }

    /// 修改版本名称/备注
    pub fn rename_forecast_version(
        &self,
        version_id: &str,
        update: VersionMetaUpdate,
    ) -> ApiResult<bool> {
        let mut state = self.lock_state()?;
        Ok(self
            .version_store
            .rename_version(&mut state.forecast, version_id, update))
    }

    /// 删除非激活版本
    pub fn delete_forecast_version(&self, version_id: &str) -> ApiResult<ForecastVersion> {
        let mut state = self.lock_state()?;
        let removed = self
            .version_store
            .delete_version(&mut state.forecast, version_id)?;
        tracing::info!(version_id, "删除预测版本");
        Ok(removed)
    }

    /// 激活版本 (同步导入元数据)
    pub fn activate_forecast_version(&self, version_id: &str) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        self.version_store
            .set_active_version(&mut state.forecast, version_id, true)?;
        Ok(())
    }

    /// 记录 FO 冲突处理决定
    pub fn record_conflict_decision(
        &self,
        version_id: &str,
        fo_id: &str,
        decision: ConflictDecisionKind,
        note: Option<String>,
    ) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        self.version_store.record_conflict_decision(
            &mut state.forecast,
            version_id,
            fo_id,
            decision,
            note,
        )?;
        Ok(())
    }

    // ==========================================
    // 预测影响分析
    // ==========================================

    /// 执行影响分析, 并把汇总写回 last_impact_summary
    ///
    /// 未注入协作者时, ABC 分类窗口从请求的 today 起算
    pub fn analyze_forecast_impact(
        &self,
        request: &ImpactAnalysisRequest,
    ) -> ApiResult<ForecastImpactResult> {
        let today = request.today.unwrap_or_else(|| Local::now().date_naive());
        let default_classifier;
        let abc_classifier: &dyn AbcClassifier = match &self.abc_classifier {
            Some(classifier) => &**classifier,
            None => {
                default_classifier = RevenueAbcClassifier::new(today, ABC_HORIZON_MONTHS);
                &default_classifier
            }
        };
        let default_recommender;
        let recommender: &dyn FoRecommender = match &self.recommender {
            Some(recommender) => &**recommender,
            None => {
                default_recommender =
                    CalculatorFoRecommender::with_calculator(self.calculator.clone());
                &default_recommender
            }
        };

        let mut state = self.lock_state()?;

        let mut result = {
            let to = match request.to_version_id.as_deref() {
                Some(id) => Some(find_version(&state, id)?),
                None => state.forecast.active_version(),
            };
            let from = match request.from_version_id.as_deref() {
                Some(id) => Some(find_version(&state, id)?),
                None if request.to_version_id.is_none() => state.forecast.previous_version(),
                None => None,
            };

            let analyzer =
                ForecastImpactAnalyzer::new(&*self.projector, abc_classifier, recommender)
                    .with_policy(self.impact_policy.clone());

            analyzer.analyze(
                &state,
                &ImpactRequest {
                    from,
                    to,
                    now_month: request.now_month.as_deref(),
                    today: Some(today),
                },
            )?
        };

        result.summary.computed_at = Some(Utc::now());
        state.forecast.last_impact_summary = Some(result.summary.clone());

        tracing::info!(
            flagged = result.summary.flagged_skus,
            conflicts_open = result.summary.fo_conflicts_open,
            "预测影响分析完成"
        );
        Ok(result)
    }

    // ==========================================
    // PO 到货任务
    // ==========================================

    pub fn arrival_tasks(
        &self,
        month: &str,
        today: Option<NaiveDate>,
    ) -> ApiResult<Vec<PoArrivalTask>> {
        let state = self.lock_state()?;
        Ok(self.arrival_builder.build(&state, month, today)?)
    }
}

fn find_version<'a>(state: &'a PlanningState, version_id: &str) -> ApiResult<&'a ForecastVersion> {
    state
        .forecast
        .find_version(version_id)
        .ok_or_else(|| ApiError::NotFound(format!("预测版本(id={})不存在", version_id)))
}
