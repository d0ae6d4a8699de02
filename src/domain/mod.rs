// ==========================================
// 供应链补货规划系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含存储逻辑, 不含引擎逻辑
// ==========================================

pub mod arrival;
pub mod forecast;
pub mod impact;
pub mod order;
pub mod product;
pub mod replenishment;
pub mod settings;
pub mod state;
pub mod types;

// 重导出核心类型
pub use arrival::PoArrivalTask;
pub use forecast::{
    FoConflictDecision, ForecastEntry, ForecastMap, ForecastState, ForecastVersion,
    ForecastVersionStats,
};
pub use impact::{
    FoConflictRow, ForecastImpactResult, ImpactSummary, ImpactWindows, SkuImpactRow, WindowDelta,
};
pub use order::{ForecastOrder, PoLineItem, PurchaseOrder};
pub use product::{Product, Supplier};
pub use replenishment::{
    FoSuggestion, MonthlyPlan, MonthlySnapshot, ReplenishmentInput, ReplenishmentPolicy,
    ReplenishmentPolicyOverride, SuggestionRationale,
};
pub use settings::PlanningSettings;
pub use state::{plan_from_forecast, PlanningState};
pub use types::{
    AbcClass, Confidence, ConflictDecisionKind, ConflictType, FlagReason, FoStatus, ImportMode,
    RecommendationStatus, SafetyClass, SuggestionStatus,
};
