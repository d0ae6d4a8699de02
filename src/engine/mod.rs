// ==========================================
// 供应链补货规划系统 - 引擎层
// ==========================================
// 职责: 纯计算引擎, 输入为内存状态, 无 IO
// 红线: 数据缺失降级为 warning/status, 不 panic
// 例外: ForecastVersionStore 原地修改调用方传入的 ForecastState
// ==========================================

pub mod abc_classification;
pub mod arrival_tasks;
pub mod collaborators;
pub mod fo_recommendation;
pub mod forecast_impact;
pub mod forecast_versions;
pub mod impact_policy;
pub mod inventory_projection;
pub mod lead_time;
pub mod replenishment;

// 重导出核心引擎
pub use abc_classification::{RevenueAbcClassifier, StaticAbcClassifier};
pub use arrival_tasks::{resolve_po_eta, ArrivalTaskBuilder};
pub use collaborators::{
    AbcClassifier, FoRecommendation, FoRecommendationContext, FoRecommender, InventoryProjection,
    InventoryProjector, ProjectionMode, ProjectionRow,
};
pub use fo_recommendation::CalculatorFoRecommender;
pub use forecast_impact::{ForecastImpactAnalyzer, ImpactRequest};
pub use forecast_versions::{
    normalize_forecast_entry, normalize_forecast_import, ForecastVersionStore, NewForecastVersion,
    VersionMetaUpdate, VersionStoreError,
};
pub use impact_policy::{AbcThreshold, FoConflictCheck, ImpactPolicy};
pub use inventory_projection::SimpleInventoryProjector;
pub use lead_time::{resolve_fo_arrival_date, resolve_fo_lead_time, ResolvedLeadTime};
pub use replenishment::{days_on_hand, ReplenishmentCalculator};
