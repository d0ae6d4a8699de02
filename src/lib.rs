// ==========================================
// 供应链补货规划系统 - 核心库
// ==========================================
// 职责: 补货建议 + 预测版本管理 + 预测影响分析 + PO 到货任务
// 系统定位: 决策支持 (人工最终控制权)
// 红线: 引擎纯计算, 不做 IO; 持久化由宿主经 Repository 完成
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 公共工具 - 日历与数值
pub mod common;

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据仓储层 - 状态存取
pub mod repository;

// API 层 - 业务接口
pub mod api;

// 统一错误
pub mod error;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AbcClass, Confidence, ConflictDecisionKind, ConflictType, FlagReason, FoStatus, ImportMode,
    SuggestionStatus,
};

// 领域实体
pub use domain::{
    FoSuggestion, ForecastImpactResult, ForecastOrder, ForecastState, ForecastVersion,
    ImpactSummary, PlanningSettings, PlanningState, PoArrivalTask, Product, PurchaseOrder,
    Supplier,
};

// 引擎
pub use engine::{
    ArrivalTaskBuilder, CalculatorFoRecommender, ForecastImpactAnalyzer, ForecastVersionStore,
    ImpactPolicy, ReplenishmentCalculator, RevenueAbcClassifier, SimpleInventoryProjector,
};

// API
pub use api::{ApiError, ApiResult, PlanningApi};

// 错误
pub use error::{PlanningError, PlanningResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "supply-planner";
