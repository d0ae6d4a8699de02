// ==========================================
// 供应链补货规划系统 - 外部协作者接口
// ==========================================
// 职责: 影响分析所需的外部计算接口
// - 库存投影 (按 SKU/月 的可用库存与安全等级)
// - ABC 分类
// - FO 推荐
// ==========================================
// 说明: 宿主应用可注入自有实现; 本 crate 提供默认实现
// ==========================================

use crate::domain::forecast::ForecastMap;
use crate::domain::product::Product;
use crate::domain::replenishment::MonthlyPlan;
use crate::domain::settings::PlanningSettings;
use crate::domain::state::{plan_from_forecast, PlanningState};
use crate::domain::types::{AbcClass, RecommendationStatus, SafetyClass};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 库存投影
// ==========================================

/// 投影口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// 仅已下 PO
    PurchaseOrdersOnly,
    /// PO + 未关闭 FO
    IncludeForecastOrders,
}

/// 单 SKU 单月投影行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub sku: String,
    pub month: String,
    pub end_available: Option<f64>,
    pub doh: Option<f64>,
    pub safety_days: f64,
    pub safety_class: SafetyClass,
}

/// SKU → 月份 → 投影行
pub type InventoryProjection = BTreeMap<String, BTreeMap<String, ProjectionRow>>;

pub trait InventoryProjector {
    /// 按给定预测计算库存投影
    fn compute_inventory_projection(
        &self,
        state: &PlanningState,
        months: &[String],
        forecast: &ForecastMap,
        mode: ProjectionMode,
    ) -> InventoryProjection;

    /// 投影行安全等级
    fn projection_safety_class(&self, row: &ProjectionRow) -> SafetyClass {
        row.safety_class
    }
}

// ==========================================
// ABC 分类
// ==========================================

pub trait AbcClassifier {
    /// SKU → ABC 等级; 未出现的 SKU 由调用方按 C 处理
    fn compute_abc_classification(&self, state: &PlanningState) -> BTreeMap<String, AbcClass>;
}

// ==========================================
// FO 推荐
// ==========================================

/// 推荐上下文 (一次分析构建一次)
#[derive(Debug, Clone)]
pub struct FoRecommendationContext<'a> {
    pub state: &'a PlanningState,
    pub plan: MonthlyPlan,
    pub today: NaiveDate,
}

impl<'a> FoRecommendationContext<'a> {
    pub fn build(state: &'a PlanningState, forecast: &ForecastMap, today: NaiveDate) -> Self {
        Self {
            state,
            plan: plan_from_forecast(forecast),
            today,
        }
    }
}

/// 单 SKU 推荐结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoRecommendation {
    pub status: RecommendationStatus,
    pub recommended_units: Option<f64>,
    pub required_arrival_date: Option<NaiveDate>,
    pub order_date_adjusted: Option<NaiveDate>,
    pub coverage_days: Option<i64>,
}

impl FoRecommendation {
    pub fn not_computable() -> Self {
        Self {
            status: RecommendationStatus::NotComputable,
            recommended_units: None,
            required_arrival_date: None,
            order_date_adjusted: None,
            coverage_days: None,
        }
    }

    /// 可用于冲突比较
    pub fn is_computable(&self) -> bool {
        self.status == RecommendationStatus::Ok && self.recommended_units.is_some()
    }
}

pub trait FoRecommender {
    /// 构建推荐上下文
    fn build_fo_recommendation_context<'a>(
        &self,
        state: &'a PlanningState,
        forecast: &ForecastMap,
        today: NaiveDate,
    ) -> FoRecommendationContext<'a> {
        FoRecommendationContext::build(state, forecast, today)
    }

    /// 计算单 SKU 推荐
    fn compute_fo_recommendation_for_sku(
        &self,
        context: &FoRecommendationContext<'_>,
        sku: &str,
        lead_time_days: i64,
        product: Option<&Product>,
        settings: &PlanningSettings,
        horizon_months: u32,
    ) -> FoRecommendation;
}
