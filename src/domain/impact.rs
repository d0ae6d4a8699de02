// ==========================================
// 供应链补货规划系统 - 预测影响结果模型
// ==========================================
// 职责: 版本对比窗口、SKU 差异行、FO 冲突行、汇总
// 红线: 按需重算, 引擎不缓存
// ==========================================

use crate::domain::types::{AbcClass, ConflictDecisionKind, ConflictType, FlagReason};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImpactWindows - 滚动窗口 (1/3/6 个月)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactWindows {
    pub months1: Vec<String>,
    pub months3: Vec<String>,
    pub months6: Vec<String>,
}

// ==========================================
// WindowDelta - 单窗口差异
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowDelta {
    pub prev_units: f64,
    pub next_units: f64,
    pub delta_units: f64,
    pub delta_pct: f64,
    pub prev_revenue_eur: f64,
    pub next_revenue_eur: f64,
    pub delta_revenue_eur: f64,
}

// ==========================================
// SkuImpactRow - SKU 差异行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuImpactRow {
    pub sku: String,
    pub alias: String,
    pub abc_class: AbcClass,
    pub window1: WindowDelta,
    pub window3: WindowDelta,
    pub window6: WindowDelta,
    pub safety_risk: bool,
    pub first_risk_month: Option<String>,
    pub flagged: bool,
    pub reasons: Vec<FlagReason>,
}

// ==========================================
// FoConflictRow - FO 冲突行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoConflictRow {
    pub fo_id: String,
    pub sku: String,
    pub alias: String,
    pub abc_class: AbcClass,
    pub current_units: f64,
    pub recommended_units: f64,
    pub delta_units: f64,
    pub delta_pct: f64,
    pub current_arrival_date: Option<NaiveDate>,
    pub current_arrival_month: Option<String>,
    pub required_arrival_date: Option<NaiveDate>,
    pub required_arrival_month: Option<String>,
    pub order_date_adjusted: Option<NaiveDate>,
    pub first_risk_month: Option<String>,
    pub safety_risk: bool,
    pub conflict_types: Vec<ConflictType>,
    pub severity_score: i64,
    /// 已记录的处理决定 (None = 待处理)
    pub decision: Option<ConflictDecisionKind>,
}

impl FoConflictRow {
    pub fn has(&self, conflict_type: ConflictType) -> bool {
        self.conflict_types.contains(&conflict_type)
    }

    pub fn is_open(&self) -> bool {
        self.decision.is_none()
    }
}

// ==========================================
// ImpactSummary - 汇总 (亦作为 last_impact_summary 存档)
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub flagged_skus: usize,
    pub flagged_ab_skus: usize,
    pub fo_conflicts_total: usize,
    pub fo_conflicts_open: usize,
    pub from_version_id: Option<String>,
    pub from_version_name: Option<String>,
    pub to_version_id: Option<String>,
    pub to_version_name: Option<String>,
    #[serde(default)]
    pub computed_at: Option<DateTime<Utc>>,
}

impl ImpactSummary {
    /// 是否引用了指定版本 (任一侧)
    pub fn references_version(&self, version_id: &str) -> bool {
        self.from_version_id.as_deref() == Some(version_id)
            || self.to_version_id.as_deref() == Some(version_id)
    }
}

// ==========================================
// ForecastImpactResult - 影响分析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastImpactResult {
    pub months: ImpactWindows,
    pub sku_rows: Vec<SkuImpactRow>,
    pub fo_conflicts: Vec<FoConflictRow>,
    pub summary: ImpactSummary,
}
