// ==========================================
// 供应链补货规划系统 - 补货领域模型
// ==========================================
// 职责: 补货策略、月度计划/快照、FO 建议
// 红线: 建议每次新建, 不落库
// ==========================================

use crate::domain::types::{Confidence, SuggestionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SKU → 月份 → 计划销量 (缺失 ≠ 0)
pub type MonthlyPlan = BTreeMap<String, BTreeMap<String, f64>>;

/// SKU → 月份 → 月末库存
pub type MonthlySnapshot = BTreeMap<String, BTreeMap<String, f64>>;

// ==========================================
// ReplenishmentPolicy - 补货策略 (已解析)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentPolicy {
    /// 安全库存天数
    pub safety_stock_days_total_de: f64,
    /// 最低库存天数 (仅告警)
    pub minimum_stock_days_total_de: Option<f64>,
    /// 下单到到货天数
    pub lead_time_days_total: i64,
    /// 最小起订量
    pub moq_units: f64,
    /// 到货后覆盖天数
    pub operational_coverage_days_default: i64,
}

impl Default for ReplenishmentPolicy {
    fn default() -> Self {
        Self {
            safety_stock_days_total_de: 60.0,
            minimum_stock_days_total_de: None,
            lead_time_days_total: 75,
            moq_units: 0.0,
            operational_coverage_days_default: 30,
        }
    }
}

// ==========================================
// ReplenishmentPolicyOverride - SKU 级覆写
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplenishmentPolicyOverride {
    #[serde(default)]
    pub safety_stock_days_total_de: Option<f64>,
    #[serde(default)]
    pub minimum_stock_days_total_de: Option<f64>,
    #[serde(default)]
    pub lead_time_days_total: Option<i64>,
    #[serde(default)]
    pub moq_units: Option<f64>,
    #[serde(default)]
    pub operational_coverage_days_default: Option<i64>,
}

impl ReplenishmentPolicyOverride {
    /// 覆写优先于默认值
    pub fn resolve(&self, defaults: &ReplenishmentPolicy) -> ReplenishmentPolicy {
        ReplenishmentPolicy {
            safety_stock_days_total_de: self
                .safety_stock_days_total_de
                .unwrap_or(defaults.safety_stock_days_total_de),
            minimum_stock_days_total_de: self
                .minimum_stock_days_total_de
                .or(defaults.minimum_stock_days_total_de),
            lead_time_days_total: self
                .lead_time_days_total
                .unwrap_or(defaults.lead_time_days_total),
            moq_units: self.moq_units.unwrap_or(defaults.moq_units),
            operational_coverage_days_default: self
                .operational_coverage_days_default
                .unwrap_or(defaults.operational_coverage_days_default),
        }
    }
}

// ==========================================
// ReplenishmentInput - 计算输入
// ==========================================
#[derive(Debug, Clone)]
pub struct ReplenishmentInput<'a> {
    pub sku: &'a str,
    pub today: NaiveDate,
    pub operational_coverage_days: Option<i64>,
    pub eta_override: Option<NaiveDate>,
    pub policy_defaults: ReplenishmentPolicy,
    pub policy_override: Option<ReplenishmentPolicyOverride>,
    pub plan: &'a MonthlyPlan,
    pub snapshot: &'a MonthlySnapshot,
}

// ==========================================
// SuggestionRationale - 推导依据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRationale {
    pub daily_rate_today: f64,
    pub daily_rate_eta: f64,
    pub demand_units: f64,
    pub coverage_days: i64,
    pub horizon_end: NaiveDate,
    pub projected_inventory_at_eta: Option<f64>,
    pub doh_today: Option<f64>,
    pub doh_eta: Option<f64>,
    pub doh_end_of_month: Option<f64>,
    pub required_units: f64,
    pub net_needed_units: f64,
    pub raw_suggested_units: f64,
    pub policy: ReplenishmentPolicy,
}

// ==========================================
// FoSuggestion - FO 建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoSuggestion {
    pub sku: String,
    pub eta_date: NaiveDate,
    /// 下单件数: rationale.raw_suggested_units 向上取整 (低于 MOQ 时取 MOQ)
    pub suggested_units: f64,
    pub confidence: Confidence,
    pub rationale: SuggestionRationale,
    pub warnings: Vec<String>,
    pub order_needed_flag: bool,
    pub status: SuggestionStatus,
}
