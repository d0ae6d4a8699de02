// ==========================================
// 供应链补货规划系统 - 订单领域模型
// ==========================================
// 职责: PO (已下采购单) 与 FO (预测单)
// 说明: 宿主数据字段大量可选, 在此统一为 Option
// ==========================================

use crate::domain::types::FoStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// PoLineItem - PO 行项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoLineItem {
    pub sku: String,
    #[serde(default)]
    pub units: f64,
}

// ==========================================
// PurchaseOrder - 采购单
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    #[serde(default)]
    pub po_no: String,
    /// 供应商引用 (ID 或名称)
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub prod_days: Option<i64>,
    #[serde(default)]
    pub transit_days: Option<i64>,
    /// 手工 ETA (优先)
    #[serde(default)]
    pub eta_manual: Option<NaiveDate>,
    /// 实际到货日期 (None = 未到货)
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<PoLineItem>,
    /// 旧版单 SKU 字段
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub units: Option<f64>,
}

impl PurchaseOrder {
    /// 行项目 (兼容旧版单 SKU 订单)
    pub fn line_items(&self) -> Vec<PoLineItem> {
        if !self.items.is_empty() {
            return self.items.clone();
        }
        match self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(sku) => vec![PoLineItem {
                sku: sku.to_string(),
                units: self.units.unwrap_or(0.0),
            }],
            None => Vec::new(),
        }
    }
}

// ==========================================
// ForecastOrder - 预测单 (FO)
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastOrder {
    pub id: String,
    pub sku: String,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub units: f64,
    #[serde(default)]
    pub status: FoStatus,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    /// 目标到货日期 (优先于 order_date + 提前期)
    #[serde(default)]
    pub target_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub production_lead_time_days: Option<i64>,
    #[serde(default)]
    pub buffer_days: Option<i64>,
    #[serde(default)]
    pub transit_days: Option<i64>,
}
