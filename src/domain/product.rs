// ==========================================
// 供应链补货规划系统 - 商品与供应商
// ==========================================

use crate::domain::replenishment::ReplenishmentPolicyOverride;
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 商品主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    /// 单价 (营收缺失时估算用)
    #[serde(default)]
    pub price_eur: Option<f64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub production_lead_time_days_default: Option<i64>,
    #[serde(default)]
    pub transit_days_default: Option<i64>,
    #[serde(default)]
    pub policy: ReplenishmentPolicyOverride,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// 展示名: 别名优先, 回退 SKU
    pub fn display_alias(&self) -> &str {
        self.alias
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.sku)
    }
}

// ==========================================
// Supplier - 供应商
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
}
