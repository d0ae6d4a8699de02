// ==========================================
// 供应链补货规划系统 - 应用状态容器
// ==========================================
// 宿主应用的内存状态; 版本存储会原地修改 forecast 部分
// ==========================================

use crate::domain::forecast::{ForecastMap, ForecastState};
use crate::domain::order::{ForecastOrder, PurchaseOrder};
use crate::domain::product::{Product, Supplier};
use crate::domain::replenishment::{MonthlyPlan, MonthlySnapshot};
use crate::domain::settings::PlanningSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanningState {
    #[serde(default)]
    pub settings: PlanningSettings,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub pos: Vec<PurchaseOrder>,
    #[serde(default)]
    pub fos: Vec<ForecastOrder>,
    /// SKU → 月份 → 月末库存
    #[serde(default)]
    pub inventory_snapshots: MonthlySnapshot,
    #[serde(default)]
    pub forecast: ForecastState,
}

impl PlanningState {
    pub fn find_product(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    pub fn find_supplier(&self, id_or_name: &str) -> Option<&Supplier> {
        let needle = id_or_name.trim();
        self.suppliers
            .iter()
            .find(|s| s.id == needle)
            .or_else(|| {
                self.suppliers
                    .iter()
                    .find(|s| s.name.trim().eq_ignore_ascii_case(needle))
            })
    }
}

/// 预测映射 → 月度计划 (仅取 units)
pub fn plan_from_forecast(forecast: &ForecastMap) -> MonthlyPlan {
    forecast
        .iter()
        .map(|(sku, months)| {
            let units = months
                .iter()
                .filter_map(|(month, entry)| entry.units.map(|u| (month.clone(), u)))
                .collect();
            (sku.clone(), units)
        })
        .collect()
}
