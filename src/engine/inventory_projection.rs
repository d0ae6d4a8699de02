// ==========================================
// 供应链补货规划系统 - 月度库存投影
// ==========================================
// 职责: 从最近月末快照出发逐月前推库存
// 月末可用 = 期初 + 在途到货 - 预测销量
// 安全等级: 月末 < 0 → safety-negative; DOH < 安全天数 → safety-low
// ==========================================

use crate::common::calendar::{days_in_month, month_key_of};
use crate::domain::forecast::ForecastMap;
use crate::domain::state::PlanningState;
use crate::domain::types::SafetyClass;
use crate::engine::arrival_tasks::resolve_po_eta;
use crate::engine::collaborators::{
    InventoryProjection, InventoryProjector, ProjectionMode, ProjectionRow,
};
use crate::engine::lead_time::{resolve_fo_arrival_date, resolve_fo_lead_time};
use crate::engine::replenishment::days_on_hand;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleInventoryProjector;

impl SimpleInventoryProjector {
    pub fn new() -> Self {
        Self
    }

    /// 首月之前最近一次月末库存
    fn opening_stock(&self, state: &PlanningState, sku: &str, first_month: &str) -> Option<f64> {
        state
            .inventory_snapshots
            .get(sku)?
            .range::<str, _>((std::ops::Bound::Unbounded, std::ops::Bound::Excluded(first_month)))
            .next_back()
            .map(|(_, units)| *units)
    }

    /// 月份 → 到货件数 (逾期未到的 PO 计入首月)
    fn inbound_by_month(
        &self,
        state: &PlanningState,
        sku: &str,
        first_month: &str,
        mode: ProjectionMode,
    ) -> BTreeMap<String, f64> {
        let mut inbound = pending_po_inbound(state, sku, first_month);

        if mode == ProjectionMode::IncludeForecastOrders {
            for fo in state.fos.iter().filter(|fo| fo.sku == sku && fo.status.is_open()) {
                let lead = resolve_fo_lead_time(fo, state.find_product(sku), &state.settings);
                let Some(arrival) = resolve_fo_arrival_date(fo, &lead) else {
                    continue;
                };
                let month = month_key_of(arrival).max(first_month.to_string());
                *inbound.entry(month).or_default() += fo.units;
            }
        }

        inbound
    }
}

/// 未到货 PO 按 ETA 月汇总 (早于 `first_month` 的计入 `first_month`)
pub fn pending_po_inbound(
    state: &PlanningState,
    sku: &str,
    first_month: &str,
) -> BTreeMap<String, f64> {
    let mut inbound: BTreeMap<String, f64> = BTreeMap::new();

    for po in state.pos.iter().filter(|po| po.arrival_date.is_none()) {
        let Some(eta) = resolve_po_eta(po) else {
            continue;
        };
        let units: f64 = po
            .line_items()
            .iter()
            .filter(|item| item.sku == sku)
            .map(|item| item.units)
            .sum();
        if units == 0.0 {
            continue;
        }
        let month = month_key_of(eta).max(first_month.to_string());
        *inbound.entry(month).or_default() += units;
    }

    inbound
}

impl InventoryProjector for SimpleInventoryProjector {
    fn compute_inventory_projection(
        &self,
        state: &PlanningState,
        months: &[String],
        forecast: &ForecastMap,
        mode: ProjectionMode,
    ) -> InventoryProjection {
        let mut projection = InventoryProjection::new();
        let Some(first_month) = months.first() else {
            return projection;
        };

        let skus: BTreeSet<&str> = forecast
            .keys()
            .map(String::as_str)
            .chain(state.products.iter().filter(|p| p.active).map(|p| p.sku.as_str()))
            .collect();

        for sku in skus {
            let safety_days = state
                .find_product(sku)
                .map(|p| p.policy.resolve(&state.settings.policy_defaults))
                .unwrap_or(state.settings.policy_defaults)
                .safety_stock_days_total_de;
            let inbound = self.inbound_by_month(state, sku, first_month, mode);
            let mut available = self.opening_stock(state, sku, first_month);
            let mut rows = BTreeMap::new();

            for month in months {
                let demand = forecast
                    .get(sku)
                    .and_then(|m| m.get(month))
                    .and_then(|entry| entry.units)
                    .unwrap_or(0.0);
                let arriving = inbound.get(month).copied().unwrap_or(0.0);
                available = available.map(|opening| opening + arriving - demand);

                let rate = demand / f64::from(days_in_month(month).unwrap_or(30));
                let doh = available.and_then(|units| days_on_hand(units, rate));
                let safety_class = match (available, doh) {
                    (Some(units), _) if units < 0.0 => SafetyClass::SafetyNegative,
                    (_, Some(doh)) if doh < safety_days => SafetyClass::SafetyLow,
                    _ => SafetyClass::Ok,
                };

                rows.insert(
                    month.clone(),
                    ProjectionRow {
                        sku: sku.to_string(),
                        month: month.clone(),
                        end_available: available,
                        doh,
                        safety_days,
                        safety_class,
                    },
                );
            }

            projection.insert(sku.to_string(), rows);
        }

        tracing::trace!(skus = projection.len(), months = months.len(), "库存投影完成");
        projection
    }
}
