// ==========================================
// 供应链补货规划系统 - FO 推荐 (默认实现)
// ==========================================
// 职责: 为单 SKU 推导 "何时需要到货 + 需要多少"
// 流程:
// 1) 从今天之前最近的月末快照出发, 逐月前推 (计划消耗 + 未到货 PO)
// 2) 首个跌破安全库存的日期 = 需求到货日
// 3) 以需求到货日为 ETA 调用补货计算引擎得出推荐量
// ==========================================

use crate::common::calendar::{add_months, current_month_key, days_in_month, first_day_of_month};
use crate::domain::product::Product;
use crate::domain::replenishment::{MonthlySnapshot, ReplenishmentInput};
use crate::domain::settings::PlanningSettings;
use crate::domain::types::RecommendationStatus;
use crate::engine::collaborators::{FoRecommendation, FoRecommendationContext, FoRecommender};
use crate::engine::inventory_projection::pending_po_inbound;
use crate::engine::replenishment::ReplenishmentCalculator;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Default)]
pub struct CalculatorFoRecommender {
    calculator: ReplenishmentCalculator,
}

impl CalculatorFoRecommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calculator(calculator: ReplenishmentCalculator) -> Self {
        Self { calculator }
    }
}

/// 前推结果
struct RolledStock {
    /// 月份 → 推算月末库存
    month_end: BTreeMap<String, f64>,
    /// 首个跌破安全库存的日期
    first_breach: Option<NaiveDate>,
}

impl FoRecommender for CalculatorFoRecommender {
    fn compute_fo_recommendation_for_sku(
        &self,
        context: &FoRecommendationContext<'_>,
        sku: &str,
        lead_time_days: i64,
        product: Option<&Product>,
        settings: &PlanningSettings,
        horizon_months: u32,
    ) -> FoRecommendation {
        let Some(plan) = context.plan.get(sku).filter(|months| !months.is_empty()) else {
            return FoRecommendation::not_computable();
        };
        let current_month = current_month_key(context.today);
        let Some((snapshot_month, closing)) = context
            .state
            .inventory_snapshots
            .get(sku)
            .and_then(|months| {
                months
                    .range::<str, _>((Bound::Unbounded, Bound::Included(current_month.as_str())))
                    .next_back()
            })
            .map(|(month, units)| (month.clone(), *units))
        else {
            return FoRecommendation::not_computable();
        };

        let policy = product
            .map(|p| p.policy.resolve(&settings.policy_defaults))
            .unwrap_or(settings.policy_defaults);
        let horizon = i32::try_from(horizon_months.max(1)).unwrap_or(i32::MAX);
        let Some(horizon_end) = add_months(&current_month, horizon - 1) else {
            return FoRecommendation::not_computable();
        };

        // 快照为月末库存: 逾期未到的 PO 计入快照后的首月
        let Some(first_inbound_month) = add_months(&snapshot_month, 1) else {
            return FoRecommendation::not_computable();
        };
        let inbound = pending_po_inbound(context.state, sku, &first_inbound_month);
        let rolled = roll_stock(
            plan,
            &inbound,
            &snapshot_month,
            closing,
            &current_month,
            &horizon_end,
            policy.safety_stock_days_total_de,
        );

        let coverage_days = policy.operational_coverage_days_default.max(0)
            + policy.safety_stock_days_total_de.max(0.0).round() as i64;

        let Some(breach) = rolled.first_breach else {
            tracing::trace!(sku, "推荐窗口内未跌破安全库存");
            return FoRecommendation {
                status: RecommendationStatus::Ok,
                recommended_units: Some(0.0),
                required_arrival_date: None,
                order_date_adjusted: None,
                coverage_days: Some(coverage_days),
            };
        };
        let required_arrival = breach.max(context.today);

        let mut projected = MonthlySnapshot::new();
        projected.insert(sku.to_string(), rolled.month_end);
        let suggestion = self.calculator.compute(&ReplenishmentInput {
            sku,
            today: context.today,
            operational_coverage_days: Some(coverage_days),
            eta_override: Some(required_arrival),
            policy_defaults: settings.policy_defaults,
            policy_override: product.map(|p| p.policy),
            plan: &context.plan,
            snapshot: &projected,
        });

        let order_date = required_arrival
            .checked_sub_days(Days::new(lead_time_days.max(0).unsigned_abs()))
            .unwrap_or(required_arrival)
            .max(context.today);

        FoRecommendation {
            status: RecommendationStatus::Ok,
            recommended_units: Some(suggestion.suggested_units),
            required_arrival_date: Some(required_arrival),
            order_date_adjusted: Some(order_date),
            coverage_days: Some(coverage_days),
        }
    }
}

/// 逐月前推库存
///
/// 快照月: 月末 = 快照值; 之后: 月末 = 上月末 + 到货 - 计划
/// 只在 `check_from` 及之后的月份检查安全库存
fn roll_stock(
    plan: &BTreeMap<String, f64>,
    inbound: &BTreeMap<String, f64>,
    snapshot_month: &str,
    closing: f64,
    check_from: &str,
    until: &str,
    safety_days: f64,
) -> RolledStock {
    let mut month_end = BTreeMap::new();
    let mut first_breach = None;
    let mut last_rate = 0.0;
    let mut previous_end = closing;
    let mut month = snapshot_month.to_string();

    while month.as_str() <= until {
        let days = days_in_month(&month).unwrap_or(30);
        let demand = match plan.get(&month) {
            Some(units) => {
                last_rate = units / f64::from(days);
                *units
            }
            None => last_rate * f64::from(days),
        };
        let rate = demand / f64::from(days);

        let (begin, end) = if month == snapshot_month {
            (closing + demand, closing)
        } else {
            let begin = previous_end + inbound.get(&month).copied().unwrap_or(0.0);
            (begin, begin - demand)
        };
        month_end.insert(month.clone(), end);

        let safety = safety_days.max(0.0) * rate;
        if first_breach.is_none() && month.as_str() >= check_from && end < safety {
            let offset = if rate > 0.0 {
                ((begin - safety) / rate).floor().clamp(0.0, f64::from(days - 1))
            } else {
                0.0
            };
            first_breach = first_day_of_month(&month)
                .and_then(|first| first.checked_add_days(Days::new(offset as u64)));
        }

        previous_end = end;
        match add_months(&month, 1) {
            Some(next) => month = next,
            None => break,
        }
    }

    RolledStock {
        month_end,
        first_breach,
    }
}
