// ==========================================
// 供应链补货规划系统 - ABC 分类
// ==========================================
// 职责: 按营收贡献对 SKU 分级
// - 累计占比 (不含自身) < 80% → A
// - < 95% → B
// - 其余 → C
// ==========================================

use crate::common::calendar::{current_month_key, month_range};
use crate::domain::state::PlanningState;
use crate::domain::types::AbcClass;
use crate::engine::collaborators::AbcClassifier;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

const SHARE_A: f64 = 0.80;
const SHARE_B: f64 = 0.95;

// ==========================================
// StaticAbcClassifier - 预计算分类
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticAbcClassifier {
    classes: BTreeMap<String, AbcClass>,
}

impl StaticAbcClassifier {
    pub fn new(classes: BTreeMap<String, AbcClass>) -> Self {
        Self { classes }
    }
}

impl AbcClassifier for StaticAbcClassifier {
    fn compute_abc_classification(&self, _state: &PlanningState) -> BTreeMap<String, AbcClass> {
        self.classes.clone()
    }
}

// ==========================================
// RevenueAbcClassifier - 按激活预测营收分类
// ==========================================
#[derive(Debug, Clone)]
pub struct RevenueAbcClassifier {
    pub today: NaiveDate,
    pub horizon_months: usize,
}

impl RevenueAbcClassifier {
    pub fn new(today: NaiveDate, horizon_months: usize) -> Self {
        Self {
            today,
            horizon_months,
        }
    }

    /// SKU 在窗口内的预测营收 (缺营收按单价估算)
    fn revenue_by_sku(&self, state: &PlanningState) -> Vec<(String, f64)> {
        let months = month_range(&current_month_key(self.today), self.horizon_months);

        state
            .forecast
            .forecast_import
            .iter()
            .map(|(sku, entries)| {
                let price = state.find_product(sku).and_then(|p| p.price_eur);
                let revenue: f64 = months
                    .iter()
                    .filter_map(|month| entries.get(month))
                    .map(|entry| entry.revenue_or_estimate(price))
                    .sum();
                (sku.clone(), revenue.max(0.0))
            })
            .collect()
    }
}

impl AbcClassifier for RevenueAbcClassifier {
    fn compute_abc_classification(&self, state: &PlanningState) -> BTreeMap<String, AbcClass> {
        let mut revenues = self.revenue_by_sku(state);
        revenues.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let total: f64 = revenues.iter().map(|(_, revenue)| revenue).sum();
        let mut cumulative = 0.0;
        let mut classes = BTreeMap::new();

        for (sku, revenue) in revenues {
            let class = if total <= 0.0 || revenue <= 0.0 {
                AbcClass::C
            } else {
                let share_before = cumulative / total;
                if share_before < SHARE_A {
                    AbcClass::A
                } else if share_before < SHARE_B {
                    AbcClass::B
                } else {
                    AbcClass::C
                }
            };
            cumulative += revenue;
            classes.insert(sku, class);
        }

        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::ForecastEntry;
    use crate::domain::product::Product;

    #[test]
    fn test_revenue_classification() {
        let mut state = PlanningState::default();
        for (sku, revenue) in [("BIG", 7000.0), ("MID", 1500.0), ("SMALL", 1000.0), ("TINY", 500.0)] {
            state.forecast.forecast_import.entry(sku.to_string()).or_default().insert(
                "2025-04".to_string(),
                ForecastEntry {
                    units: Some(1.0),
                    revenue_eur: Some(revenue),
                    profit_eur: None,
                },
            );
        }
        // 无营收字段 → 按单价估算
        state.products.push(Product {
            sku: "PRICED".to_string(),
            price_eur: Some(10.0),
            ..Default::default()
        });
        state
            .forecast
            .forecast_import
            .entry("PRICED".to_string())
            .or_default()
            .insert("2025-04".to_string(), ForecastEntry::from_units(0.0));

        let classifier = RevenueAbcClassifier::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), 12);
        let classes = classifier.compute_abc_classification(&state);

        // 累计: BIG 0% → A, MID 70% → A, SMALL 85% → B, TINY 95% → C
        assert_eq!(classes["BIG"], AbcClass::A);
        assert_eq!(classes["MID"], AbcClass::A);
        assert_eq!(classes["SMALL"], AbcClass::B);
        assert_eq!(classes["TINY"], AbcClass::C);
        assert_eq!(classes["PRICED"], AbcClass::C);
    }
}
