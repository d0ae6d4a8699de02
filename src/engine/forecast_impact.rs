// ==========================================
// 供应链补货规划系统 - 预测影响分析引擎
// ==========================================
// 职责: 对比两个预测版本, 输出
// - SKU 差异行 (1/3/6 月窗口, ABC 阈值 + 安全风险标记)
// - FO 冲突行 (数量/时机与推荐不符)
// - 汇总
// ==========================================
// 红线: 只读计算, 不写回状态; 判定细节委托 ImpactPolicy
// ==========================================

use crate::common::calendar::{current_month_key, month_key_of, month_range, parse_month_key};
use crate::domain::forecast::{ForecastEntry, ForecastMap, ForecastVersion};
use crate::domain::impact::{
    FoConflictRow, ForecastImpactResult, ImpactSummary, ImpactWindows, SkuImpactRow, WindowDelta,
};
use crate::domain::state::PlanningState;
use crate::domain::types::{AbcClass, FlagReason};
use crate::engine::collaborators::{
    AbcClassifier, FoRecommender, InventoryProjector, ProjectionMode,
};
use crate::engine::impact_policy::{delta_pct, FoConflictCheck, ImpactPolicy};
use crate::engine::lead_time::{resolve_fo_arrival_date, resolve_fo_lead_time};
use crate::error::PlanningResult;
use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// 分析请求
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactRequest<'a> {
    /// 对比基线 (None = 空预测)
    pub from: Option<&'a ForecastVersion>,
    /// 新版本 (None = 空预测)
    pub to: Option<&'a ForecastVersion>,
    /// 起始月 (None = 当前月)
    pub now_month: Option<&'a str>,
    /// 基准日期 (None = 本地当天)
    pub today: Option<NaiveDate>,
}

// ==========================================
// ForecastImpactAnalyzer - 影响分析引擎
// ==========================================
pub struct ForecastImpactAnalyzer<'a> {
    projector: &'a dyn InventoryProjector,
    abc_classifier: &'a dyn AbcClassifier,
    recommender: &'a dyn FoRecommender,
    policy: ImpactPolicy,
}

impl<'a> ForecastImpactAnalyzer<'a> {
    pub fn new(
        projector: &'a dyn InventoryProjector,
        abc_classifier: &'a dyn AbcClassifier,
        recommender: &'a dyn FoRecommender,
    ) -> Self {
        Self {
            projector,
            abc_classifier,
            recommender,
            policy: ImpactPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ImpactPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行影响分析
    ///
    /// # 返回
    /// - Err: `now_month` 格式非法
    pub fn analyze(
        &self,
        state: &PlanningState,
        request: &ImpactRequest<'_>,
    ) -> PlanningResult<ForecastImpactResult> {
        let today = request.today.unwrap_or_else(|| Local::now().date_naive());
        let now = match request.now_month {
            Some(month) => parse_month_key(month)?,
            None => current_month_key(today),
        };

        let windows = ImpactWindows {
            months1: month_range(&now, 1),
            months3: month_range(&now, 3),
            months6: month_range(&now, 6),
        };

        let empty = ForecastMap::new();
        let prev = request.from.map_or(&empty, |v| &v.forecast_import);
        let next = request.to.map_or(&empty, |v| &v.forecast_import);

        let abc_classes = self.abc_classifier.compute_abc_classification(state);
        let first_risk_by_sku = self.first_risk_months(state, &now, next);

        let sku_rows = self.build_sku_rows(state, &windows, prev, next, &abc_classes, &first_risk_by_sku);
        let fo_conflicts =
            self.build_fo_conflicts(state, request, next, today, &abc_classes, &first_risk_by_sku);

        let summary = ImpactSummary {
            flagged_skus: sku_rows.iter().filter(|row| row.flagged).count(),
            flagged_ab_skus: sku_rows
                .iter()
                .filter(|row| row.flagged && row.abc_class.is_a_or_b())
                .count(),
            fo_conflicts_total: fo_conflicts.len(),
            fo_conflicts_open: fo_conflicts.iter().filter(|row| row.is_open()).count(),
            from_version_id: request.from.map(|v| v.id.clone()),
            from_version_name: request.from.map(|v| v.name.clone()),
            to_version_id: request.to.map(|v| v.id.clone()),
            to_version_name: request.to.map(|v| v.name.clone()),
            computed_at: None,
        };

        tracing::debug!(
            now = %now,
            sku_rows = sku_rows.len(),
            flagged = summary.flagged_skus,
            conflicts = summary.fo_conflicts_total,
            "预测影响分析完成"
        );

        Ok(ForecastImpactResult {
            months: windows,
            sku_rows,
            fo_conflicts,
            summary,
        })
    }

    /// SKU → 首个风险月 (按新版本预测投影, 含未关闭 FO)
    fn first_risk_months(
        &self,
        state: &PlanningState,
        now: &str,
        next: &ForecastMap,
    ) -> BTreeMap<String, String> {
        let horizon = usize::try_from(state.settings.projection_horizon_months).unwrap_or(12);
        let months = month_range(now, horizon);
        let projection = self.projector.compute_inventory_projection(
            state,
            &months,
            next,
            ProjectionMode::IncludeForecastOrders,
        );

        projection
            .iter()
            .filter_map(|(sku, rows)| {
                months
                    .iter()
                    .filter_map(|month| rows.get(month))
                    .find(|row| self.projector.projection_safety_class(row).is_risk())
                    .map(|row| (sku.clone(), row.month.clone()))
            })
            .collect()
    }

    // ==========================================
    // SKU 差异
    // ==========================================

    fn build_sku_rows(
        &self,
        state: &PlanningState,
        windows: &ImpactWindows,
        prev: &ForecastMap,
        next: &ForecastMap,
        abc_classes: &BTreeMap<String, AbcClass>,
        first_risk_by_sku: &BTreeMap<String, String>,
    ) -> Vec<SkuImpactRow> {
        let skus: BTreeSet<&String> = prev
            .keys()
            .chain(next.keys())
            .chain(first_risk_by_sku.keys())
            .collect();

        let mut rows: Vec<SkuImpactRow> = skus
            .into_iter()
            .map(|sku| {
                let product = state.find_product(sku);
                let price = product.and_then(|p| p.price_eur);
                let abc_class = abc_classes.get(sku).copied().unwrap_or_default();
                let prev_entries = prev.get(sku);
                let next_entries = next.get(sku);

                let window1 = window_delta(prev_entries, next_entries, &windows.months1, price);
                let window3 = window_delta(prev_entries, next_entries, &windows.months3, price);
                let window6 = window_delta(prev_entries, next_entries, &windows.months6, price);

                let first_risk_month = first_risk_by_sku.get(sku).cloned();
                let safety_risk = first_risk_month.is_some();

                let mut reasons = Vec::new();
                if self
                    .policy
                    .exceeds_threshold(abc_class, window3.delta_units, window3.delta_pct)
                {
                    reasons.push(FlagReason::AbcThreshold);
                }
                if safety_risk {
                    reasons.push(FlagReason::SafetyRisk);
                }

                SkuImpactRow {
                    sku: sku.clone(),
                    alias: product
                        .map(|p| p.display_alias().to_string())
                        .unwrap_or_else(|| sku.clone()),
                    abc_class,
                    window1,
                    window3,
                    window6,
                    safety_risk,
                    first_risk_month,
                    flagged: !reasons.is_empty(),
                    reasons,
                }
            })
            .collect();

        // 标记优先 → ABC → |Δ3| 降序 → SKU
        rows.sort_by(|a, b| {
            b.flagged
                .cmp(&a.flagged)
                .then_with(|| a.abc_class.cmp(&b.abc_class))
                .then_with(|| {
                    b.window3
                        .delta_units
                        .abs()
                        .total_cmp(&a.window3.delta_units.abs())
                })
                .then_with(|| a.sku.cmp(&b.sku))
        });
        rows
    }

    // ==========================================
    // FO 冲突
    // ==========================================

    fn build_fo_conflicts(
        &self,
        state: &PlanningState,
        request: &ImpactRequest<'_>,
        next: &ForecastMap,
        today: NaiveDate,
        abc_classes: &BTreeMap<String, AbcClass>,
        first_risk_by_sku: &BTreeMap<String, String>,
    ) -> Vec<FoConflictRow> {
        let context = self
            .recommender
            .build_fo_recommendation_context(state, next, today);
        let decisions = request
            .to
            .and_then(|v| state.forecast.fo_conflict_decisions_by_version.get(&v.id));

        let mut conflicts = Vec::new();
        for fo in state.fos.iter().filter(|fo| fo.status.is_open()) {
            let product = state.find_product(&fo.sku);
            let lead_time = resolve_fo_lead_time(fo, product, &state.settings);
            let recommendation = self.recommender.compute_fo_recommendation_for_sku(
                &context,
                &fo.sku,
                lead_time.total_days(),
                product,
                &state.settings,
                state.settings.fo_recommendation_horizon_months,
            );
            if !recommendation.is_computable() {
                tracing::trace!(fo_id = %fo.id, sku = %fo.sku, "FO 推荐不可计算, 跳过");
                continue;
            }
            let recommended_units = recommendation.recommended_units.unwrap_or(0.0);

            let abc_class = abc_classes.get(&fo.sku).copied().unwrap_or_default();
            let arrival_date = resolve_fo_arrival_date(fo, &lead_time);
            let arrival_month = arrival_date.map(month_key_of);
            let required_arrival_month = recommendation.required_arrival_date.map(month_key_of);
            let first_risk_month = first_risk_by_sku.get(&fo.sku).cloned();
            let safety_risk = first_risk_month.is_some();

            let conflict_types = self.policy.classify_fo_conflict(&FoConflictCheck {
                abc_class,
                current_units: fo.units,
                recommended_units,
                safety_risk,
                arrival_month: arrival_month.as_deref(),
                required_arrival_month: required_arrival_month.as_deref(),
                first_risk_month: first_risk_month.as_deref(),
            });
            if conflict_types.is_empty() {
                continue;
            }

            let severity_score = self.policy.severity_score(
                abc_class,
                required_arrival_month.as_deref(),
                &conflict_types,
                safety_risk,
            );

            conflicts.push(FoConflictRow {
                fo_id: fo.id.clone(),
                sku: fo.sku.clone(),
                alias: product
                    .map(|p| p.display_alias().to_string())
                    .unwrap_or_else(|| fo.sku.clone()),
                abc_class,
                current_units: fo.units,
                recommended_units,
                delta_units: fo.units - recommended_units,
                delta_pct: delta_pct(recommended_units, fo.units),
                current_arrival_date: arrival_date,
                current_arrival_month: arrival_month,
                required_arrival_date: recommendation.required_arrival_date,
                required_arrival_month,
                order_date_adjusted: recommendation.order_date_adjusted,
                first_risk_month,
                safety_risk,
                conflict_types,
                severity_score,
                decision: decisions
                    .and_then(|by_fo| by_fo.get(&fo.id))
                    .map(|d| d.decision),
            });
        }

        conflicts.sort_by(|a, b| {
            a.severity_score
                .cmp(&b.severity_score)
                .then_with(|| a.fo_id.cmp(&b.fo_id))
        });
        conflicts
    }
}

/// 窗口内两版本的件数与营收差异
fn window_delta(
    prev: Option<&BTreeMap<String, ForecastEntry>>,
    next: Option<&BTreeMap<String, ForecastEntry>>,
    months: &[String],
    price_eur: Option<f64>,
) -> WindowDelta {
    let (prev_units, prev_revenue_eur) = window_totals(prev, months, price_eur);
    let (next_units, next_revenue_eur) = window_totals(next, months, price_eur);
    let delta_units = next_units - prev_units;

    WindowDelta {
        prev_units,
        next_units,
        delta_units,
        delta_pct: delta_pct(prev_units, next_units),
        prev_revenue_eur,
        next_revenue_eur,
        delta_revenue_eur: next_revenue_eur - prev_revenue_eur,
    }
}

fn window_totals(
    entries: Option<&BTreeMap<String, ForecastEntry>>,
    months: &[String],
    price_eur: Option<f64>,
) -> (f64, f64) {
    let Some(entries) = entries else {
        return (0.0, 0.0);
    };
    months
        .iter()
        .filter_map(|month| entries.get(month))
        .fold((0.0, 0.0), |(units, revenue), entry| {
            (
                units + entry.units.unwrap_or(0.0),
                revenue + entry.revenue_or_estimate(price_eur),
            )
        })
}
