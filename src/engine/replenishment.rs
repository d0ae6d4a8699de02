// ==========================================
// 供应链补货规划系统 - 补货计算引擎
// ==========================================
// 职责: 单 SKU 库存前推 + 建议下单量
// 输入: 补货策略 + 月度计划 + 月末库存快照
// 输出: FoSuggestion (建议量/置信度/依据/告警)
// ==========================================
// 红线: 数据缺失只降级 (warning + 置信度), 不报错
// ==========================================

use crate::common::calendar::{days_in_month, last_day_of_month, month_key_of};
use crate::domain::replenishment::{
    FoSuggestion, ReplenishmentInput, ReplenishmentPolicy, SuggestionRationale,
};
use crate::domain::types::{Confidence, SuggestionStatus};
use crate::i18n::{t_in_locale, DEFAULT_LOCALE};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

// 浮点误差容忍 (避免 40.0000001 被向上取整为 41)
const UNIT_EPSILON: f64 = 1e-6;

// ==========================================
// ReplenishmentCalculator - 补货计算引擎
// ==========================================
// 无状态引擎, 每次调用新建计算上下文
#[derive(Clone)]
pub struct ReplenishmentCalculator {
    locale: String,
}

impl Default for ReplenishmentCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplenishmentCalculator {
    /// 创建引擎 (英文告警)
    pub fn new() -> Self {
        Self::with_locale(DEFAULT_LOCALE)
    }

    /// 指定告警语言
    pub fn with_locale(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算单 SKU 的 FO 建议
    ///
    /// 步骤:
    /// 1) 解析策略 (SKU 覆写优先)
    /// 2) ETA = 覆写值 或 today + 提前期
    /// 3) 覆盖窗口 [ETA, ETA + 覆盖天数)
    /// 4) 按月日均积分需求
    /// 5) 月内线性插值估算 ETA 库存
    /// 6) 净需求 = 需求 - ETA 库存, 向上取整为件数后再套 MOQ
    /// 7) 三个时点的可售天数 (DOH) 与下单标志
    pub fn compute(&self, input: &ReplenishmentInput<'_>) -> FoSuggestion {
        let policy = match &input.policy_override {
            Some(overrides) => overrides.resolve(&input.policy_defaults),
            None => input.policy_defaults,
        };

        let mut ctx = SuggestionContext::new(input, &self.locale);

        let eta = input
            .eta_override
            .unwrap_or_else(|| add_days(input.today, policy.lead_time_days_total));
        let coverage_days = input
            .operational_coverage_days
            .unwrap_or(policy.operational_coverage_days_default)
            .max(0);
        let horizon_end = add_days(eta, coverage_days);

        // 需求积分
        let demand_units = ctx.integrate_demand(eta, horizon_end);

        // ETA 库存
        let inventory_at_eta = ctx.inventory_at(eta);
        let projected_inventory_at_eta = inventory_at_eta.map(|units| {
            if units < 0.0 {
                ctx.warn(
                    "replenishment.negative_inventory",
                    &[("units", &format_number(units))],
                );
                0.0
            } else {
                units
            }
        });
        let snapshot_missing = projected_inventory_at_eta.is_none();

        let required_units = demand_units;
        let net_needed_units = match projected_inventory_at_eta {
            Some(inventory) => required_units - inventory,
            None => {
                ctx.warn("replenishment.demand_only", &[]);
                required_units
            }
        };
        let raw_suggested_units = net_needed_units.max(0.0);

        // MOQ
        let mut suggested_units = to_order_units(raw_suggested_units);
        if raw_suggested_units > 0.0 && raw_suggested_units < policy.moq_units {
            suggested_units = policy.moq_units.ceil();
            ctx.warn(
                "replenishment.moq_applied",
                &[
                    ("raw", &format_number(raw_suggested_units)),
                    ("moq", &format_number(suggested_units)),
                ],
            );
        }

        // DOH 三个时点
        let end_of_month = last_day_of_month(&month_key_of(input.today)).unwrap_or(input.today);
        let daily_rate_today = ctx.daily_rate(&month_key_of(input.today));
        let daily_rate_eta = ctx.daily_rate(&month_key_of(eta));
        let doh_today = ctx.doh_at(input.today);
        let doh_eta = projected_inventory_at_eta.and_then(|units| days_on_hand(units, daily_rate_eta));
        let doh_end_of_month = ctx.doh_at(end_of_month);

        let reorder_threshold =
            policy.safety_stock_days_total_de + policy.lead_time_days_total as f64;
        let order_needed_flag = doh_end_of_month
            .map(|doh| doh < reorder_threshold)
            .unwrap_or(false);

        self.check_minimum_stock(&mut ctx, &policy, doh_today, doh_eta);

        // 置信度: 缺预测 → medium, 缺快照 → low
        let mut confidence = Confidence::High;
        if ctx.missing_forecast {
            confidence = confidence.min(Confidence::Medium);
        }
        if snapshot_missing {
            confidence = Confidence::Low;
        }

        let status = if snapshot_missing {
            SuggestionStatus::InsufficientInventorySnapshot
        } else if ctx.missing_forecast {
            SuggestionStatus::InsufficientForecast
        } else {
            SuggestionStatus::Ok
        };

        tracing::debug!(
            sku = input.sku,
            eta = %eta,
            demand_units,
            suggested_units,
            status = status.as_str(),
            "FO 建议计算完成"
        );

        FoSuggestion {
            sku: input.sku.to_string(),
            eta_date: eta,
            suggested_units,
            confidence,
            rationale: SuggestionRationale {
                daily_rate_today,
                daily_rate_eta,
                demand_units,
                coverage_days,
                horizon_end,
                projected_inventory_at_eta,
                doh_today,
                doh_eta,
                doh_end_of_month,
                required_units,
                net_needed_units,
                raw_suggested_units,
                policy,
            },
            warnings: ctx.warnings,
            order_needed_flag,
            status,
        }
    }

    /// 最低库存天数告警 (不影响状态/置信度)
    fn check_minimum_stock(
        &self,
        ctx: &mut SuggestionContext<'_>,
        policy: &ReplenishmentPolicy,
        doh_today: Option<f64>,
        doh_eta: Option<f64>,
    ) {
        let Some(minimum) = policy.minimum_stock_days_total_de else {
            return;
        };
        let min = format_number(minimum);

        if let Some(doh) = doh_today.filter(|d| *d < minimum) {
            ctx.warn(
                "replenishment.below_minimum_today",
                &[("doh", &format_number(doh)), ("min", &min)],
            );
        }
        if let Some(doh) = doh_eta.filter(|d| *d < minimum) {
            ctx.warn(
                "replenishment.below_minimum_eta",
                &[("doh", &format_number(doh)), ("min", &min)],
            );
        }
    }
}

// ==========================================
// SuggestionContext - 单次计算上下文
// ==========================================
struct SuggestionContext<'a> {
    plan: Option<&'a BTreeMap<String, f64>>,
    snapshot: Option<&'a BTreeMap<String, f64>>,
    locale: &'a str,
    /// 本次需求积分已算出的日均 (月份 → 日均)
    integrated_rates: BTreeMap<String, f64>,
    warned_forecast: BTreeSet<String>,
    warned_snapshot: BTreeSet<String>,
    missing_forecast: bool,
    warnings: Vec<String>,
}

impl<'a> SuggestionContext<'a> {
    fn new(input: &ReplenishmentInput<'a>, locale: &'a str) -> Self {
        Self {
            plan: input.plan.get(input.sku),
            snapshot: input.snapshot.get(input.sku),
            locale,
            integrated_rates: BTreeMap::new(),
            warned_forecast: BTreeSet::new(),
            warned_snapshot: BTreeSet::new(),
            missing_forecast: false,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, key: &str, args: &[(&str, &str)]) {
        self.warnings.push(t_in_locale(key, self.locale, args));
    }

    fn planned_units(&self, month: &str) -> Option<f64> {
        self.plan
            .and_then(|months| months.get(month))
            .copied()
            .filter(|units| units.is_finite())
    }

    /// 需求积分: 区间 [start, end) 内逐月 日均 × 重叠天数
    ///
    /// 某月缺预测时沿用本次积分中上一个月的日均, 否则为 0
    fn integrate_demand(&mut self, start: NaiveDate, end: NaiveDate) -> f64 {
        let mut total = 0.0;
        let mut last_rate: Option<f64> = None;
        let mut cursor = start;

        while cursor < end {
            let (month, next_month_start, days) = month_span(cursor);
            let segment_end = next_month_start.min(end);
            let overlap_days = (segment_end - cursor).num_days() as f64;

            let rate = match self.planned_units(&month) {
                Some(units) => units / f64::from(days),
                None => {
                    let fallback = last_rate.unwrap_or(0.0);
                    self.missing_forecast = true;
                    self.warn_forecast_missing(&month, fallback);
                    fallback
                }
            };

            self.integrated_rates.insert(month, rate);
            last_rate = Some(rate);
            total += rate * overlap_days;
            cursor = segment_end;
        }

        total
    }

    /// 月日均 (缺预测时回退到积分中更早月份的日均)
    fn daily_rate(&mut self, month: &str) -> f64 {
        if let Some(units) = self.planned_units(month) {
            return units / f64::from(days_in_month(month).unwrap_or(30));
        }

        let fallback = self
            .integrated_rates
            .range::<str, _>((Bound::Unbounded, Bound::Excluded(month)))
            .next_back()
            .map(|(_, rate)| *rate)
            .unwrap_or(0.0);
        self.warn_forecast_missing(month, fallback);
        fallback
    }

    /// 日期 d 的库存估算
    ///
    /// 月初库存 = 月末快照 + 当月计划; 月内按日均线性递减
    fn inventory_at(&mut self, date: NaiveDate) -> Option<f64> {
        let month = month_key_of(date);
        let closing = match self.snapshot.and_then(|months| months.get(&month)).copied() {
            Some(units) if units.is_finite() => units,
            _ => {
                if self.warned_snapshot.insert(month.clone()) {
                    self.warn("replenishment.snapshot_missing", &[("month", &month)]);
                }
                return None;
            }
        };

        let rate = self.daily_rate(&month);
        let days = f64::from(days_in_month(&month).unwrap_or(30));
        let beginning_of_month = closing + rate * days;
        Some(beginning_of_month - f64::from(date.day0()) * rate)
    }

    fn doh_at(&mut self, date: NaiveDate) -> Option<f64> {
        let inventory = self.inventory_at(date)?;
        let rate = self.daily_rate(&month_key_of(date));
        days_on_hand(inventory, rate)
    }

    fn warn_forecast_missing(&mut self, month: &str, rate: f64) {
        if self.warned_forecast.insert(month.to_string()) {
            self.warn(
                "replenishment.forecast_missing",
                &[("month", month), ("rate", &format!("{:.2}", rate))],
            );
        }
    }
}

// ==========================================
// 工具函数
// ==========================================

/// DOH = 库存 / 日均; 日均为 0 → 无穷, 负数或非有限 → 无定义
pub fn days_on_hand(inventory: f64, daily_rate: f64) -> Option<f64> {
    if !daily_rate.is_finite() || daily_rate < 0.0 || !inventory.is_finite() {
        return None;
    }
    if daily_rate == 0.0 {
        return Some(f64::INFINITY);
    }
    Some(inventory / daily_rate)
}

/// 建议量取整 (向上, 容忍浮点误差)
fn to_order_units(raw: f64) -> f64 {
    if raw <= UNIT_EPSILON {
        0.0
    } else {
        (raw - UNIT_EPSILON).ceil()
    }
}

/// (月份键, 下月首日, 当月天数)
fn month_span(date: NaiveDate) -> (String, NaiveDate, u32) {
    let month = month_key_of(date);
    let days = days_in_month(&month).unwrap_or(30);
    let remaining = u64::from(days.saturating_sub(date.day0()));
    let next_month_start = date
        .checked_add_days(Days::new(remaining))
        .unwrap_or(NaiveDate::MAX);
    (month, next_month_start, days)
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
    .unwrap_or(date)
}

fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < UNIT_EPSILON {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
