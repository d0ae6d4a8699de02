// ==========================================
// 供应链补货规划系统 - 影响判定策略
// ==========================================
// 职责: ABC 阈值判定、FO 冲突分类、严重度评分
// 说明: 阈值与权重集中于此, 遍历逻辑在 forecast_impact
// ==========================================

use crate::common::calendar::month_number;
use crate::domain::types::{AbcClass, ConflictType};
use serde::{Deserialize, Serialize};

/// 单个 ABC 等级的阈值 (百分比 或 件数, 任一超过即触发)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbcThreshold {
    pub pct: f64,
    pub units: f64,
}

// ==========================================
// ImpactPolicy - 判定策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactPolicy {
    pub threshold_a: AbcThreshold,
    pub threshold_b: AbcThreshold,
    pub threshold_c: AbcThreshold,

    // ===== 严重度评分 (越小越优先) =====
    pub severity_base_a: i64,
    pub severity_base_b: i64,
    pub severity_base_c: i64,
    /// 缺少需求到货月时的月份分
    pub unknown_month_score: i64,
    pub penalty_timing_too_late: i64,
    pub penalty_units_too_small: i64,
    pub penalty_timing_too_early: i64,
    pub penalty_safety_risk: i64,
}

impl Default for ImpactPolicy {
    fn default() -> Self {
        Self {
            threshold_a: AbcThreshold { pct: 10.0, units: 50.0 },
            threshold_b: AbcThreshold { pct: 15.0, units: 80.0 },
            threshold_c: AbcThreshold { pct: 25.0, units: 120.0 },
            severity_base_a: 0,
            severity_base_b: 1000,
            severity_base_c: 2000,
            unknown_month_score: 999_999,
            penalty_timing_too_late: -150,
            penalty_units_too_small: -90,
            penalty_timing_too_early: -20,
            penalty_safety_risk: -40,
        }
    }
}

/// FO 冲突判定输入
#[derive(Debug, Clone, Copy)]
pub struct FoConflictCheck<'a> {
    pub abc_class: AbcClass,
    pub current_units: f64,
    pub recommended_units: f64,
    pub safety_risk: bool,
    pub arrival_month: Option<&'a str>,
    pub required_arrival_month: Option<&'a str>,
    pub first_risk_month: Option<&'a str>,
}

impl ImpactPolicy {
    pub fn threshold_for(&self, abc_class: AbcClass) -> AbcThreshold {
        match abc_class {
            AbcClass::A => self.threshold_a,
            AbcClass::B => self.threshold_b,
            AbcClass::C => self.threshold_c,
        }
    }

    /// 是否超过等级阈值 (严格大于, 取绝对值)
    pub fn exceeds_threshold(&self, abc_class: AbcClass, delta_units: f64, delta_pct: f64) -> bool {
        let threshold = self.threshold_for(abc_class);
        delta_pct.abs() > threshold.pct || delta_units.abs() > threshold.units
    }

    /// FO 冲突分类
    ///
    /// - units_too_small: 少于推荐, 且超阈值或有安全风险
    /// - units_too_large: 多于推荐, 且超阈值
    /// - timing_too_late: 到货月晚于需求月, 或晚于首个风险月
    /// - timing_too_early: 到货月早于需求月, 且数量超大
    pub fn classify_fo_conflict(&self, check: &FoConflictCheck<'_>) -> Vec<ConflictType> {
        let delta_units = check.current_units - check.recommended_units;
        let delta_pct = delta_pct(check.recommended_units, check.current_units);
        let over_threshold = self.exceeds_threshold(check.abc_class, delta_units, delta_pct);

        let mut types = Vec::new();

        let too_small = check.current_units < check.recommended_units
            && (over_threshold || check.safety_risk);
        let too_large = check.current_units > check.recommended_units && over_threshold;
        if too_small {
            types.push(ConflictType::UnitsTooSmall);
        }
        if too_large {
            types.push(ConflictType::UnitsTooLarge);
        }

        if let Some(arrival) = check.arrival_month {
            let later_than_required = check
                .required_arrival_month
                .is_some_and(|required| arrival > required);
            let later_than_risk = check.first_risk_month.is_some_and(|risk| arrival > risk);
            if later_than_required || later_than_risk {
                types.push(ConflictType::TimingTooLate);
            }

            let earlier_than_required = check
                .required_arrival_month
                .is_some_and(|required| arrival < required);
            if earlier_than_required && too_large {
                types.push(ConflictType::TimingTooEarly);
            }
        }

        types
    }

    /// 严重度评分: 等级基数 + 需求月数值 + 类型罚分 + 安全罚分
    pub fn severity_score(
        &self,
        abc_class: AbcClass,
        required_arrival_month: Option<&str>,
        types: &[ConflictType],
        safety_risk: bool,
    ) -> i64 {
        let base = match abc_class {
            AbcClass::A => self.severity_base_a,
            AbcClass::B => self.severity_base_b,
            AbcClass::C => self.severity_base_c,
        };
        let month_score = required_arrival_month
            .and_then(month_number)
            .unwrap_or(self.unknown_month_score);

        // 只取最严重的类型罚分
        let type_penalty = if types.contains(&ConflictType::TimingTooLate) {
            self.penalty_timing_too_late
        } else if types.contains(&ConflictType::UnitsTooSmall) {
            self.penalty_units_too_small
        } else if types.contains(&ConflictType::TimingTooEarly) {
            self.penalty_timing_too_early
        } else {
            0
        };
        let safety_penalty = if safety_risk { self.penalty_safety_risk } else { 0 };

        base + month_score + type_penalty + safety_penalty
    }
}

/// 变化百分比: 基数为 0 时, 新值非 0 → 100, 否则 0
pub fn delta_pct(prev: f64, next: f64) -> f64 {
    if prev == 0.0 {
        if next == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (next - prev) / prev.abs() * 100.0
    }
}
