// ==========================================
// 供应链补货规划系统 - 全局设置
// ==========================================
// 由 ConfigManager 物化, 随状态一起保存
// ==========================================

use crate::domain::replenishment::ReplenishmentPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningSettings {
    /// 默认生产周期 (天)
    pub default_production_lead_time_days: i64,
    /// 默认运输周期 (天)
    pub default_transit_days: i64,
    /// 默认缓冲天数
    pub default_buffer_days: i64,
    /// 补货策略默认值
    pub policy_defaults: ReplenishmentPolicy,
    /// FO 推荐覆盖月数
    pub fo_recommendation_horizon_months: u32,
    /// 库存投影月数
    pub projection_horizon_months: u32,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        let default_production_lead_time_days = 45;
        let default_transit_days = 30;
        Self {
            default_production_lead_time_days,
            default_transit_days,
            default_buffer_days: 0,
            policy_defaults: ReplenishmentPolicy {
                lead_time_days_total: default_production_lead_time_days + default_transit_days,
                ..ReplenishmentPolicy::default()
            },
            fo_recommendation_horizon_months: 12,
            projection_horizon_months: 12,
        }
    }
}
