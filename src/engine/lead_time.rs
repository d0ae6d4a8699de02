// ==========================================
// 供应链补货规划系统 - 提前期解析
// ==========================================
// 优先级: 订单自身字段 → 商品默认值 → 全局设置
// ==========================================

use crate::domain::order::ForecastOrder;
use crate::domain::product::Product;
use crate::domain::settings::PlanningSettings;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLeadTime {
    pub production_days: i64,
    pub buffer_days: i64,
    pub transit_days: i64,
}

impl ResolvedLeadTime {
    pub fn total_days(&self) -> i64 {
        self.production_days + self.buffer_days + self.transit_days
    }
}

/// 解析 FO 提前期
pub fn resolve_fo_lead_time(
    fo: &ForecastOrder,
    product: Option<&Product>,
    settings: &PlanningSettings,
) -> ResolvedLeadTime {
    let production_days = fo
        .production_lead_time_days
        .or_else(|| product.and_then(|p| p.production_lead_time_days_default))
        .unwrap_or(settings.default_production_lead_time_days);
    let transit_days = fo
        .transit_days
        .or_else(|| product.and_then(|p| p.transit_days_default))
        .unwrap_or(settings.default_transit_days);
    let buffer_days = fo.buffer_days.unwrap_or(settings.default_buffer_days);

    ResolvedLeadTime {
        production_days: production_days.max(0),
        buffer_days: buffer_days.max(0),
        transit_days: transit_days.max(0),
    }
}

/// FO 到货日期: 目标到货日 → 下单日 + 提前期
pub fn resolve_fo_arrival_date(fo: &ForecastOrder, lead_time: &ResolvedLeadTime) -> Option<NaiveDate> {
    fo.target_delivery_date.or_else(|| {
        let order_date = fo.order_date?;
        order_date.checked_add_days(Days::new(lead_time.total_days().max(0).unsigned_abs()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_time_priority() {
        let settings = PlanningSettings::default();
        let product = Product {
            sku: "SKU-1".to_string(),
            production_lead_time_days_default: Some(20),
            ..Default::default()
        };
        let fo = ForecastOrder {
            id: "FO-1".to_string(),
            sku: "SKU-1".to_string(),
            transit_days: Some(10),
            order_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };

        let lead = resolve_fo_lead_time(&fo, Some(&product), &settings);
        assert_eq!(lead.production_days, 20);
        assert_eq!(lead.transit_days, 10);
        assert_eq!(lead.buffer_days, settings.default_buffer_days);
        assert_eq!(
            resolve_fo_arrival_date(&fo, &lead),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );

        let lead = resolve_fo_lead_time(&fo, None, &settings);
        assert_eq!(lead.production_days, settings.default_production_lead_time_days);
    }
}
