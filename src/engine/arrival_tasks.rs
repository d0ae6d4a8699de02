// ==========================================
// 供应链补货规划系统 - PO 到货任务
// ==========================================
// 职责: 生成指定月份相关的 PO 到货工作清单
// 规则: ETA 落在目标月 或 (未到货 且 ETA < 今天)
// 排序: 待到货优先 → 本月相关优先 → ETA 升序 → 单号
// ==========================================

use crate::common::calendar::{month_key_of, parse_month_key};
use crate::domain::arrival::PoArrivalTask;
use crate::domain::order::PurchaseOrder;
use crate::domain::state::PlanningState;
use crate::error::PlanningResult;
use chrono::{Days, Local, NaiveDate};
use std::cmp::Ordering;

/// PO 的 ETA: 手工 ETA → 下单日 + 生产天数 + 运输天数
pub fn resolve_po_eta(po: &PurchaseOrder) -> Option<NaiveDate> {
    if let Some(eta) = po.eta_manual {
        return Some(eta);
    }
    let order_date = po.order_date?;
    let days = po.prod_days.unwrap_or(0).max(0) + po.transit_days.unwrap_or(0).max(0);
    order_date.checked_add_days(Days::new(days.unsigned_abs()))
}

// ==========================================
// ArrivalTaskBuilder - 到货任务生成
// ==========================================
pub struct ArrivalTaskBuilder;

impl Default for ArrivalTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrivalTaskBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 生成到货任务
    ///
    /// # 参数
    /// - `state`: 应用状态
    /// - `month`: 目标月份 (YYYY-MM)
    /// - `today`: 基准日期 (None 取本地当天)
    ///
    /// # 返回
    /// - Err: 月份格式非法
    pub fn build(
        &self,
        state: &PlanningState,
        month: &str,
        today: Option<NaiveDate>,
    ) -> PlanningResult<Vec<PoArrivalTask>> {
        let month = parse_month_key(month)?;
        let today = today.unwrap_or_else(|| Local::now().date_naive());

        let mut tasks: Vec<PoArrivalTask> = state
            .pos
            .iter()
            .filter_map(|po| self.build_task(state, po, &month, today))
            .collect();
        tasks.sort_by(compare_tasks);

        tracing::debug!(month = %month, count = tasks.len(), "生成到货任务");
        Ok(tasks)
    }

    fn build_task(
        &self,
        state: &PlanningState,
        po: &PurchaseOrder,
        month: &str,
        today: NaiveDate,
    ) -> Option<PoArrivalTask> {
        let eta = resolve_po_eta(po)?;
        let month_relevant = month_key_of(eta) == month;
        let pending = po.arrival_date.is_none();
        let is_overdue = pending && eta < today;

        if !month_relevant && !is_overdue {
            return None;
        }

        let line_items = po.line_items();
        let mut sku_aliases: Vec<String> = Vec::new();
        for item in &line_items {
            let alias = state
                .find_product(&item.sku)
                .map(|p| p.display_alias().to_string())
                .unwrap_or_else(|| item.sku.clone());
            if !sku_aliases.contains(&alias) {
                sku_aliases.push(alias);
            }
        }
        let units = line_items.iter().map(|item| item.units).sum();

        let supplier = po
            .supplier_id
            .as_deref()
            .map(|reference| {
                state
                    .find_supplier(reference)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| reference.to_string())
            })
            .unwrap_or_default();

        Some(PoArrivalTask {
            id: po.id.clone(),
            po_number: po.po_no.clone(),
            supplier,
            sku_aliases,
            units,
            eta_date: eta,
            arrival_date: po.arrival_date,
            month_relevant,
            is_overdue,
            pending,
        })
    }
}

fn compare_tasks(a: &PoArrivalTask, b: &PoArrivalTask) -> Ordering {
    b.pending
        .cmp(&a.pending)
        .then_with(|| b.month_relevant.cmp(&a.month_relevant))
        .then_with(|| a.eta_date.cmp(&b.eta_date))
        .then_with(|| a.po_number.cmp(&b.po_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::PoLineItem;
    use crate::domain::product::{Product, Supplier};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn po(id: &str, eta: NaiveDate, arrival: Option<NaiveDate>) -> PurchaseOrder {
        PurchaseOrder {
            id: id.to_string(),
            po_no: format!("PO-{}", id),
            supplier_id: Some("sup-1".to_string()),
            eta_manual: Some(eta),
            arrival_date: arrival,
            items: vec![PoLineItem {
                sku: "SKU-1".to_string(),
                units: 100.0,
            }],
            ..Default::default()
        }
    }

    fn state_with(pos: Vec<PurchaseOrder>) -> PlanningState {
        PlanningState {
            products: vec![
                Product {
                    sku: "SKU-1".to_string(),
                    alias: Some("Teapot".to_string()),
                    ..Default::default()
                },
                Product {
                    sku: "SKU-2".to_string(),
                    alias: Some("Teapot".to_string()),
                    ..Default::default()
                },
            ],
            suppliers: vec![Supplier {
                id: "sup-1".to_string(),
                name: "Acme Ceramics".to_string(),
            }],
            pos,
            ..Default::default()
        }
    }

    #[test]
    fn test_eta_from_lead_times() {
        let order = PurchaseOrder {
            id: "1".to_string(),
            order_date: Some(date(2025, 1, 10)),
            prod_days: Some(30),
            transit_days: Some(20),
            ..Default::default()
        };
        assert_eq!(resolve_po_eta(&order), Some(date(2025, 3, 1)));

        let without_date = PurchaseOrder {
            id: "2".to_string(),
            ..Default::default()
        };
        assert_eq!(resolve_po_eta(&without_date), None);
    }

    #[test]
    fn test_inclusion_rules() {
        let today = date(2025, 5, 15);
        let state = state_with(vec![
            po("in-month", date(2025, 6, 10), None),
            po("overdue", date(2025, 4, 20), None),
            po("arrived-old", date(2025, 4, 20), Some(date(2025, 4, 25))),
            po("future", date(2025, 8, 1), None),
        ]);

        let tasks = ArrivalTaskBuilder::new()
            .build(&state, "2025-06", Some(today))
            .unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["in-month", "overdue"]);

        let in_month = &tasks[0];
        assert!(in_month.month_relevant);
        assert!(!in_month.is_overdue);
        assert_eq!(in_month.supplier, "Acme Ceramics");

        let overdue = &tasks[1];
        assert!(overdue.is_overdue);
        assert!(overdue.pending);
        assert!(!overdue.month_relevant);
    }

    #[test]
    fn test_multi_line_aggregation() {
        let mut order = po("multi", date(2025, 6, 3), None);
        order.supplier_id = Some("Unknown Supplier".to_string());
        order.items = vec![
            PoLineItem { sku: "SKU-1".to_string(), units: 40.0 },
            PoLineItem { sku: "SKU-2".to_string(), units: 60.0 },
            PoLineItem { sku: "SKU-9".to_string(), units: 5.0 },
        ];
        let state = state_with(vec![order]);

        let tasks = ArrivalTaskBuilder::new()
            .build(&state, "2025-06", Some(date(2025, 6, 1)))
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].sku_aliases, vec!["Teapot", "SKU-9"]);
        assert_eq!(tasks[0].units, 105.0);
        assert_eq!(tasks[0].supplier, "Unknown Supplier");
    }

    #[test]
    fn test_sort_order() {
        let today = date(2025, 6, 20);
        let state = state_with(vec![
            po("b-arrived", date(2025, 6, 2), Some(date(2025, 6, 2))),
            po("c-late", date(2025, 6, 12), None),
            po("a-late", date(2025, 6, 5), None),
            po("d-old", date(2025, 5, 1), None),
        ]);

        let tasks = ArrivalTaskBuilder::new()
            .build(&state, "2025-06", Some(today))
            .unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a-late", "c-late", "d-old", "b-arrived"]);
    }

    #[test]
    fn test_invalid_month_is_error() {
        let state = state_with(Vec::new());
        assert!(ArrivalTaskBuilder::new()
            .build(&state, "June", Some(date(2025, 6, 1)))
            .is_err());
    }
}
