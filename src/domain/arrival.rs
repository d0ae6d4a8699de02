// ==========================================
// 供应链补货规划系统 - PO 到货任务
// ==========================================
// 派生只读对象, 每次请求重算
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoArrivalTask {
    pub id: String,
    pub po_number: String,
    pub supplier: String,
    pub sku_aliases: Vec<String>,
    pub units: f64,
    pub eta_date: NaiveDate,
    pub arrival_date: Option<NaiveDate>,
    pub month_relevant: bool,
    pub is_overdue: bool,
    pub pending: bool,
}
