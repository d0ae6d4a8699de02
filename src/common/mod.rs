// ==========================================
// 供应链补货规划系统 - 公共工具
// ==========================================
// 职责: 日历与数值解析, 被所有引擎共享
// ==========================================

pub mod calendar;
pub mod number;

pub use calendar::{
    add_months, current_month_key, days_in_month, first_day_of_month, is_month_key,
    last_day_of_month, month_key_of, month_number, month_range, normalize_month_key,
    parse_iso_date, parse_month_key,
};
pub use number::{parse_de_number, parse_de_value};
