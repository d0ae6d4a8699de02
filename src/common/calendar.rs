// ==========================================
// 供应链补货规划系统 - 日历工具
// ==========================================
// 职责: 日期解析、月份键 (YYYY-MM) 运算
// 红线: 月份键统一为 YYYY-MM, 非法日期直接报错
// ==========================================

use crate::error::{PlanningError, PlanningResult};
use chrono::{Datelike, NaiveDate};

/// 解析 ISO 日期 (YYYY-MM-DD)
///
/// 允许尾随时间部分 (`2025-04-10T08:00:00`), 其余格式一律视为调用方错误。
pub fn parse_iso_date(raw: &str) -> PlanningResult<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default();

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| PlanningError::InvalidDate(raw.to_string()))
}

/// 规范化月份键
///
/// 支持格式:
/// - `2025-04` / `2025-4` / `2025/04`
/// - `2025-04-17` (取日期前缀)
/// - `04.2025` / `04/2025`
///
/// # 返回
/// - Some("YYYY-MM"): 规范化结果
/// - None: 无法识别
pub fn normalize_month_key(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let parts: Vec<&str> = value
        .split(|c| c == '-' || c == '/' || c == '.')
        .map(str::trim)
        .collect();

    let (year, month) = match parts.as_slice() {
        [first, second, ..] if first.len() == 4 => (*first, *second),
        [first, second] if second.len() == 4 => (*second, *first),
        _ => return None,
    };

    if month.len() > 2 || !is_digits(year) || !is_digits(month) {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    let key = format!("{:04}-{:02}", year, month);
    is_month_key(&key).then_some(key)
}

/// 严格解析月份键 (用于操作入口)
pub fn parse_month_key(raw: &str) -> PlanningResult<String> {
    normalize_month_key(raw).ok_or_else(|| PlanningError::InvalidMonthKey(raw.to_string()))
}

/// 校验 `^\d{4}-\d{2}$`
pub fn is_month_key(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// 日期所在月份键
pub fn month_key_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// 当前月份键
pub fn current_month_key(today: NaiveDate) -> String {
    month_key_of(today)
}

fn split_month_key(month: &str) -> Option<(i32, u32)> {
    if !is_month_key(month) {
        return None;
    }
    let year = month[..4].parse().ok()?;
    let month = month[5..].parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// 月份首日
pub fn first_day_of_month(month: &str) -> Option<NaiveDate> {
    let (year, month) = split_month_key(month)?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// 月份末日
pub fn last_day_of_month(month: &str) -> Option<NaiveDate> {
    let first = first_day_of_month(month)?;
    let days = days_in_month(month)?;
    first.checked_add_days(chrono::Days::new(u64::from(days) - 1))
}

/// 月份天数
pub fn days_in_month(month: &str) -> Option<u32> {
    let (year, month) = split_month_key(month)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    u32::try_from((next_first - first).num_days()).ok()
}

/// 月份键偏移 (可为负数)
pub fn add_months(month: &str, offset: i32) -> Option<String> {
    let (year, month) = split_month_key(month)?;
    let index = year * 12 + (month as i32 - 1) + offset;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) + 1;
    Some(format!("{:04}-{:02}", year, month))
}

/// 从起始月开始的连续 `count` 个月份键
pub fn month_range(start: &str, count: usize) -> Vec<String> {
    (0..count)
        .filter_map(|offset| add_months(start, offset as i32))
        .collect()
}

/// 月份数值 (YYYYMM), 用于排序评分
pub fn month_number(month: &str) -> Option<i64> {
    let (year, month) = split_month_key(month)?;
    Some(i64::from(year) * 100 + i64::from(month))
}
