// ==========================================
// 供应链补货规划系统 - 数值解析
// ==========================================
// 职责: 德语/英语混合格式的数值解析
// 例: "1.234,5" / "1,234.5" / "1234,5" / "€ 12,90"
// ==========================================

use serde_json::Value as JsonValue;

/// 解析本地化数值
///
/// 规则:
/// - 同时出现 `.` 与 `,` 时, 位置靠后的为小数点
/// - 仅出现 `,` 时视为小数点 (德语习惯)
/// - 仅出现多个 `.` 时视为千分位
/// - 去除货币符号、空白与百分号
///
/// # 返回
/// - Some(f64): 有限数值
/// - None: 空值或无法解析
pub fn parse_de_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '%' | '\''))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) => {
            if cleaned.matches(',').count() > 1 {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (Some(_), None) => {
            if cleaned.matches('.').count() > 1 {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// 解析 JSON 值 (数字或字符串)
pub fn parse_de_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => parse_de_number(s),
        _ => None,
    }
}
