// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和德文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 计算引擎使用显式 locale, 不依赖全局状态
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "en";

/// 翻译消息（带参数, 指定语言）
///
/// # 示例
/// ```no_run
/// use supply_planner::i18n::t_in_locale;
/// let msg = t_in_locale("replenishment.moq_applied", "de", &[("raw", "40"), ("moq", "100")]);
/// ```
pub fn t_in_locale(key: &str, locale: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_args(mut result: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
