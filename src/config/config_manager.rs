// ==========================================
// 供应链补货规划系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value 表 (global scope)
// 来源 (后者覆盖前者): 默认值 → JSON 文件 → PLANNER_* 环境变量
// ==========================================

use crate::common::number::parse_de_number;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::settings_reader::PlanningConfigReader;
use crate::domain::replenishment::ReplenishmentPolicy;
use crate::domain::settings::PlanningSettings;
use crate::engine::impact_policy::{AbcThreshold, ImpactPolicy};
use crate::i18n::DEFAULT_LOCALE;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "PLANNER_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl ConfigManager {
    /// 创建空配置 (全部取默认值)
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有 key-value 表创建
    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self {
            values: Arc::new(Mutex::new(values)),
        }
    }

    /// 从 JSON 对象文件创建
    ///
    /// 值可以是字符串、数字或布尔; null 忽略
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let manager = Self::new();
        manager.restore_config_from_snapshot(&raw)?;
        tracing::info!(path = %path.display(), "加载配置文件");
        Ok(manager)
    }

    /// 默认配置加载: 默认路径存在则读文件, 再叠加进程环境变量
    pub fn load_default() -> ConfigResult<Self> {
        let manager = match default_config_path() {
            Some(path) if path.exists() => Self::from_json_file(&path)?,
            _ => Self::new(),
        };
        manager.apply_env_overrides(std::env::vars())?;
        Ok(manager)
    }

    /// 叠加 `PLANNER_<KEY>` 形式的覆写
    ///
    /// # 返回
    /// - 应用的覆写条数
    pub fn apply_env_overrides<I>(&self, vars: I) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut count = 0;
        for (name, value) in vars {
            let Some(suffix) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = suffix.to_ascii_lowercase();
            if !config_keys::ALL.contains(&key.as_str()) {
                continue;
            }
            self.set_global_config_value(&key, value.trim())?;
            count += 1;
        }
        if count > 0 {
            tracing::debug!(count, "应用环境变量覆写");
        }
        Ok(count)
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    /// 写入 global scope 的配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// 获取所有配置的快照 (JSON 字符串)
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;
        Ok(serde_json::to_string(&*values)?)
    }

    /// 从配置快照恢复 (覆盖同名键)
    ///
    /// # 返回
    /// - 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let parsed: BTreeMap<String, JsonValue> = serde_json::from_str(snapshot_json)?;

        let mut values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;
        let mut count = 0;
        for (key, value) in parsed {
            let text = match value {
                JsonValue::Null => continue,
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            values.insert(key, text);
            count += 1;
        }
        Ok(count)
    }

    // ===== 类型化读取 =====

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_f64(&self, key: &str, default: f64) -> ConfigResult<f64> {
        match self.get_global_config_value(key)? {
            Some(raw) => parse_number(key, &raw),
            None => Ok(default),
        }
    }

    fn get_opt_f64(&self, key: &str, default: Option<f64>) -> ConfigResult<Option<f64>> {
        match self.get_global_config_value(key)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_number(key, &raw).map(Some),
            None => Ok(default),
        }
    }

    fn get_i64(&self, key: &str, default: i64) -> ConfigResult<i64> {
        let value = self.get_f64(key, default as f64)?;
        Ok(value.round() as i64)
    }

    fn get_u32(&self, key: &str, default: u32) -> ConfigResult<u32> {
        let value = self.get_i64(key, i64::from(default))?;
        u32::try_from(value).map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn get_threshold(
        &self,
        pct_key: &str,
        units_key: &str,
        default: AbcThreshold,
    ) -> ConfigResult<AbcThreshold> {
        Ok(AbcThreshold {
            pct: self.get_f64(pct_key, default.pct)?,
            units: self.get_f64(units_key, default.units)?,
        })
    }
}

// ==========================================
// PlanningConfigReader Trait 实现
// ==========================================
impl PlanningConfigReader for ConfigManager {
    fn get_planning_settings(&self) -> ConfigResult<PlanningSettings> {
        use config_keys::*;
        let defaults = PlanningSettings::default();

        let production_days =
            self.get_i64(DEFAULT_PRODUCTION_LEAD_TIME_DAYS, defaults.default_production_lead_time_days)?;
        let transit_days = self.get_i64(DEFAULT_TRANSIT_DAYS, defaults.default_transit_days)?;
        let policy = defaults.policy_defaults;

        Ok(PlanningSettings {
            default_production_lead_time_days: production_days,
            default_transit_days: transit_days,
            default_buffer_days: self.get_i64(DEFAULT_BUFFER_DAYS, defaults.default_buffer_days)?,
            policy_defaults: ReplenishmentPolicy {
                safety_stock_days_total_de: self
                    .get_f64(SAFETY_STOCK_DAYS, policy.safety_stock_days_total_de)?,
                minimum_stock_days_total_de: self
                    .get_opt_f64(MINIMUM_STOCK_DAYS, policy.minimum_stock_days_total_de)?,
                // 未单独配置时 = 生产 + 运输
                lead_time_days_total: self
                    .get_i64(LEAD_TIME_DAYS_TOTAL, production_days + transit_days)?,
                moq_units: self.get_f64(MOQ_UNITS, policy.moq_units)?,
                operational_coverage_days_default: self.get_i64(
                    OPERATIONAL_COVERAGE_DAYS,
                    policy.operational_coverage_days_default,
                )?,
            },
            fo_recommendation_horizon_months: self.get_u32(
                FO_RECOMMENDATION_HORIZON_MONTHS,
                defaults.fo_recommendation_horizon_months,
            )?,
            projection_horizon_months: self
                .get_u32(PROJECTION_HORIZON_MONTHS, defaults.projection_horizon_months)?,
        })
    }

    fn get_impact_policy(&self) -> ConfigResult<ImpactPolicy> {
        use config_keys::*;
        let defaults = ImpactPolicy::default();

        Ok(ImpactPolicy {
            threshold_a: self.get_threshold(THRESHOLD_A_PCT, THRESHOLD_A_UNITS, defaults.threshold_a)?,
            threshold_b: self.get_threshold(THRESHOLD_B_PCT, THRESHOLD_B_UNITS, defaults.threshold_b)?,
            threshold_c: self.get_threshold(THRESHOLD_C_PCT, THRESHOLD_C_UNITS, defaults.threshold_c)?,
            severity_base_a: self.get_i64(SEVERITY_BASE_A, defaults.severity_base_a)?,
            severity_base_b: self.get_i64(SEVERITY_BASE_B, defaults.severity_base_b)?,
            severity_base_c: self.get_i64(SEVERITY_BASE_C, defaults.severity_base_c)?,
            unknown_month_score: defaults.unknown_month_score,
            penalty_timing_too_late: self
                .get_i64(PENALTY_TIMING_TOO_LATE, defaults.penalty_timing_too_late)?,
            penalty_units_too_small: self
                .get_i64(PENALTY_UNITS_TOO_SMALL, defaults.penalty_units_too_small)?,
            penalty_timing_too_early: self
                .get_i64(PENALTY_TIMING_TOO_EARLY, defaults.penalty_timing_too_early)?,
            penalty_safety_risk: self.get_i64(PENALTY_SAFETY_RISK, defaults.penalty_safety_risk)?,
        })
    }

    fn get_warning_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::WARNING_LOCALE, DEFAULT_LOCALE)?;
        let value = value.trim().to_ascii_lowercase();
        if value.is_empty() {
            Ok(DEFAULT_LOCALE.to_string())
        } else {
            Ok(value)
        }
    }
}

fn parse_number(key: &str, raw: &str) -> ConfigResult<f64> {
    parse_de_number(raw).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// 默认配置文件路径: `<config_dir>/supply-planner/config.json`
///
/// 环境变量 `PLANNER_CONFIG_PATH` 可显式指定
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PLANNER_CONFIG_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join("supply-planner").join("config.json"))
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 提前期
    pub const DEFAULT_PRODUCTION_LEAD_TIME_DAYS: &str = "default_production_lead_time_days";
    pub const DEFAULT_TRANSIT_DAYS: &str = "default_transit_days";
    pub const DEFAULT_BUFFER_DAYS: &str = "default_buffer_days";

    // 补货策略默认值
    pub const SAFETY_STOCK_DAYS: &str = "safety_stock_days";
    pub const MINIMUM_STOCK_DAYS: &str = "minimum_stock_days";
    pub const LEAD_TIME_DAYS_TOTAL: &str = "lead_time_days_total";
    pub const MOQ_UNITS: &str = "moq_units";
    pub const OPERATIONAL_COVERAGE_DAYS: &str = "operational_coverage_days";

    // 视野
    pub const FO_RECOMMENDATION_HORIZON_MONTHS: &str = "fo_recommendation_horizon_months";
    pub const PROJECTION_HORIZON_MONTHS: &str = "projection_horizon_months";

    // ABC 阈值
    pub const THRESHOLD_A_PCT: &str = "impact_threshold_a_pct";
    pub const THRESHOLD_A_UNITS: &str = "impact_threshold_a_units";
    pub const THRESHOLD_B_PCT: &str = "impact_threshold_b_pct";
    pub const THRESHOLD_B_UNITS: &str = "impact_threshold_b_units";
    pub const THRESHOLD_C_PCT: &str = "impact_threshold_c_pct";
    pub const THRESHOLD_C_UNITS: &str = "impact_threshold_c_units";

    // 严重度
    pub const SEVERITY_BASE_A: &str = "severity_base_a";
    pub const SEVERITY_BASE_B: &str = "severity_base_b";
    pub const SEVERITY_BASE_C: &str = "severity_base_c";
    pub const PENALTY_TIMING_TOO_LATE: &str = "penalty_timing_too_late";
    pub const PENALTY_UNITS_TOO_SMALL: &str = "penalty_units_too_small";
    pub const PENALTY_TIMING_TOO_EARLY: &str = "penalty_timing_too_early";
    pub const PENALTY_SAFETY_RISK: &str = "penalty_safety_risk";

    // 告警语言
    pub const WARNING_LOCALE: &str = "warning_locale";

    /// 全部已知键 (环境变量覆写只接受这些)
    pub const ALL: &[&str] = &[
        DEFAULT_PRODUCTION_LEAD_TIME_DAYS,
        DEFAULT_TRANSIT_DAYS,
        DEFAULT_BUFFER_DAYS,
        SAFETY_STOCK_DAYS,
        MINIMUM_STOCK_DAYS,
        LEAD_TIME_DAYS_TOTAL,
        MOQ_UNITS,
        OPERATIONAL_COVERAGE_DAYS,
        FO_RECOMMENDATION_HORIZON_MONTHS,
        PROJECTION_HORIZON_MONTHS,
        THRESHOLD_A_PCT,
        THRESHOLD_A_UNITS,
        THRESHOLD_B_PCT,
        THRESHOLD_B_UNITS,
        THRESHOLD_C_PCT,
        THRESHOLD_C_UNITS,
        SEVERITY_BASE_A,
        SEVERITY_BASE_B,
        SEVERITY_BASE_C,
        PENALTY_TIMING_TOO_LATE,
        PENALTY_UNITS_TOO_SMALL,
        PENALTY_TIMING_TOO_EARLY,
        PENALTY_SAFETY_RISK,
        WARNING_LOCALE,
    ];
}
