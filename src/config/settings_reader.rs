// ==========================================
// 供应链补货规划系统 - 规划配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口 (不包含实现)
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::settings::PlanningSettings;
use crate::engine::impact_policy::ImpactPolicy;

// ==========================================
// PlanningConfigReader Trait
// ==========================================
// 实现者: ConfigManager (key-value 表)
pub trait PlanningConfigReader: Send + Sync {
    /// 物化全局规划设置
    ///
    /// # 默认值
    /// - 未配置的键取 `PlanningSettings::default()` 对应字段
    fn get_planning_settings(&self) -> ConfigResult<PlanningSettings>;

    /// 物化影响判定策略 (ABC 阈值 + 严重度权重)
    fn get_impact_policy(&self) -> ConfigResult<ImpactPolicy>;

    /// 补货告警语言
    ///
    /// # 默认值
    /// - en
    fn get_warning_locale(&self) -> ConfigResult<String>;
}
