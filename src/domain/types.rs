// ==========================================
// 供应链补货规划系统 - 领域类型定义
// ==========================================
// 职责: 枚举类型 (置信度/状态/ABC/安全等级/冲突类型)
// 序列化格式: 与宿主应用 JSON 保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 置信度 (Confidence)
// ==========================================
// 顺序: High > Medium > Low, 只降不升
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 建议状态 (Suggestion Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Ok,
    InsufficientForecast,
    InsufficientInventorySnapshot,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Ok => "ok",
            SuggestionStatus::InsufficientForecast => "insufficient_forecast",
            SuggestionStatus::InsufficientInventorySnapshot => "insufficient_inventory_snapshot",
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 导入模式 (Import Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    Merge,
    Overwrite,
    #[default]
    Unset,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Merge => write!(f, "merge"),
            ImportMode::Overwrite => write!(f, "overwrite"),
            ImportMode::Unset => write!(f, "unset"),
        }
    }
}

// ==========================================
// ABC 分类 (按营收贡献)
// ==========================================
// 顺序: A < B < C (A 最重要, 排序时优先)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    #[default]
    C,
}

impl AbcClass {
    /// A/B 类 (汇总统计用)
    pub fn is_a_or_b(&self) -> bool {
        matches!(self, AbcClass::A | AbcClass::B)
    }
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

// ==========================================
// 库存投影安全等级 (Projection Safety Class)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SafetyClass {
    #[default]
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "safety-low")]
    SafetyLow,
    #[serde(rename = "safety-negative")]
    SafetyNegative,
}

impl SafetyClass {
    /// 是否构成安全库存风险
    pub fn is_risk(&self) -> bool {
        matches!(self, SafetyClass::SafetyLow | SafetyClass::SafetyNegative)
    }
}

// ==========================================
// FO 状态 (Forecast Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoStatus {
    #[default]
    Draft,
    Active,
    Converted,
    Cancelled,
}

impl FoStatus {
    /// 是否仍可调整 (参与冲突检测)
    pub fn is_open(&self) -> bool {
        matches!(self, FoStatus::Draft | FoStatus::Active)
    }
}

impl fmt::Display for FoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoStatus::Draft => write!(f, "DRAFT"),
            FoStatus::Active => write!(f, "ACTIVE"),
            FoStatus::Converted => write!(f, "CONVERTED"),
            FoStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// ==========================================
// SKU 标记原因 (Flag Reason)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    AbcThreshold,
    SafetyRisk,
}

impl FlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagReason::AbcThreshold => "abc_threshold",
            FlagReason::SafetyRisk => "safety_risk",
        }
    }
}

// ==========================================
// FO 冲突类型 (Conflict Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    UnitsTooSmall,
    UnitsTooLarge,
    TimingTooLate,
    TimingTooEarly,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::UnitsTooSmall => "units_too_small",
            ConflictType::UnitsTooLarge => "units_too_large",
            ConflictType::TimingTooLate => "timing_too_late",
            ConflictType::TimingTooEarly => "timing_too_early",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 推荐结果状态 (Recommendation Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Ok,
    NotComputable,
}

// ==========================================
// 冲突处理决定 (Conflict Decision)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictDecisionKind {
    Ignored,
    Adjusted,
}
