// ==========================================
// 供应链补货规划系统 - 预测版本领域模型
// ==========================================
// 职责: 预测条目、预测版本、版本容器
// 红线: 版本创建后不可变, 容器只追加 (非激活版本可删除)
// ==========================================

use crate::domain::impact::ImpactSummary;
use crate::domain::types::{ConflictDecisionKind, ImportMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// ForecastEntry - 单 SKU 单月预测
// ==========================================
// 缺失字段为 None, 不等同于 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default)]
    pub units: Option<f64>,
    #[serde(default)]
    pub revenue_eur: Option<f64>,
    #[serde(default)]
    pub profit_eur: Option<f64>,
}

impl ForecastEntry {
    pub fn from_units(units: f64) -> Self {
        Self {
            units: Some(units),
            ..Self::default()
        }
    }

    /// 是否完全为空 (归一化时丢弃)
    pub fn is_empty(&self) -> bool {
        self.units.is_none() && self.revenue_eur.is_none() && self.profit_eur.is_none()
    }

    /// 营收, 缺失时按 `units × price` 估算
    pub fn revenue_or_estimate(&self, price_eur: Option<f64>) -> f64 {
        match self.revenue_eur {
            Some(revenue) => revenue,
            None => self.units.unwrap_or(0.0) * price_eur.unwrap_or(0.0),
        }
    }
}

/// SKU → 月份 (YYYY-MM) → 预测条目
pub type ForecastMap = BTreeMap<String, BTreeMap<String, ForecastEntry>>;

// ==========================================
// ForecastVersionStats - 版本统计
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForecastVersionStats {
    pub row_count: usize,
    pub sku_count: usize,
    pub month_count: usize,
}

impl ForecastVersionStats {
    pub fn from_map(map: &ForecastMap) -> Self {
        let months: BTreeSet<&str> = map
            .values()
            .flat_map(|months| months.keys().map(String::as_str))
            .collect();

        Self {
            row_count: map.values().map(BTreeMap::len).sum(),
            sku_count: map.len(),
            month_count: months.len(),
        }
    }
}

// ==========================================
// ForecastVersion - 预测版本 (不可变快照)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastVersion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub import_mode: ImportMode,
    #[serde(default)]
    pub only_active_skus: bool,
    #[serde(default)]
    pub forecast_import: ForecastMap,
    #[serde(default)]
    pub stats: ForecastVersionStats,
}

// ==========================================
// FoConflictDecision - FO 冲突处理记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoConflictDecision {
    pub fo_id: String,
    pub decision: ConflictDecisionKind,
    pub decided_at: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

// ==========================================
// ForecastState - 预测版本容器
// ==========================================
// 不变量: versions 非空时, forecast_import == 激活版本的 forecast_import
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastState {
    /// 激活版本镜像 (兼容旧读取方)
    #[serde(default)]
    pub forecast_import: ForecastMap,
    /// 按 created_at 升序
    #[serde(default)]
    pub versions: Vec<ForecastVersion>,
    #[serde(default)]
    pub active_version_id: Option<String>,
    #[serde(default)]
    pub last_impact_summary: Option<ImpactSummary>,
    #[serde(default)]
    pub last_import_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub import_source: Option<String>,
    /// 版本ID → FO ID → 处理决定
    #[serde(default)]
    pub fo_conflict_decisions_by_version: BTreeMap<String, BTreeMap<String, FoConflictDecision>>,
}

impl ForecastState {
    /// 按 ID 查找版本
    pub fn find_version(&self, version_id: &str) -> Option<&ForecastVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// 当前激活版本 (ID 失效时回退到最新版本)
    pub fn active_version(&self) -> Option<&ForecastVersion> {
        self.active_version_id
            .as_deref()
            .and_then(|id| self.find_version(id))
            .or_else(|| self.versions.last())
    }

    /// 激活版本之前的最近一个版本 (默认对比基线)
    pub fn previous_version(&self) -> Option<&ForecastVersion> {
        let active = self.active_version()?;
        let index = self.versions.iter().position(|v| v.id == active.id)?;
        index.checked_sub(1).and_then(|i| self.versions.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_map() {
        let mut map = ForecastMap::new();
        map.entry("SKU-1".to_string())
            .or_default()
            .insert("2025-04".to_string(), ForecastEntry::from_units(10.0));
        map.entry("SKU-1".to_string())
            .or_default()
            .insert("2025-05".to_string(), ForecastEntry::from_units(12.0));
        map.entry("SKU-2".to_string())
            .or_default()
            .insert("2025-05".to_string(), ForecastEntry::from_units(3.0));

        let stats = ForecastVersionStats::from_map(&map);
        assert_eq!(stats.row_count, 3);
        assert_eq!(stats.sku_count, 2);
        assert_eq!(stats.month_count, 2);
    }

    #[test]
    fn test_revenue_fallback() {
        let entry = ForecastEntry::from_units(4.0);
        assert_eq!(entry.revenue_or_estimate(Some(2.5)), 10.0);
        let entry = ForecastEntry {
            units: Some(4.0),
            revenue_eur: Some(7.0),
            profit_eur: None,
        };
        assert_eq!(entry.revenue_or_estimate(Some(2.5)), 7.0);
    }
}
