// ==========================================
// 供应链补货规划系统 - 预测版本存储
// ==========================================
// 职责: 预测快照 (版本) 的追加/改名/删除/激活 + 旧数据迁移
// 输入: 调用方持有的 ForecastState (&mut, 原地修改)
// 输出: 小型结果值; 业务失败以 Err(VersionStoreError) 返回
// ==========================================
// 红线: 激活版本不可删除
// 红线: versions 非空时 forecast_import 恒等于激活版本
// 说明: 归一化是尽力过滤, 非法月份/条目静默丢弃
// ==========================================

use crate::common::calendar::{is_month_key, normalize_month_key};
use crate::common::number::parse_de_value;
use crate::domain::forecast::{
    FoConflictDecision, ForecastEntry, ForecastMap, ForecastState, ForecastVersion,
    ForecastVersionStats,
};
use crate::domain::types::{ConflictDecisionKind, ImportMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

// ==========================================
// VersionStoreError - 版本操作失败原因
// ==========================================
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStoreError {
    #[error("active forecast version cannot be deleted")]
    ActiveVersion,

    #[error("forecast version not found")]
    NotFound,
}

impl VersionStoreError {
    /// 稳定原因码
    pub fn code(&self) -> &'static str {
        match self {
            VersionStoreError::ActiveVersion => "ACTIVE_VERSION",
            VersionStoreError::NotFound => "NOT_FOUND",
        }
    }
}

// ==========================================
// 输入对象
// ==========================================

/// 新版本输入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewForecastVersion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub source_label: String,
    #[serde(default)]
    pub import_mode: ImportMode,
    #[serde(default)]
    pub only_active_skus: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// 原始导入结构 (SKU → 月份 → 条目)
    #[serde(default)]
    pub forecast_import: JsonValue,
}

/// 元数据修改
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionMetaUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// ==========================================
// ForecastVersionStore - 版本存储
// ==========================================
// 无状态; 所有写操作要求调用方持有独占引用
pub struct ForecastVersionStore;

impl Default for ForecastVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastVersionStore {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 容器保障 + 旧数据迁移
    // ==========================================

    /// 幂等保障容器结构
    ///
    /// - versions 为空但 forecast_import 有数据: 合成单一版本并激活 (一次性迁移)
    /// - versions 非空: 排序, 并从激活版本 (失效时取最新) 重建 forecast_import
    ///
    /// # 返回
    /// 是否执行了旧数据迁移
    pub fn ensure_containers(&self, state: &mut ForecastState) -> bool {
        if state.versions.is_empty() {
            if state.forecast_import.is_empty() {
                return false;
            }

            let created_at = state.last_import_at.unwrap_or_else(Utc::now);
            let forecast_import = state.forecast_import.clone();
            let version = ForecastVersion {
                id: Uuid::new_v4().to_string(),
                name: format!("Import {}", created_at.format("%Y-%m-%d %H:%M")),
                note: String::new(),
                created_at,
                source_label: state
                    .import_source
                    .clone()
                    .unwrap_or_else(|| "legacy".to_string()),
                import_mode: ImportMode::Unset,
                only_active_skus: false,
                stats: ForecastVersionStats::from_map(&forecast_import),
                forecast_import,
            };

            tracing::info!(
                version_id = %version.id,
                rows = version.stats.row_count,
                "旧版 forecast_import 已迁移为版本"
            );
            state.active_version_id = Some(version.id.clone());
            state.versions.push(version);
            return true;
        }

        sort_versions(&mut state.versions);
        self.sync_active_mirror(state);
        false
    }

    // ==========================================
    // 版本写操作
    // ==========================================

    /// 追加新版本 (不改变激活指针)
    pub fn append_version(
        &self,
        state: &mut ForecastState,
        input: NewForecastVersion,
    ) -> ForecastVersion {
        let forecast_import = normalize_forecast_import(&input.forecast_import);
        let created_at = input.created_at.unwrap_or_else(Utc::now);
        let name = match input.name.trim() {
            "" => format!("Forecast {}", created_at.format("%Y-%m-%d %H:%M")),
            name => name.to_string(),
        };

        // 调用方给定的 ID 已被占用时改用新 UUID, 保证 ID 唯一
        let id = match input.id.filter(|id| !id.trim().is_empty()) {
            Some(id) if state.find_version(&id).is_some() => {
                let fresh = Uuid::new_v4().to_string();
                tracing::warn!(requested_id = %id, assigned_id = %fresh, "版本ID已存在, 重新分配");
                fresh
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };

        let version = ForecastVersion {
            id,
            name,
            note: input.note,
            created_at,
            source_label: input.source_label,
            import_mode: input.import_mode,
            only_active_skus: input.only_active_skus,
            stats: ForecastVersionStats::from_map(&forecast_import),
            forecast_import,
        };

        tracing::debug!(
            version_id = %version.id,
            skus = version.stats.sku_count,
            months = version.stats.month_count,
            "追加预测版本"
        );

        state.versions.push(version.clone());
        sort_versions(&mut state.versions);
        self.refresh_mirror_without_pointer(state);
        version
    }

    /// 修改版本名称/备注
    ///
    /// # 返回
    /// - true: 已修改
    /// - false: 版本不存在
    pub fn rename_version(
        &self,
        state: &mut ForecastState,
        version_id: &str,
        update: VersionMetaUpdate,
    ) -> bool {
        let Some(version) = state.versions.iter_mut().find(|v| v.id == version_id) else {
            return false;
        };

        if let Some(name) = update.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            version.name = name;
        }
        if let Some(note) = update.note {
            version.note = note;
        }
        true
    }

    /// 删除非激活版本
    ///
    /// 同时删除该版本的冲突决定; 若 last_impact_summary 引用该版本则清空
    pub fn delete_version(
        &self,
        state: &mut ForecastState,
        version_id: &str,
    ) -> Result<ForecastVersion, VersionStoreError> {
        if state.active_version().map(|v| v.id.as_str()) == Some(version_id) {
            return Err(VersionStoreError::ActiveVersion);
        }

        let index = state
            .versions
            .iter()
            .position(|v| v.id == version_id)
            .ok_or(VersionStoreError::NotFound)?;

        let removed = state.versions.remove(index);
        state.fo_conflict_decisions_by_version.remove(version_id);
        if state
            .last_impact_summary
            .as_ref()
            .is_some_and(|summary| summary.references_version(version_id))
        {
            state.last_impact_summary = None;
        }

        tracing::debug!(version_id, "删除预测版本");
        Ok(removed)
    }

    /// 激活版本
    ///
    /// # 参数
    /// - `touch_import_meta`: 是否同步 last_import_at / import_source
    pub fn set_active_version(
        &self,
        state: &mut ForecastState,
        version_id: &str,
        touch_import_meta: bool,
    ) -> Result<(), VersionStoreError> {
        let version = state
            .find_version(version_id)
            .ok_or(VersionStoreError::NotFound)?;

        let forecast_import = version.forecast_import.clone();
        let created_at = version.created_at;
        let source_label = version.source_label.clone();

        state.active_version_id = Some(version_id.to_string());
        state.forecast_import = forecast_import;
        if touch_import_meta {
            state.last_import_at = Some(created_at);
            state.import_source = Some(source_label);
        }

        tracing::info!(version_id, touch_import_meta, "激活预测版本");
        Ok(())
    }

    /// 记录 FO 冲突处理决定 (按目标版本分桶)
    pub fn record_conflict_decision(
        &self,
        state: &mut ForecastState,
        version_id: &str,
        fo_id: &str,
        decision: ConflictDecisionKind,
        note: Option<String>,
    ) -> Result<(), VersionStoreError> {
        if state.find_version(version_id).is_none() {
            return Err(VersionStoreError::NotFound);
        }

        state
            .fo_conflict_decisions_by_version
            .entry(version_id.to_string())
            .or_default()
            .insert(
                fo_id.to_string(),
                FoConflictDecision {
                    fo_id: fo_id.to_string(),
                    decision,
                    decided_at: Utc::now(),
                    note,
                },
            );
        Ok(())
    }

    /// 激活指针缺失或失效时, 镜像跟随最新版本 (指针保持不变)
    fn refresh_mirror_without_pointer(&self, state: &mut ForecastState) {
        let pointer_resolves = state
            .active_version_id
            .as_deref()
            .is_some_and(|id| state.find_version(id).is_some());
        if pointer_resolves {
            return;
        }
        if let Some(forecast_import) = state.active_version().map(|v| v.forecast_import.clone()) {
            state.forecast_import = forecast_import;
        }
    }

    /// 以激活版本 (失效时取最新) 重建镜像
    fn sync_active_mirror(&self, state: &mut ForecastState) {
        let Some(active) = state.active_version() else {
            return;
        };
        let active_id = active.id.clone();
        let forecast_import = active.forecast_import.clone();

        if state.active_version_id.as_deref() != Some(active_id.as_str()) {
            tracing::debug!(active_id = %active_id, "激活版本ID失效, 回退到最新版本");
        }
        state.active_version_id = Some(active_id);
        state.forecast_import = forecast_import;
    }
}

fn sort_versions(versions: &mut [ForecastVersion]) {
    // 稳定排序: 同一时间戳保持追加顺序
    versions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
}

// ==========================================
// 归一化 (尽力过滤, 不告警)
// ==========================================

/// 归一化原始导入结构
///
/// 只接受 SKU → 月份 → 条目; 条目可以是数值、字符串
/// 或 `{units, revenueEur, profitEur}` 对象 (各字段独立解析)
pub fn normalize_forecast_import(raw: &JsonValue) -> ForecastMap {
    let mut result = ForecastMap::new();
    let Some(skus) = raw.as_object() else {
        return result;
    };

    for (raw_sku, raw_months) in skus {
        let sku = raw_sku.trim();
        let Some(months) = raw_months.as_object() else {
            continue;
        };
        if sku.is_empty() {
            continue;
        }

        let normalized: BTreeMap<String, ForecastEntry> = months
            .iter()
            .filter_map(|(raw_month, raw_entry)| {
                let month = normalize_month_key(raw_month).filter(|m| is_month_key(m))?;
                let entry = normalize_forecast_entry(raw_entry)?;
                Some((month, entry))
            })
            .collect();

        if !normalized.is_empty() {
            result.entry(sku.to_string()).or_default().extend(normalized);
        }
    }

    result
}

/// 归一化单个条目; 三个字段均缺失时丢弃
pub fn normalize_forecast_entry(raw: &JsonValue) -> Option<ForecastEntry> {
    let entry = match raw {
        JsonValue::Object(fields) => {
            let field = |names: &[&str]| {
                names
                    .iter()
                    .find_map(|name| fields.get(*name))
                    .and_then(parse_de_value)
            };
            ForecastEntry {
                units: field(&["units", "unitsTotal"]),
                revenue_eur: field(&["revenueEur", "revenue_eur"]),
                profit_eur: field(&["profitEur", "profit_eur"]),
            }
        }
        other => ForecastEntry {
            units: parse_de_value(other),
            ..ForecastEntry::default()
        },
    };

    (!entry.is_empty()).then_some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::impact::ImpactSummary;
    use chrono::TimeZone;
    use serde_json::json;

    // ==========================================
    // 测试数据准备
    // ==========================================

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap()
    }

    fn new_version(id: &str, day: u32, units: f64) -> NewForecastVersion {
        NewForecastVersion {
            id: Some(id.to_string()),
            name: format!("Version {}", id),
            source_label: "csv".to_string(),
            import_mode: ImportMode::Overwrite,
            created_at: Some(ts(day)),
            forecast_import: json!({ "SKU-1": { "2025-04": { "units": units } } }),
            ..Default::default()
        }
    }

    fn units_of(map: &ForecastMap, sku: &str, month: &str) -> Option<f64> {
        map.get(sku)?.get(month)?.units
    }

    // ==========================================
    // 归一化
    // ==========================================

    #[test]
    fn test_normalize_drops_invalid_silently() {
        let raw = json!({
            "SKU-1": {
                "2025-04": { "units": "1.200,5", "revenueEur": "9.999,00" },
                "2025-5": 80,
                "Mai 2025": 10,
                "2025-06": { "comment": "n/a" }
            },
            "SKU-2": "not-a-map",
            "  ": { "2025-04": 1 },
            "SKU-3": { "junk": 5 }
        });

        let map = normalize_forecast_import(&raw);
        assert_eq!(map.len(), 1);
        let months = map.get("SKU-1").unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months["2025-04"].units, Some(1200.5));
        assert_eq!(months["2025-04"].revenue_eur, Some(9999.0));
        assert_eq!(months["2025-04"].profit_eur, None);
        assert_eq!(months["2025-05"].units, Some(80.0));
    }

    #[test]
    fn test_normalize_non_object_is_empty() {
        assert!(normalize_forecast_import(&json!([1, 2, 3])).is_empty());
        assert!(normalize_forecast_import(&JsonValue::Null).is_empty());
    }

    // ==========================================
    // 容器 / 迁移
    // ==========================================

    #[test]
    fn test_legacy_migration() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        state.forecast_import = normalize_forecast_import(&json!({
            "SKU-1": { "2025-04": 100, "2025-05": 120 }
        }));
        state.last_import_at = Some(ts(1));

        assert!(store.ensure_containers(&mut state));
        assert_eq!(state.versions.len(), 1);
        assert_eq!(state.versions[0].forecast_import, state.forecast_import);
        assert_eq!(state.versions[0].created_at, ts(1));
        assert_eq!(state.versions[0].stats.row_count, 2);
        assert_eq!(
            state.active_version_id.as_deref(),
            Some(state.versions[0].id.as_str())
        );

        // 幂等
        assert!(!store.ensure_containers(&mut state));
        assert_eq!(state.versions.len(), 1);
    }

    #[test]
    fn test_empty_state_stays_empty() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        assert!(!store.ensure_containers(&mut state));
        assert!(state.versions.is_empty());
        assert!(state.active_version_id.is_none());
    }

    #[test]
    fn test_stale_active_id_falls_back_to_latest() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        store.append_version(&mut state, new_version("v2", 5, 200.0));
        store.append_version(&mut state, new_version("v1", 2, 100.0));
        state.active_version_id = Some("gone".to_string());

        store.ensure_containers(&mut state);
        assert_eq!(state.versions[0].id, "v1");
        assert_eq!(state.active_version_id.as_deref(), Some("v2"));
        assert_eq!(units_of(&state.forecast_import, "SKU-1", "2025-04"), Some(200.0));
    }

    // ==========================================
    // 写操作
    // ==========================================

    #[test]
    fn test_append_keeps_active_pointer() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        store.append_version(&mut state, new_version("v1", 1, 100.0));
        store.set_active_version(&mut state, "v1", true).unwrap();

        let appended = store.append_version(&mut state, new_version("v2", 2, 150.0));
        assert_eq!(appended.stats.sku_count, 1);
        assert_eq!(state.active_version_id.as_deref(), Some("v1"));
        assert_eq!(units_of(&state.forecast_import, "SKU-1", "2025-04"), Some(100.0));
    }

    #[test]
    fn test_append_without_active_pointer_refreshes_mirror() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();

        store.append_version(&mut state, new_version("v1", 1, 300.0));
        assert!(state.active_version_id.is_none());
        assert_eq!(
            Some(&state.forecast_import),
            state.active_version().map(|v| &v.forecast_import)
        );
        assert_eq!(units_of(&state.forecast_import, "SKU-1", "2025-04"), Some(300.0));

        // 失效指针: 镜像跟随最新版本, 指针本身不动
        state.active_version_id = Some("gone".to_string());
        store.append_version(&mut state, new_version("v2", 2, 450.0));
        assert_eq!(state.active_version_id.as_deref(), Some("gone"));
        assert_eq!(units_of(&state.forecast_import, "SKU-1", "2025-04"), Some(450.0));
    }

    #[test]
    fn test_append_duplicate_id_gets_fresh_id() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        let first = store.append_version(&mut state, new_version("v1", 1, 100.0));
        let second = store.append_version(&mut state, new_version("v1", 2, 150.0));

        assert_eq!(first.id, "v1");
        assert_ne!(second.id, "v1");
        assert_eq!(state.versions.iter().filter(|v| v.id == "v1").count(), 1);

        // 两个版本都可独立寻址
        store.set_active_version(&mut state, &second.id, false).unwrap();
        assert_eq!(units_of(&state.forecast_import, "SKU-1", "2025-04"), Some(150.0));
        store.delete_version(&mut state, "v1").unwrap();
        assert_eq!(state.versions.len(), 1);
        assert_eq!(state.versions[0].id, second.id);
    }

    #[test]
    fn test_set_active_round_trip() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        store.append_version(&mut state, new_version("v1", 1, 100.0));
        store.append_version(&mut state, new_version("v2", 2, 150.0));

        store.set_active_version(&mut state, "v2", true).unwrap();
        assert_eq!(state.forecast_import, state.versions[1].forecast_import);
        assert_eq!(state.last_import_at, Some(ts(2)));
        assert_eq!(state.import_source.as_deref(), Some("csv"));

        store.set_active_version(&mut state, "v1", false).unwrap();
        assert_eq!(state.forecast_import, state.versions[0].forecast_import);
        assert_eq!(state.last_import_at, Some(ts(2)));

        assert_eq!(
            store.set_active_version(&mut state, "missing", true),
            Err(VersionStoreError::NotFound)
        );
    }

    #[test]
    fn test_delete_rules() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        store.append_version(&mut state, new_version("v1", 1, 100.0));
        store.append_version(&mut state, new_version("v2", 2, 150.0));
        store.set_active_version(&mut state, "v2", true).unwrap();
        store
            .record_conflict_decision(&mut state, "v1", "FO-1", ConflictDecisionKind::Ignored, None)
            .unwrap();
        state.last_impact_summary = Some(ImpactSummary {
            from_version_id: Some("v1".to_string()),
            to_version_id: Some("v2".to_string()),
            ..Default::default()
        });

        let err = store.delete_version(&mut state, "v2").unwrap_err();
        assert_eq!(err.code(), "ACTIVE_VERSION");
        assert_eq!(
            store.delete_version(&mut state, "nope").unwrap_err().code(),
            "NOT_FOUND"
        );

        let removed = store.delete_version(&mut state, "v1").unwrap();
        assert_eq!(removed.id, "v1");
        assert_eq!(state.versions.len(), 1);
        assert_eq!(state.active_version_id.as_deref(), Some("v2"));
        assert!(!state.fo_conflict_decisions_by_version.contains_key("v1"));
        assert!(state.last_impact_summary.is_none());
    }

    #[test]
    fn test_rename_version() {
        let store = ForecastVersionStore::new();
        let mut state = ForecastState::default();
        store.append_version(&mut state, new_version("v1", 1, 100.0));

        assert!(store.rename_version(
            &mut state,
            "v1",
            VersionMetaUpdate {
                name: Some("  Q2 Baseline ".to_string()),
                note: Some("after promo".to_string()),
            }
        ));
        assert_eq!(state.versions[0].name, "Q2 Baseline");
        assert_eq!(state.versions[0].note, "after promo");

        assert!(!store.rename_version(&mut state, "v9", VersionMetaUpdate::default()));
    }
}
