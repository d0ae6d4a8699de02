// ==========================================
// 预测版本管理集成测试
// ==========================================
// 职责: 经 PlanningApi 验证版本导入/激活/删除/改名与旧数据迁移
// ==========================================


use std::collections::BTreeMap;
use supply_planner::domain::forecast::{ForecastEntry, ForecastMap};
use supply_planner::domain::state::PlanningState;
use supply_planner::domain::types::ConflictDecisionKind;
use supply_planner::engine::VersionMetaUpdate;
use test_helpers::*;

fn legacy_forecast() -> ForecastMap {
    let mut months = BTreeMap::new();
    months.insert("2025-04".to_string(), ForecastEntry::from_units(120.0));
    months.insert("2025-05".to_string(), ForecastEntry::from_units(80.0));
    let mut map = ForecastMap::new();
    map.insert(SKU.to_string(), months);
    map
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_legacy_forecast_migrated_on_load() {
    let mut state = PlanningState::default();
    state.forecast.forecast_import = legacy_forecast();
    state.forecast.last_import_at = Some(timestamp(2025, 3, 1));
    state.forecast.import_source = Some("legacy.csv".to_string());

    let (_repo, api) = create_test_api(state);
    let snapshot = api.state_snapshot().unwrap();

    assert_eq!(snapshot.forecast.versions.len(), 1);
    let version = &snapshot.forecast.versions[0];
    assert_eq!(snapshot.forecast.active_version_id.as_deref(), Some(version.id.as_str()));
    assert_eq!(version.source_label, "legacy.csv");
    assert_eq!(version.created_at, timestamp(2025, 3, 1));
    assert_eq!(version.stats.row_count, 2);
    assert_eq!(version.forecast_import, legacy_forecast());
}

#[test]
fn test_import_and_activate_keeps_mirror_in_sync() {
    let (_repo, api) = create_test_api(base_state(400.0));

    let v1 = api
        .import_forecast_version(version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0)]), true)
        .unwrap();
    api.import_forecast_version(version_input("v2", timestamp(2025, 3, 5), &[("2025-04", 450.0)]), false)
        .unwrap();

    // 未激活导入不改变镜像
    let state = api.state_snapshot().unwrap();
    assert_eq!(state.forecast.active_version_id.as_deref(), Some("v1"));
    assert_eq!(state.forecast.forecast_import, v1.forecast_import);
    assert_eq!(state.forecast.versions.len(), 2);

    api.activate_forecast_version("v2").unwrap();
    let state = api.state_snapshot().unwrap();
    assert_eq!(state.forecast.active_version_id.as_deref(), Some("v2"));
    assert_eq!(state.forecast.forecast_import[SKU]["2025-04"].units, Some(450.0));
    assert_eq!(state.forecast.last_import_at, Some(timestamp(2025, 3, 5)));
    assert_eq!(state.forecast.import_source.as_deref(), Some("test.xlsx"));
}

#[test]
fn test_delete_rules() {
    let (_repo, api) = create_test_api(base_state(400.0));
    api.import_forecast_version(version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0)]), true)
        .unwrap();
    api.import_forecast_version(version_input("v2", timestamp(2025, 3, 5), &[("2025-04", 450.0)]), false)
        .unwrap();
    api.record_conflict_decision("v1", "fo-1", ConflictDecisionKind::Ignored, None)
        .unwrap();

    // 激活版本不可删除
    let err = api.delete_forecast_version("v1").unwrap_err();
    assert_eq!(err.reason_code(), "ACTIVE_VERSION");

    let err = api.delete_forecast_version("missing").unwrap_err();
    assert_eq!(err.reason_code(), "NOT_FOUND");

    api.activate_forecast_version("v2").unwrap();
    let removed = api.delete_forecast_version("v1").unwrap();
    assert_eq!(removed.id, "v1");

    let state = api.state_snapshot().unwrap();
    assert_eq!(state.forecast.versions.len(), 1);
    assert!(!state.forecast.fo_conflict_decisions_by_version.contains_key("v1"));
}

#[test]
fn test_rename_version() {
    let (_repo, api) = create_test_api(base_state(400.0));
    api.import_forecast_version(version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0)]), true)
        .unwrap();

    let changed = api
        .rename_forecast_version(
            "v1",
            VersionMetaUpdate {
                name: Some("  Q2 Plan  ".to_string()),
                note: Some("reviewed".to_string()),
            },
        )
        .unwrap();
    assert!(changed);

    // 空名称不覆盖
    api.rename_forecast_version(
        "v1",
        VersionMetaUpdate {
            name: Some("   ".to_string()),
            note: None,
        },
    )
    .unwrap();

    let state = api.state_snapshot().unwrap();
    let version = state.forecast.find_version("v1").unwrap();
    assert_eq!(version.name, "Q2 Plan");
    assert_eq!(version.note, "reviewed");

    assert!(!api
        .rename_forecast_version("missing", VersionMetaUpdate::default())
        .unwrap());
}

#[test]
fn test_conflict_decision_requires_known_version() {
    let (_repo, api) = create_test_api(base_state(400.0));

    let err = api
        .record_conflict_decision("missing", "fo-1", ConflictDecisionKind::Adjusted, None)
        .unwrap_err();
    assert_eq!(err.reason_code(), "NOT_FOUND");
}

#[test]
fn test_import_normalizes_raw_entries() {
    let (_repo, api) = create_test_api(base_state(400.0));

    let mut input = version_input("v1", timestamp(2025, 3, 1), &[]);
    input.forecast_import = serde_json::json!({
        "SKU-1": {
            "2025-04": "1.200,5",
            "2025-05": { "units": 80, "revenueEur": "1.000,00" },
            "not-a-month": 10,
            "2025-06": "n/a"
        },
        "  ": { "2025-04": 5 },
        "SKU-2": "garbage"
    });

    let version = api.import_forecast_version(input, true).unwrap();
    let entries = &version.forecast_import[SKU];

    assert_eq!(version.stats.sku_count, 1);
    assert_eq!(version.stats.row_count, 2);
    assert_eq!(entries["2025-04"].units, Some(1200.5));
    assert_eq!(entries["2025-05"].units, Some(80.0));
    assert_eq!(entries["2025-05"].revenue_eur, Some(1000.0));
}
