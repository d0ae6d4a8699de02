// ==========================================
// PlanningApi 集成测试
// ==========================================
// 职责: 验证 API 层串联 (建议 / 影响分析回写 / 到货任务 / 配置 / 持久化)
// ==========================================


use std::collections::BTreeMap;
use std::sync::Arc;
use supply_planner::api::{FoSuggestionRequest, ImpactAnalysisRequest, PlanningApi};
use supply_planner::config::{config_keys, ConfigManager};
use supply_planner::domain::product::Product;
use supply_planner::domain::settings::PlanningSettings;
use supply_planner::domain::state::PlanningState;
use supply_planner::domain::types::{AbcClass, SuggestionStatus};
use supply_planner::engine::{FoRecommendation, FoRecommendationContext, FoRecommender};
use supply_planner::repository::{JsonFileStateRepository, PlanningStateRepository};
use test_helpers::*;

fn with_snapshots(mut state: PlanningState) -> PlanningState {
    let months = state.inventory_snapshots.entry(SKU.to_string()).or_default();
    months.insert("2025-04".to_string(), 100.0);
    months.insert("2025-05".to_string(), 50.0);
    state
}

fn suggestion_request() -> FoSuggestionRequest {
    FoSuggestionRequest {
        sku: SKU.to_string(),
        today: Some(date(2025, 4, 25)),
        operational_coverage_days: Some(15),
        eta_override: Some(date(2025, 4, 30)),
    }
}

// ==========================================
// FO 建议
// ==========================================

#[test]
fn test_suggest_fo_uses_active_forecast() {
    let (_repo, api) = create_test_api(with_snapshots(base_state(400.0)));
    api.import_forecast_version(
        version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0), ("2025-05", 310.0)]),
        true,
    )
    .unwrap();

    let suggestion = api.suggest_fo(&suggestion_request()).unwrap();

    // 需求 150, ETA 库存 110 → 40
    assert_eq!(suggestion.eta_date, date(2025, 4, 30));
    assert_eq!(suggestion.suggested_units, 40.0);
    assert_eq!(suggestion.status, SuggestionStatus::Ok);
    assert!(suggestion.warnings.is_empty());
}

#[test]
fn test_suggest_fo_after_import_without_activation() {
    // 新状态无激活指针: 最新版本即有效预测
    let (_repo, api) = create_test_api(with_snapshots(base_state(400.0)));
    api.import_forecast_version(
        version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0), ("2025-05", 310.0)]),
        false,
    )
    .unwrap();

    let state = api.state_snapshot().unwrap();
    assert!(state.forecast.active_version_id.is_none());
    assert_eq!(state.forecast.forecast_import[SKU]["2025-04"].units, Some(300.0));

    let suggestion = api.suggest_fo(&suggestion_request()).unwrap();
    assert_eq!(suggestion.status, SuggestionStatus::Ok);
    assert_eq!(suggestion.suggested_units, 40.0);
}

#[test]
fn test_import_duplicate_version_id() {
    let (_repo, api) = create_test_api(base_state(400.0));
    api.import_forecast_version(version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0)]), true)
        .unwrap();
    let second = api
        .import_forecast_version(version_input("v1", timestamp(2025, 3, 2), &[("2025-04", 320.0)]), false)
        .unwrap();

    assert_ne!(second.id, "v1");
    let state = api.state_snapshot().unwrap();
    assert_eq!(state.forecast.versions.iter().filter(|v| v.id == "v1").count(), 1);
    api.activate_forecast_version(&second.id).unwrap();
    api.delete_forecast_version("v1").unwrap();
}

#[test]
fn test_suggest_fo_rejects_empty_sku() {
    let (_repo, api) = create_test_api(base_state(400.0));

    let err = api
        .suggest_fo(&FoSuggestionRequest {
            sku: "  ".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.reason_code(), "INVALID_INPUT");
}

// ==========================================
// 影响分析
// ==========================================

#[test]
fn test_impact_analysis_defaults_and_summary_writeback() {
    let mut state = base_state(400.0);
    state.fos.push(open_fo("fo-1", 100.0, date(2025, 6, 15)));
    let (_repo, api) = create_test_api(state);

    api.import_forecast_version(
        version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 200.0), ("2025-05", 200.0)]),
        true,
    )
    .unwrap();
    api.import_forecast_version(
        version_input("v2", timestamp(2025, 3, 20), &[("2025-04", 300.0), ("2025-05", 310.0)]),
        true,
    )
    .unwrap();

    // 缺省: to = 激活版本, from = 前一版本
    let result = api
        .analyze_forecast_impact(&ImpactAnalysisRequest {
            now_month: Some("2025-04".to_string()),
            today: Some(date(2025, 4, 10)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(result.summary.from_version_id.as_deref(), Some("v1"));
    assert_eq!(result.summary.to_version_id.as_deref(), Some("v2"));
    assert!(result.summary.computed_at.is_some());
    assert_eq!(result.summary.fo_conflicts_total, 1);

    let stored = api.state_snapshot().unwrap().forecast.last_impact_summary;
    assert_eq!(stored, Some(result.summary.clone()));

    // 删除被汇总引用的版本 → 汇总清空
    api.delete_forecast_version("v1").unwrap();
    assert_eq!(api.state_snapshot().unwrap().forecast.last_impact_summary, None);
}

/// 总是不可计算的推荐器
struct NotComputableRecommender;

impl FoRecommender for NotComputableRecommender {
    fn compute_fo_recommendation_for_sku(
        &self,
        _context: &FoRecommendationContext<'_>,
        _sku: &str,
        _lead_time_days: i64,
        _product: Option<&Product>,
        _settings: &PlanningSettings,
        _horizon_months: u32,
    ) -> FoRecommendation {
        FoRecommendation::not_computable()
    }
}

fn import_two_versions(api: &PlanningApi) {
    api.import_forecast_version(
        version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 200.0), ("2025-05", 200.0)]),
        true,
    )
    .unwrap();
    api.import_forecast_version(
        version_input("v2", timestamp(2025, 3, 20), &[("2025-04", 300.0), ("2025-05", 310.0)]),
        true,
    )
    .unwrap();
}

#[test]
fn test_config_keeps_injected_recommender() {
    let mut state = base_state(400.0);
    state.fos.push(open_fo("fo-1", 100.0, date(2025, 6, 15)));
    let (_repo, api) = create_test_api(state);
    let api = api
        .with_recommender(Box::new(NotComputableRecommender))
        .with_config(&ConfigManager::from_map(BTreeMap::new()))
        .unwrap();
    import_two_versions(&api);

    // 注入的推荐器不可计算 → 无冲突行
    let result = api
        .analyze_forecast_impact(&ImpactAnalysisRequest {
            now_month: Some("2025-04".to_string()),
            today: Some(date(2025, 4, 10)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(result.summary.fo_conflicts_total, 0);
    assert!(result.fo_conflicts.is_empty());
}

#[test]
fn test_default_abc_window_follows_request_date() {
    supply_planner::logging::init_test();
    let repo = Arc::new(supply_planner::repository::InMemoryStateRepository::new(base_state(400.0)));
    let api = PlanningApi::new(repo).unwrap();
    import_two_versions(&api);

    // 2025 年的预测营收只落在以请求日期起算的窗口内
    let result = api
        .analyze_forecast_impact(&ImpactAnalysisRequest {
            now_month: Some("2025-04".to_string()),
            today: Some(date(2025, 4, 10)),
            ..Default::default()
        })
        .unwrap();
    let row = result.sku_rows.iter().find(|row| row.sku == SKU).unwrap();
    assert_eq!(row.abc_class, AbcClass::A);

    let later = api
        .analyze_forecast_impact(&ImpactAnalysisRequest {
            now_month: Some("2025-04".to_string()),
            today: Some(date(2027, 1, 10)),
            ..Default::default()
        })
        .unwrap();
    let row = later.sku_rows.iter().find(|row| row.sku == SKU).unwrap();
    assert_eq!(row.abc_class, AbcClass::C);
}

#[test]
fn test_impact_analysis_unknown_version() {
    let (_repo, api) = create_test_api(base_state(400.0));

    let err = api
        .analyze_forecast_impact(&ImpactAnalysisRequest {
            to_version_id: Some("missing".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.reason_code(), "NOT_FOUND");
}

// ==========================================
// 到货任务
// ==========================================

#[test]
fn test_arrival_tasks_for_month() {
    let mut state = base_state(400.0);
    state.pos.push(po("po-a", date(2025, 4, 20), 120.0, None));
    state.pos.push(po("po-b", date(2025, 3, 28), 80.0, None));
    state.pos.push(po("po-c", date(2025, 4, 5), 60.0, Some(date(2025, 4, 6))));
    state.pos.push(po("po-d", date(2025, 5, 10), 40.0, None));
    let (_repo, api) = create_test_api(state);

    let tasks = api.arrival_tasks("2025-04", Some(date(2025, 4, 10))).unwrap();
    let numbers: Vec<&str> = tasks.iter().map(|t| t.po_number.as_str()).collect();

    // 未到货优先, 再按是否本月, 再按 ETA
    assert_eq!(numbers, vec!["PO-A", "PO-B", "PO-C"]);
    assert!(tasks[1].is_overdue);
    assert!(!tasks[1].month_relevant);
    assert!(!tasks[2].pending);
    assert_eq!(tasks[0].supplier, "Porzellan GmbH");
    assert_eq!(tasks[0].sku_aliases, vec!["Teapot".to_string()]);
    assert_eq!(tasks[0].units, 120.0);

    let err = api.arrival_tasks("2025-13", None).unwrap_err();
    assert_eq!(err.reason_code(), "INVALID_INPUT");
}

// ==========================================
// 配置
// ==========================================

#[test]
fn test_config_applies_settings_and_locale() {
    let mut values = BTreeMap::new();
    values.insert(config_keys::SAFETY_STOCK_DAYS.to_string(), "20".to_string());
    values.insert(config_keys::WARNING_LOCALE.to_string(), "de".to_string());
    let config = ConfigManager::from_map(values);

    let (_repo, api) = create_test_api(with_snapshots(base_state(400.0)));
    let api = api.with_config(&config).unwrap();

    let settings = api.state_snapshot().unwrap().settings;
    assert_eq!(settings.policy_defaults.safety_stock_days_total_de, 20.0);
    assert_eq!(settings.policy_defaults.lead_time_days_total, 75);

    // 无预测 → 德文告警
    let suggestion = api.suggest_fo(&suggestion_request()).unwrap();
    assert_eq!(suggestion.status, SuggestionStatus::InsufficientForecast);
    assert!(suggestion.warnings.iter().any(|w| w.contains("Prognose fehlt")));
}

#[test]
fn test_invalid_config_value() {
    let mut values = BTreeMap::new();
    values.insert(config_keys::MOQ_UNITS.to_string(), "viele".to_string());
    let config = ConfigManager::from_map(values);

    let (_repo, api) = create_test_api(base_state(400.0));
    let err = api.with_config(&config).err().unwrap();
    assert_eq!(err.reason_code(), "CONFIG");
}

// ==========================================
// 持久化
// ==========================================

#[test]
fn test_persist_and_reload_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner").join("state.json");

    let repo = Arc::new(JsonFileStateRepository::new(&path));
    let api = PlanningApi::new(repo.clone()).unwrap();
    api.update_state(|state| *state = base_state(400.0)).unwrap();
    api.import_forecast_version(version_input("v1", timestamp(2025, 3, 1), &[("2025-04", 300.0)]), true)
        .unwrap();
    api.persist().unwrap();

    let reloaded = repo.load().unwrap();
    assert_eq!(reloaded.products.len(), 1);
    assert_eq!(reloaded.forecast.active_version_id.as_deref(), Some("v1"));

    let api = PlanningApi::new(Arc::new(JsonFileStateRepository::new(&path))).unwrap();
    let state = api.state_snapshot().unwrap();
    assert_eq!(state.forecast.versions.len(), 1);
    assert_eq!(state.forecast.forecast_import[SKU]["2025-04"].units, Some(300.0));
}
