// ==========================================
// 供应链补货规划系统 - 命令行入口
// ==========================================
// 开发工具: 读取状态文件, 输出当月 PO 到货任务与预测影响汇总
//
// 用法:
//   supply-planner [state_path] [month] [today]
//   today 为 ISO 日期 (YYYY-MM-DD), 缺省为本地当天
//   PLANNER_LOG_FORMAT=json 输出 JSON 日志
//
// 不修改状态文件
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use supply_planner::api::{ImpactAnalysisRequest, PlanningApi};
use supply_planner::common::{current_month_key, parse_iso_date};
use supply_planner::config::ConfigManager;
use supply_planner::repository::JsonFileStateRepository;

fn main() -> anyhow::Result<()> {
    // PLANNER_LOG_FORMAT=json → 结构化日志
    match std::env::var("PLANNER_LOG_FORMAT") {
        Ok(format) if format.eq_ignore_ascii_case("json") => supply_planner::logging::init_json(),
        _ => supply_planner::logging::init(),
    }

    let mut args = std::env::args().skip(1);
    let state_path = args
        .next()
        .unwrap_or_else(|| "planner_state.json".to_string());
    let month_arg = args.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let today = match args.next() {
        Some(raw) => parse_iso_date(&raw).context("解析 today 参数失败")?,
        None => Local::now().date_naive(),
    };
    let month = month_arg.unwrap_or_else(|| current_month_key(today));

    tracing::info!("{} {}", supply_planner::APP_NAME, supply_planner::VERSION);
    tracing::info!(state_path = %state_path, month = %month, today = %today, "加载规划状态");

    let config = ConfigManager::load_default().context("加载配置失败")?;
    let repo = Arc::new(JsonFileStateRepository::new(&state_path));
    let api = PlanningApi::new(repo)
        .and_then(|api| api.with_config(&config))
        .context("初始化规划 API 失败")?;

    let tasks = api.arrival_tasks(&month, Some(today))?;
    println!("{}", serde_json::to_string_pretty(&tasks)?);

    let impact = api.analyze_forecast_impact(&ImpactAnalysisRequest {
        now_month: Some(month),
        today: Some(today),
        ..Default::default()
    })?;
    println!("{}", serde_json::to_string_pretty(&impact.summary)?);

    Ok(())
}
