// ==========================================
// 气瓶充装调度系统 - 命令行入口
// ==========================================
// 用法:
//   cylinder-refill [status]            台账状态统计 + 充装中概览
//   cylinder-refill import <file>       预览并导入 .csv/.txt/.xlsx
//   cylinder-refill stations            充装站及价格规则
// 数据库路径: CYLINDER_REFILL_DB_PATH 或用户数据目录
// 日志格式: CYLINDER_REFILL_LOG_FORMAT=json 时输出 JSON 行
// ==========================================

use anyhow::{anyhow, Context, Result};
use cylinder_refill::app::{get_default_db_path, AppState};
use cylinder_refill::logging;

fn main() -> Result<()> {
    match std::env::var("CYLINDER_REFILL_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", cylinder_refill::APP_NAME, cylinder_refill::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("status") => print_status(&state),
        Some("import") => {
            let file = args
                .get(1)
                .ok_or_else(|| anyhow!("用法: cylinder-refill import <file>"))?;
            import_file(&state, file)
        }
        Some("stations") => print_stations(&state),
        Some(other) => Err(anyhow!("未知命令: {}（可用: status / import / stations）", other)),
    }
}

fn print_status(state: &AppState) -> Result<()> {
    println!("气瓶状态统计:");
    for (status, count) in state.cylinder_api.status_counts()? {
        println!("  {:<14} {}", status.as_db_str(), count);
    }

    let overview = state.refill_api.refilling_summary()?;
    println!("充装中: {} 只", overview.cylinders.len());
    for line in &overview.lines {
        println!("  {} / {} x {}", line.gas_type, line.size, line.count);
    }
    Ok(())
}

fn import_file(state: &AppState, file: &str) -> Result<()> {
    let preview = state
        .import_api
        .preview_file(file)
        .with_context(|| format!("解析导入文件失败: {}", file))?;

    for row in preview.rows.iter().filter(|r| !r.is_valid()) {
        if let Some(err) = row.error() {
            println!("  第 {} 行: {}", row.row_number, err);
        }
    }

    let commit = state.import_api.confirm_import(&preview.rows)?;
    println!(
        "导入完成: 成功 {} 行, 跳过 {} 行",
        commit.imported.len(),
        commit.skipped
    );
    Ok(())
}

fn print_stations(state: &AppState) -> Result<()> {
    for station in state.station_api.list_stations()? {
        println!("{} ({})", station.name, station.station_id);
        for rule in state.station_api.list_rules(&station.station_id)? {
            println!(
                "  {} / {} [{}] {:.2}",
                rule.gas_type,
                rule.size,
                rule.effective_filter().unwrap_or("通用"),
                rule.unit_price
            );
        }
    }
    Ok(())
}
