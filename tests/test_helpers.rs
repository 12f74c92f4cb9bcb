// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use cylinder_refill::api::{PriceRuleInput, StationInput};
use cylinder_refill::app::AppState;
use cylinder_refill::domain::RefillStation;
use cylinder_refill::{CylinderSize, GasType};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = cylinder_refill::db::open_sqlite_connection(&db_path)?;
    cylinder_refill::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建基于临时数据库的 AppState
pub fn create_test_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    cylinder_refill::logging::init_test();
    let (temp_file, db_path) = create_test_db()?;
    let state = AppState::new(db_path)?;
    Ok((temp_file, state))
}

pub fn rule(
    gas_type: GasType,
    size: CylinderSize,
    sku_filter: Option<&str>,
    unit_price: f64,
) -> PriceRuleInput {
    PriceRuleInput {
        gas_type,
        size,
        sku_filter: sku_filter.map(|s| s.to_string()),
        unit_price,
    }
}

/// 创建充装站 V: {Oxygen/Large/"OXY" 50000, Oxygen/Large/通用 40000}
pub fn create_station_v(state: &AppState) -> Result<RefillStation, Box<dyn Error>> {
    let station = state.station_api.create_station(StationInput {
        name: "Vendor V".to_string(),
        ..StationInput::default()
    })?;
    state.station_api.replace_rules(
        &station.station_id,
        vec![
            rule(GasType::Oxygen, CylinderSize::Large, Some("OXY"), 50000.0),
            rule(GasType::Oxygen, CylinderSize::Large, None, 40000.0),
        ],
    )?;
    Ok(station)
}

/// 通过导入 API 写入气瓶（文本首行为表头）
pub fn import_text(state: &AppState, body: &str) -> Result<Vec<cylinder_refill::Cylinder>, Box<dyn Error>> {
    let text = format!("serialCode,gasType,size,status,lastLocation\n{}", body);
    let preview = state.import_api.preview_text(&text)?;
    let commit = state.import_api.confirm_import(&preview.rows)?;
    Ok(commit.imported)
}

pub fn ids_of(cylinders: &[cylinder_refill::Cylinder]) -> Vec<String> {
    cylinders.iter().map(|c| c.cylinder_id.clone()).collect()
}
