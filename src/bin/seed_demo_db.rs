// Dev utility: reset the database and seed a small refill scenario.
//
// Usage:
//   cargo run --bin seed_demo_db -- [db_path] [cylinders_per_gas]
//
// Seeds two stations with overlapping price rules, imports cylinders through
// the import API, and rents/returns part of them so some are EmptyRefill.

use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::Path;

use cylinder_refill::api::{PriceRuleInput, StationInput};
use cylinder_refill::app::{get_default_db_path, AppState};
use cylinder_refill::{CylinderSize, CylinderStatus, GasType};

const DEFAULT_PER_GAS: usize = 6;

fn main() -> Result<(), Box<dyn Error>> {
    cylinder_refill::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let per_gas = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_PER_GAS)
        .max(2);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    seed_stations(&state)?;
    seed_cylinders(&state, per_gas)?;

    print_quick_counts(&state)?;
    eprintln!("Seeded {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn rule(gas_type: GasType, size: CylinderSize, sku_filter: Option<&str>, unit_price: f64) -> PriceRuleInput {
    PriceRuleInput {
        gas_type,
        size,
        sku_filter: sku_filter.map(|s| s.to_string()),
        unit_price,
    }
}

fn seed_stations(state: &AppState) -> Result<(), Box<dyn Error>> {
    let east = state.station_api.create_station(StationInput {
        name: "East Gas Supply".to_string(),
        address: Some("18 Dockside Rd".to_string()),
        contact_name: Some("R. Tan".to_string()),
        phone: Some("555-0100".to_string()),
    })?;
    state.station_api.replace_rules(
        &east.station_id,
        vec![
            rule(GasType::Oxygen, CylinderSize::Large, Some("OXY"), 50000.0),
            rule(GasType::Oxygen, CylinderSize::Large, None, 40000.0),
            rule(GasType::Argon, CylinderSize::Cubic6, None, 120000.0),
            rule(GasType::Co2, CylinderSize::Medium, None, 35000.0),
        ],
    )?;

    let west = state.station_api.create_station(StationInput {
        name: "West Industrial Gases".to_string(),
        ..StationInput::default()
    })?;
    state.station_api.replace_rules(
        &west.station_id,
        vec![
            rule(GasType::Acetylene, CylinderSize::Small, None, 65000.0),
            rule(GasType::Nitrogen, CylinderSize::Cubic6, Some("N2"), 90000.0),
        ],
    )?;

    Ok(())
}

fn seed_cylinders(state: &AppState, per_gas: usize) -> Result<(), Box<dyn Error>> {
    let kinds = [
        ("OXY", GasType::Oxygen, CylinderSize::Large),
        ("ABC", GasType::Oxygen, CylinderSize::Large),
        ("ARG", GasType::Argon, CylinderSize::Cubic6),
        ("CO2", GasType::Co2, CylinderSize::Medium),
        ("ACE", GasType::Acetylene, CylinderSize::Small),
        ("N2", GasType::Nitrogen, CylinderSize::Cubic6),
    ];

    let mut text = String::from("serialCode,gasType,size,status,lastLocation\n");
    for (prefix, gas, size) in kinds {
        for n in 1..=per_gas {
            text.push_str(&format!("{}-{:03},{},{},,\n", prefix, n, gas, size));
        }
    }

    let preview = state.import_api.preview_text(&text)?;
    let commit = state.import_api.confirm_import(&preview.rows)?;

    // 每种前缀一半出租后空瓶归还,进入待充
    let mut to_cycle = Vec::new();
    for (prefix, _, _) in kinds {
        to_cycle.extend(
            commit
                .imported
                .iter()
                .filter(|c| c.sku_prefix() == prefix)
                .take(per_gas / 2)
                .map(|c| c.cylinder_id.clone()),
        );
    }

    state.cylinder_api.rent("member-demo", &to_cycle)?;
    state.cylinder_api.return_cylinders(&to_cycle, true)?;
    Ok(())
}

fn print_quick_counts(state: &AppState) -> Result<(), Box<dyn Error>> {
    eprintln!("Cylinder counts:");
    for status in CylinderStatus::ALL {
        let count = state
            .cylinder_api
            .status_counts()?
            .into_iter()
            .find(|(s, _)| *s == status)
            .map(|(_, c)| c)
            .unwrap_or(0);
        eprintln!("  {:<14} {}", status.as_db_str(), count);
    }
    Ok(())
}
