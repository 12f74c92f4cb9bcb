// ==========================================
// 充装站 / 价格规则 API 测试
// ==========================================

mod test_helpers;

use cylinder_refill::api::{ApiError, StationInput};
use cylinder_refill::{CylinderSize, GasType};
use test_helpers::{create_station_v, create_test_state, rule};

#[test]
fn test_station_crud_and_cascade() {
    let (_temp, state) = create_test_state().unwrap();
    let station = create_station_v(&state).unwrap();

    assert_eq!(state.station_api.list_rules(&station.station_id).unwrap().len(), 2);

    let updated = state
        .station_api
        .update_station(
            &station.station_id,
            StationInput {
                name: " Vendor V North ".to_string(),
                phone: Some("  ".to_string()),
                ..StationInput::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Vendor V North");
    assert!(updated.phone.is_none());

    state.station_api.delete_station(&station.station_id).unwrap();
    assert!(state.station_api.list_rules(&station.station_id).unwrap().is_empty());
    assert!(matches!(
        state.station_api.get_station(&station.station_id),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_rule_order_controls_resolution() {
    let (_temp, state) = create_test_state().unwrap();
    let station = create_station_v(&state).unwrap();

    // 追加一条更具体的 SKU 规则: 声明在后,同为 SKU 规则时先声明者优先
    let added = state
        .station_api
        .add_rule(
            &station.station_id,
            rule(GasType::Oxygen, CylinderSize::Large, Some("OX"), 45000.0),
        )
        .unwrap();
    assert_eq!(added.seq, 2);

    let rules = state.station_api.list_rules(&station.station_id).unwrap();
    assert_eq!(rules[0].effective_filter(), Some("OXY"));
    assert_eq!(rules[2].rule_id, added.rule_id);

    let updated = state
        .station_api
        .update_rule(
            &added.rule_id,
            rule(GasType::Oxygen, CylinderSize::Large, Some("OX"), 46000.0),
        )
        .unwrap();
    assert_eq!(updated.seq, 2);
    assert_eq!(updated.unit_price, 46000.0);

    state.station_api.delete_rule(&added.rule_id).unwrap();
    assert_eq!(state.station_api.list_rules(&station.station_id).unwrap().len(), 2);
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let (_temp, state) = create_test_state().unwrap();

    assert!(matches!(
        state.station_api.create_station(StationInput::default()),
        Err(ApiError::InvalidInput(_))
    ));

    let station = create_station_v(&state).unwrap();
    assert!(matches!(
        state.station_api.add_rule(
            &station.station_id,
            rule(GasType::Argon, CylinderSize::Small, None, -1.0)
        ),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state.station_api.add_rule(
            "missing",
            rule(GasType::Argon, CylinderSize::Small, None, 1.0)
        ),
        Err(ApiError::NotFound(_))
    ));
}
