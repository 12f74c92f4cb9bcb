use super::queries::ID_CHUNK_SIZE;
use super::{CylinderQuery, CylinderRepository};
use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::{CylinderSize, CylinderStatus, GasType, TransactionKind};
use crate::repository::error::RepositoryError;
use crate::repository::transaction_repo::TransactionRepository;
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_cylinder(id: &str, serial: &str, gas: GasType, status: CylinderStatus) -> Cylinder {
    Cylinder {
        cylinder_id: id.to_string(),
        serial_code: serial.to_string(),
        gas_type: gas,
        size: CylinderSize::Cubic6,
        status,
        holder_id: None,
        last_location: "Main Warehouse".to_string(),
        updated_at: Utc.with_ymd_and_hms(2026, 4, 2, 10, 0, 0).unwrap(),
    }
}

fn seed(repo: &CylinderRepository) {
    repo.insert_many(&[
        make_cylinder("c1", "OXY-2", GasType::Oxygen, CylinderStatus::EmptyRefill),
        make_cylinder("c2", "ABC-1", GasType::Oxygen, CylinderStatus::Available),
        make_cylinder("c3", "ARG-7", GasType::Argon, CylinderStatus::EmptyRefill),
        make_cylinder("c4", "OXY-1", GasType::Oxygen, CylinderStatus::Rented),
    ])
    .unwrap();
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = CylinderRepository::new(setup_test_db());
    let cylinder = make_cylinder("c1", "OXY-1", GasType::Oxygen, CylinderStatus::Available);

    assert_eq!(repo.insert(&cylinder).unwrap(), "c1");
    assert_eq!(repo.find_by_id("c1").unwrap(), Some(cylinder));
    assert_eq!(repo.find_by_id("nope").unwrap(), None);
}

#[test]
fn test_find_by_ids_keeps_request_order() {
    let repo = CylinderRepository::new(setup_test_db());
    seed(&repo);

    let ids = vec!["c3".to_string(), "missing".to_string(), "c1".to_string()];
    let found: Vec<_> = repo
        .find_by_ids(&ids)
        .unwrap()
        .into_iter()
        .map(|c| c.cylinder_id)
        .collect();
    assert_eq!(found, vec!["c3", "c1"]);
    assert!(repo.find_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn test_find_by_ids_beyond_chunk_size() {
    let repo = CylinderRepository::new(setup_test_db());
    let total = ID_CHUNK_SIZE * 2 + 37;
    let cylinders: Vec<Cylinder> = (0..total)
        .map(|i| {
            make_cylinder(
                &format!("c{:05}", i),
                &format!("OXY-{}", i),
                GasType::Oxygen,
                CylinderStatus::Available,
            )
        })
        .collect();
    repo.insert_many(&cylinders).unwrap();

    // 逆序请求 + 夹带不存在的 id,跨越多个分段
    let mut ids: Vec<String> = cylinders.iter().rev().map(|c| c.cylinder_id.clone()).collect();
    ids.insert(ID_CHUNK_SIZE, "missing".to_string());

    let found = repo.find_by_ids(&ids).unwrap();
    assert_eq!(found.len(), total);
    assert_eq!(found.first().unwrap().cylinder_id, cylinders[total - 1].cylinder_id);
    assert_eq!(found.last().unwrap().cylinder_id, "c00000");
    let expected: Vec<&str> = ids
        .iter()
        .filter(|id| id.as_str() != "missing")
        .map(String::as_str)
        .collect();
    let actual: Vec<&str> = found.iter().map(|c| c.cylinder_id.as_str()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_find_by_status_sorted_by_serial() {
    let repo = CylinderRepository::new(setup_test_db());
    seed(&repo);

    let serials: Vec<_> = repo
        .find_by_status(CylinderStatus::EmptyRefill)
        .unwrap()
        .into_iter()
        .map(|c| c.serial_code)
        .collect();
    assert_eq!(serials, vec!["ARG-7", "OXY-2"]);
}

#[test]
fn test_search_with_keyword_and_paging() {
    let repo = CylinderRepository::new(setup_test_db());
    seed(&repo);

    let page = repo
        .search(&CylinderQuery {
            keyword: Some("oxy".to_string()),
            ..CylinderQuery::default()
        })
        .unwrap();
    // "oxy" 命中 OXY-1 / OXY-2 的钢印,以及 ABC-1 的气体种类 Oxygen
    assert_eq!(page.total, 3);
    let serials: Vec<_> = page.items.iter().map(|c| c.serial_code.as_str()).collect();
    assert_eq!(serials, vec!["ABC-1", "OXY-1", "OXY-2"]);

    let page = repo
        .search(&CylinderQuery {
            keyword: Some("oxy".to_string()),
            offset: 1,
            limit: Some(1),
            ..CylinderQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].serial_code, "OXY-1");

    let page = repo
        .search(&CylinderQuery {
            status: Some(CylinderStatus::EmptyRefill),
            keyword: Some("  ".to_string()),
            ..CylinderQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 2);
}

fn search_serials(repo: &CylinderRepository, keyword: &str) -> (usize, Vec<String>) {
    let page = repo
        .search(&CylinderQuery {
            keyword: Some(keyword.to_string()),
            ..CylinderQuery::default()
        })
        .unwrap();
    (page.total, page.items.into_iter().map(|c| c.serial_code).collect())
}

#[test]
fn test_search_keyword_is_literal_substring() {
    let repo = CylinderRepository::new(setup_test_db());
    repo.insert_many(&[
        make_cylinder("c1", "OXY-1", GasType::Oxygen, CylinderStatus::Available),
        make_cylinder("c2", "AR_2", GasType::Argon, CylinderStatus::Available),
        make_cylinder("c3", "N2-2", GasType::Nitrogen, CylinderStatus::Available),
        make_cylinder("c4", "CO2%5", GasType::Co2, CylinderStatus::Available),
    ])
    .unwrap();

    assert_eq!(search_serials(&repo, "_"), (1, vec!["AR_2".to_string()]));
    assert_eq!(search_serials(&repo, "%"), (1, vec!["CO2%5".to_string()]));
    assert_eq!(search_serials(&repo, "2%"), (1, vec!["CO2%5".to_string()]));
    assert_eq!(search_serials(&repo, "r_"), (1, vec!["AR_2".to_string()]));
}

#[test]
fn test_search_keyword_case_folding() {
    let repo = CylinderRepository::new(setup_test_db());
    repo.insert_many(&[
        make_cylinder("c1", "OXY-1", GasType::Oxygen, CylinderStatus::Available),
        make_cylinder("c2", "ÉTA-2", GasType::Argon, CylinderStatus::Available),
    ])
    .unwrap();

    assert_eq!(search_serials(&repo, "oXy-"), (1, vec!["OXY-1".to_string()]));
    assert_eq!(search_serials(&repo, "ARGON"), (1, vec!["ÉTA-2".to_string()]));
    assert_eq!(search_serials(&repo, "É"), (1, vec!["ÉTA-2".to_string()]));
    assert_eq!(search_serials(&repo, "Éta"), (1, vec!["ÉTA-2".to_string()]));
}

#[test]
fn test_update_and_delete_missing_is_not_found() {
    let repo = CylinderRepository::new(setup_test_db());
    let ghost = make_cylinder("ghost", "X-1", GasType::Argon, CylinderStatus::Available);

    assert!(matches!(repo.update(&ghost), Err(RepositoryError::NotFound { .. })));
    assert!(matches!(repo.delete("ghost"), Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_insert_many_rolls_back_on_conflict() {
    let repo = CylinderRepository::new(setup_test_db());
    let a = make_cylinder("c1", "A-1", GasType::Argon, CylinderStatus::Available);
    let dup = make_cylinder("c1", "A-2", GasType::Argon, CylinderStatus::Available);

    assert!(repo.insert_many(&[a, dup]).is_err());
    assert!(repo.find_by_id("c1").unwrap().is_none());
}

#[test]
fn test_commit_batch_writes_cylinders_and_record() {
    let conn = setup_test_db();
    let repo = CylinderRepository::new(conn.clone());
    let transactions = TransactionRepository::new(conn);
    seed(&repo);

    let mut c1 = repo.find_by_id("c1").unwrap().unwrap();
    c1.status = CylinderStatus::Refilling;
    c1.last_location = "East Gas".to_string();

    let record = TransactionRecord {
        transaction_id: "t1".to_string(),
        kind: TransactionKind::RefillDispatch,
        cylinder_ids: vec!["c1".to_string()],
        station_id: Some("s1".to_string()),
        member_id: None,
        occurred_at: Utc.with_ymd_and_hms(2026, 4, 3, 8, 0, 0).unwrap(),
        cost: 50000.0,
        note: None,
    };

    repo.commit_batch(&[c1.clone()], CylinderStatus::EmptyRefill, &record)
        .unwrap();
    assert_eq!(repo.find_by_id("c1").unwrap(), Some(c1));
    assert_eq!(transactions.find_by_id("t1").unwrap(), Some(record));
}

#[test]
fn test_commit_batch_is_atomic() {
    let conn = setup_test_db();
    let repo = CylinderRepository::new(conn.clone());
    let transactions = TransactionRepository::new(conn);
    seed(&repo);

    let mut c1 = repo.find_by_id("c1").unwrap().unwrap();
    c1.status = CylinderStatus::Refilling;
    let ghost = make_cylinder("ghost", "X-1", GasType::Argon, CylinderStatus::Refilling);

    let record = TransactionRecord {
        transaction_id: "t1".to_string(),
        kind: TransactionKind::RefillDispatch,
        cylinder_ids: vec!["c1".to_string(), "ghost".to_string()],
        station_id: None,
        member_id: None,
        occurred_at: Utc::now(),
        cost: 0.0,
        note: None,
    };

    assert!(repo
        .commit_batch(&[c1, ghost], CylinderStatus::EmptyRefill, &record)
        .is_err());
    assert_eq!(
        repo.find_by_id("c1").unwrap().unwrap().status,
        CylinderStatus::EmptyRefill
    );
    assert!(transactions.find_by_id("t1").unwrap().is_none());
}

#[test]
fn test_commit_batch_rejects_stale_source_status() {
    let conn = setup_test_db();
    let repo = CylinderRepository::new(conn.clone());
    let transactions = TransactionRepository::new(conn);
    seed(&repo);

    // 两个批次基于同一快照送充 c1,第二个提交时库内已是 Refilling
    let snapshot = repo.find_by_id("c1").unwrap().unwrap();
    let dispatch_record = |id: &str| TransactionRecord {
        transaction_id: id.to_string(),
        kind: TransactionKind::RefillDispatch,
        cylinder_ids: vec!["c1".to_string()],
        station_id: Some("s1".to_string()),
        member_id: None,
        occurred_at: Utc::now(),
        cost: 50000.0,
        note: None,
    };
    let mut first = snapshot.clone();
    first.status = CylinderStatus::Refilling;
    first.last_location = "East Gas".to_string();
    let mut second = snapshot;
    second.status = CylinderStatus::Refilling;
    second.last_location = "West Gas".to_string();

    repo.commit_batch(&[first], CylinderStatus::EmptyRefill, &dispatch_record("t1"))
        .unwrap();
    let err = repo
        .commit_batch(&[second], CylinderStatus::EmptyRefill, &dispatch_record("t2"))
        .unwrap_err();

    assert!(matches!(err, RepositoryError::StateConflict { ref id, .. } if id == "c1"));
    assert_eq!(repo.find_by_id("c1").unwrap().unwrap().last_location, "East Gas");
    assert!(transactions.find_by_id("t2").unwrap().is_none());
    assert_eq!(transactions.list_recent(10).unwrap().len(), 1);
}

#[test]
fn test_count_by_status() {
    let repo = CylinderRepository::new(setup_test_db());
    seed(&repo);

    let counts = repo.count_by_status().unwrap();
    assert!(counts.contains(&(CylinderStatus::EmptyRefill, 2)));
    assert!(counts.contains(&(CylinderStatus::Rented, 1)));
}
