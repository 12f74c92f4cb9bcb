// ==========================================
// 气瓶充装调度系统 - 充装站数据仓储
// ==========================================
// 依据: db.rs refill_station 表
// 删除充装站时其价格规则由外键 ON DELETE CASCADE 一并删除
// ==========================================

use crate::domain::station::RefillStation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct StationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, station: &RefillStation) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO refill_station (station_id, name, address, contact_name, phone)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                station.station_id,
                station.name,
                station.address,
                station.contact_name,
                station.phone,
            ],
        )?;
        Ok(station.station_id.clone())
    }

    pub fn update(&self, station: &RefillStation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE refill_station
            SET name = ?2, address = ?3, contact_name = ?4, phone = ?5
            WHERE station_id = ?1
            "#,
            params![
                station.station_id,
                station.name,
                station.address,
                station.contact_name,
                station.phone,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("RefillStation", &station.station_id));
        }
        Ok(())
    }

    /// 删除充装站（级联删除其价格规则）
    pub fn delete(&self, station_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM refill_station WHERE station_id = ?1",
            params![station_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("RefillStation", station_id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, station_id: &str) -> RepositoryResult<Option<RefillStation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT station_id, name, address, contact_name, phone
            FROM refill_station
            WHERE station_id = ?
            "#,
        )?;

        match stmt.query_row(params![station_id], map_row) {
            Ok(station) => Ok(Some(station)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全部充装站（按名称升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<RefillStation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT station_id, name, address, contact_name, phone
            FROM refill_station
            ORDER BY name ASC
            "#,
        )?;

        let stations = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(stations)
    }
}

fn map_row(row: &Row) -> SqliteResult<RefillStation> {
    Ok(RefillStation {
        station_id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        contact_name: row.get(3)?,
        phone: row.get(4)?,
    })
}
