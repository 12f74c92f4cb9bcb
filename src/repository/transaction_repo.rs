// ==========================================
// 气瓶充装调度系统 - 流水记录数据仓储
// ==========================================
// 依据: db.rs transaction_record 表
// 存储: cylinder_ids 以 JSON 数组存储
// 红线: 流水只追加,不提供更新/删除
// ==========================================

use crate::domain::transaction::TransactionRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{format_ts, parse_kind, parse_ts};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT transaction_id, kind, cylinder_ids_json, station_id, member_id,
           occurred_at, cost, note
    FROM transaction_record
"#;

/// 在给定连接（或事务）上写入流水记录
pub(crate) fn insert_record(conn: &Connection, record: &TransactionRecord) -> RepositoryResult<()> {
    let ids_json = serde_json::to_string(&record.cylinder_ids)?;
    conn.execute(
        r#"
        INSERT INTO transaction_record (
            transaction_id, kind, cylinder_ids_json, station_id, member_id,
            occurred_at, cost, note
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            record.transaction_id,
            record.kind.as_db_str(),
            ids_json,
            record.station_id,
            record.member_id,
            format_ts(&record.occurred_at),
            record.cost,
            record.note,
        ],
    )?;
    Ok(())
}

// ==========================================
// TransactionRepository - 流水记录仓储
// ==========================================
pub struct TransactionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransactionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入单条流水
    pub fn insert(&self, record: &TransactionRecord) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        insert_record(&conn, record)?;
        Ok(record.transaction_id.clone())
    }

    /// 按 transaction_id 查询
    pub fn find_by_id(&self, transaction_id: &str) -> RepositoryResult<Option<TransactionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE transaction_id = ?", SELECT_COLUMNS))?;

        match stmt.query_row(params![transaction_id], map_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 最近的流水（按发生时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<TransactionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY occurred_at DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 指定充装站的流水（按发生时间倒序）
    pub fn find_by_station(&self, station_id: &str) -> RepositoryResult<Vec<TransactionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE station_id = ? ORDER BY occurred_at DESC",
            SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![station_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }
}

fn map_row(row: &Row) -> SqliteResult<TransactionRecord> {
    let kind_raw: String = row.get(1)?;
    let ids_raw: String = row.get(2)?;
    let occurred_raw: String = row.get(5)?;

    let cylinder_ids: Vec<String> = serde_json::from_str(&ids_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(TransactionRecord {
        transaction_id: row.get(0)?,
        kind: parse_kind(1, &kind_raw)?,
        cylinder_ids,
        station_id: row.get(3)?,
        member_id: row.get(4)?,
        occurred_at: parse_ts(5, &occurred_raw)?,
        cost: row.get(6)?,
        note: row.get(7)?,
    })
}
