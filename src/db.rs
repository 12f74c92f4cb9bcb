// ==========================================
// 气瓶充装调度系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键级联依赖 foreign_keys=ON）
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表脚本集中在此处,测试与应用共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建表脚本（幂等）
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS cylinder (
    cylinder_id TEXT PRIMARY KEY,
    serial_code TEXT NOT NULL,
    gas_type TEXT NOT NULL,
    size TEXT NOT NULL,
    status TEXT NOT NULL,
    holder_id TEXT,
    last_location TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cylinder_status ON cylinder(status);
CREATE INDEX IF NOT EXISTS idx_cylinder_serial ON cylinder(serial_code);

CREATE TABLE IF NOT EXISTS refill_station (
    station_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT,
    contact_name TEXT,
    phone TEXT
);

CREATE TABLE IF NOT EXISTS refill_price_rule (
    rule_id TEXT PRIMARY KEY,
    station_id TEXT NOT NULL REFERENCES refill_station(station_id) ON DELETE CASCADE,
    gas_type TEXT NOT NULL,
    size TEXT NOT NULL,
    sku_filter TEXT,
    unit_price REAL NOT NULL,
    seq INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_price_rule_station ON refill_price_rule(station_id, seq);

CREATE TABLE IF NOT EXISTS transaction_record (
    transaction_id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    cylinder_ids_json TEXT NOT NULL,
    station_id TEXT,
    member_id TEXT,
    occurred_at TEXT NOT NULL,
    cost REAL NOT NULL DEFAULT 0,
    note TEXT
);
CREATE INDEX IF NOT EXISTS idx_transaction_occurred ON transaction_record(occurred_at);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（充装站删除级联价格规则依赖此项）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema 并登记版本号
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection(conn)?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
