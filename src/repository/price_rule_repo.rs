// ==========================================
// 气瓶充装调度系统 - 充装价格规则数据仓储
// ==========================================
// 依据: db.rs refill_price_rule 表
// 红线: 读取顺序 = 声明顺序（seq 升序）,匹配器按此顺序取首条命中
// ==========================================

use crate::domain::station::RefillPriceRule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{parse_gas, parse_size};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT rule_id, station_id, gas_type, size, sku_filter, unit_price, seq
    FROM refill_price_rule
"#;

pub struct PriceRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PriceRuleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn execute_insert(conn: &Connection, rule: &RefillPriceRule) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO refill_price_rule (
                rule_id, station_id, gas_type, size, sku_filter, unit_price, seq
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                rule.rule_id,
                rule.station_id,
                rule.gas_type.as_str(),
                rule.size.as_str(),
                rule.sku_filter,
                rule.unit_price,
                rule.seq,
            ],
        )?;
        Ok(())
    }

    /// 插入规则（seq 按入参原样写入）
    pub fn insert(&self, rule: &RefillPriceRule) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::execute_insert(&conn, rule)?;
        Ok(rule.rule_id.clone())
    }

    /// 追加规则到该站规则表末尾（seq = 当前最大值 + 1）
    ///
    /// # 返回
    /// - `Ok(rule)`: 实际写入的规则（含分配的 seq）
    pub fn append(&self, rule: &RefillPriceRule) -> RepositoryResult<RefillPriceRule> {
        let conn = self.get_conn()?;
        let next_seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(seq), -1) + 1 FROM refill_price_rule WHERE station_id = ?1",
            params![rule.station_id],
            |row| row.get(0),
        )?;

        let stored = RefillPriceRule {
            seq: next_seq,
            ..rule.clone()
        };
        Self::execute_insert(&conn, &stored)?;
        Ok(stored)
    }

    /// 整体替换某站的规则表（按入参顺序重排 seq,事务内完成）
    pub fn replace_for_station(
        &self,
        station_id: &str,
        rules: &[RefillPriceRule],
    ) -> RepositoryResult<Vec<RefillPriceRule>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM refill_price_rule WHERE station_id = ?1",
            params![station_id],
        )?;

        let mut stored = Vec::with_capacity(rules.len());
        for (seq, rule) in rules.iter().enumerate() {
            let rule = RefillPriceRule {
                station_id: station_id.to_string(),
                seq: seq as i64,
                ..rule.clone()
            };
            Self::execute_insert(&tx, &rule)?;
            stored.push(rule);
        }

        tx.commit()?;
        Ok(stored)
    }

    pub fn update(&self, rule: &RefillPriceRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE refill_price_rule
            SET gas_type = ?2, size = ?3, sku_filter = ?4, unit_price = ?5, seq = ?6
            WHERE rule_id = ?1
            "#,
            params![
                rule.rule_id,
                rule.gas_type.as_str(),
                rule.size.as_str(),
                rule.sku_filter,
                rule.unit_price,
                rule.seq,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("RefillPriceRule", &rule.rule_id));
        }
        Ok(())
    }

    pub fn delete(&self, rule_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM refill_price_rule WHERE rule_id = ?1",
            params![rule_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("RefillPriceRule", rule_id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, rule_id: &str) -> RepositoryResult<Option<RefillPriceRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE rule_id = ?", SELECT_COLUMNS))?;

        match stmt.query_row(params![rule_id], map_row) {
            Ok(rule) => Ok(Some(rule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 某站全部规则（声明顺序）
    pub fn find_by_station(&self, station_id: &str) -> RepositoryResult<Vec<RefillPriceRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE station_id = ? ORDER BY seq ASC, rowid ASC",
            SELECT_COLUMNS
        ))?;

        let rules = stmt
            .query_map(params![station_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rules)
    }
}

fn map_row(row: &Row) -> SqliteResult<RefillPriceRule> {
    let gas_raw: String = row.get(2)?;
    let size_raw: String = row.get(3)?;

    Ok(RefillPriceRule {
        rule_id: row.get(0)?,
        station_id: row.get(1)?,
        gas_type: parse_gas(2, &gas_raw)?,
        size: parse_size(3, &size_raw)?,
        sku_filter: row.get(4)?,
        unit_price: row.get(5)?,
        seq: row.get(6)?,
    })
}
