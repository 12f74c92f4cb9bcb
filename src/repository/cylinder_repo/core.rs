use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::CylinderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::format_ts;
use crate::repository::transaction_repo::insert_record;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const INSERT_SQL: &str = r#"
    INSERT INTO cylinder (
        cylinder_id, serial_code, gas_type, size, status,
        holder_id, last_location, updated_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_SQL: &str = r#"
    UPDATE cylinder SET
        serial_code = ?2, gas_type = ?3, size = ?4, status = ?5,
        holder_id = ?6, last_location = ?7, updated_at = ?8
    WHERE cylinder_id = ?1
      AND (?9 IS NULL OR status = ?9)
"#;

// ==========================================
// CylinderRepository - 气瓶仓储
// ==========================================
// 红线: Repository 不做业务逻辑（状态转换由引擎校验）,只做数据映射
pub struct CylinderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CylinderRepository {
    /// 创建新的气瓶仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn execute_insert(conn: &Connection, cylinder: &Cylinder) -> RepositoryResult<()> {
        conn.execute(
            INSERT_SQL,
            params![
                cylinder.cylinder_id,
                cylinder.serial_code,
                cylinder.gas_type.as_str(),
                cylinder.size.as_str(),
                cylinder.status.as_db_str(),
                cylinder.holder_id,
                cylinder.last_location,
                format_ts(&cylinder.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 更新单行;expected 非空时仅当库内状态仍为 expected 才写入
    fn execute_update(
        conn: &Connection,
        cylinder: &Cylinder,
        expected: Option<CylinderStatus>,
    ) -> RepositoryResult<()> {
        let rows = conn.execute(
            UPDATE_SQL,
            params![
                cylinder.cylinder_id,
                cylinder.serial_code,
                cylinder.gas_type.as_str(),
                cylinder.size.as_str(),
                cylinder.status.as_db_str(),
                cylinder.holder_id,
                cylinder.last_location,
                format_ts(&cylinder.updated_at),
                expected.map(|s| s.as_db_str()),
            ],
        )?;
        if rows > 0 {
            return Ok(());
        }

        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM cylinder WHERE cylinder_id = ?1",
                params![cylinder.cylinder_id],
                |row| row.get(0),
            )
            .optional()?;
        match (current, expected) {
            (Some(actual), Some(expected)) => Err(RepositoryError::StateConflict {
                entity: "Cylinder".to_string(),
                id: cylinder.cylinder_id.clone(),
                expected: expected.as_db_str().to_string(),
                actual,
            }),
            _ => Err(RepositoryError::not_found("Cylinder", &cylinder.cylinder_id)),
        }
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入单个气瓶
    pub fn insert(&self, cylinder: &Cylinder) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::execute_insert(&conn, cylinder)?;
        Ok(cylinder.cylinder_id.clone())
    }

    /// 批量插入气瓶（全部成功或全部回滚）
    ///
    /// # 返回
    /// - `Ok(count)`: 插入条数
    pub fn insert_many(&self, cylinders: &[Cylinder]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for cylinder in cylinders {
            Self::execute_insert(&tx, cylinder)?;
        }

        tx.commit()?;
        Ok(cylinders.len())
    }

    /// 更新单个气瓶（不存在时返回 NotFound）
    pub fn update(&self, cylinder: &Cylinder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::execute_update(&conn, cylinder, None)
    }

    /// 删除单个气瓶（不存在时返回 NotFound）
    pub fn delete(&self, cylinder_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM cylinder WHERE cylinder_id = ?1",
            params![cylinder_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Cylinder", cylinder_id));
        }
        Ok(())
    }

    /// 提交一次流程结果: 批量更新气瓶 + 写入流水记录
    ///
    /// # 参数
    /// - `cylinders`: 引擎返回的已转换气瓶
    /// - `from`: 引擎校验时的源状态（事务内逐行复核）
    /// - `record`: 本批次的流水记录
    ///
    /// # 返回
    /// - `Ok(())`: 全部写入
    /// - `Err(StateConflict)`: 任一气瓶已被其他批次改变状态,整体回滚
    /// - `Err(...)`: 其他失败同样整体回滚
    pub fn commit_batch(
        &self,
        cylinders: &[Cylinder],
        from: CylinderStatus,
        record: &TransactionRecord,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for cylinder in cylinders {
            Self::execute_update(&tx, cylinder, Some(from))?;
        }
        insert_record(&tx, record)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}
