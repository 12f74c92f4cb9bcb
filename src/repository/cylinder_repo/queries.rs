use super::core::CylinderRepository;
use crate::domain::cylinder::Cylinder;
use crate::domain::types::CylinderStatus;
use crate::repository::error::RepositoryResult;
use crate::repository::row_codec::{parse_gas, parse_size, parse_status, parse_ts};
use rusqlite::{params, params_from_iter, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SELECT_COLUMNS: &str = r#"
    SELECT cylinder_id, serial_code, gas_type, size, status,
           holder_id, last_location, updated_at
    FROM cylinder
"#;

/// 按 id 批量查询时单条 SQL 的参数上限（低于 SQLite 变量数限制）
pub(super) const ID_CHUNK_SIZE: usize = 500;

/// 列表检索条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CylinderQuery {
    pub status: Option<CylinderStatus>,
    pub keyword: Option<String>, // 钢印编号 / 气体种类,忽略大小写
    pub offset: usize,
    pub limit: Option<usize>, // None = 不分页
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl CylinderRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 cylinder_id 查询
    pub fn find_by_id(&self, cylinder_id: &str) -> RepositoryResult<Option<Cylinder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE cylinder_id = ?", SELECT_COLUMNS))?;

        match stmt.query_row(params![cylinder_id], map_row) {
            Ok(cylinder) => Ok(Some(cylinder)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按 id 列表查询（结果按入参顺序排列,缺失的 id 跳过）
    ///
    /// 按 ID_CHUNK_SIZE 分段查询后合并,入参数量不受 SQLite 变量数限制
    pub fn find_by_ids(&self, cylinder_ids: &[String]) -> RepositoryResult<Vec<Cylinder>> {
        if cylinder_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let mut by_id: HashMap<String, Cylinder> = HashMap::with_capacity(cylinder_ids.len());

        for chunk in cylinder_ids.chunks(ID_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "{} WHERE cylinder_id IN ({})",
                SELECT_COLUMNS, placeholders
            ))?;

            let rows = stmt.query_map(params_from_iter(chunk.iter()), map_row)?;
            for row in rows {
                let cylinder = row?;
                by_id.insert(cylinder.cylinder_id.clone(), cylinder);
            }
        }

        Ok(cylinder_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    /// 按状态查询（钢印编号升序）
    pub fn find_by_status(&self, status: CylinderStatus) -> RepositoryResult<Vec<Cylinder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE status = ? ORDER BY serial_code ASC",
            SELECT_COLUMNS
        ))?;

        let cylinders = stmt
            .query_map(params![status.as_db_str()], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(cylinders)
    }

    /// 条件检索 + 分页（钢印编号升序）
    ///
    /// 关键字按字面子串匹配（% 与 _ 不作通配符）;大小写仅折叠 ASCII,两侧口径一致
    pub fn search(&self, query: &CylinderQuery) -> RepositoryResult<Page<Cylinder>> {
        let conn = self.get_conn()?;

        let status = query.status.map(|s| s.as_db_str());
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| k.to_ascii_lowercase());

        let filter = r#"
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL
                   OR instr(LOWER(serial_code), ?2) > 0
                   OR instr(LOWER(gas_type), ?2) > 0)
        "#;

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM cylinder {}", filter),
            params![status, keyword],
            |row| row.get(0),
        )?;

        // SQLite: LIMIT -1 表示不限制
        let limit: i64 = query.limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = conn.prepare(&format!(
            "{} {} ORDER BY serial_code ASC LIMIT ?3 OFFSET ?4",
            SELECT_COLUMNS, filter
        ))?;
        let items = stmt
            .query_map(params![status, keyword, limit, query.offset as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total: total as usize,
        })
    }

    /// 各状态气瓶数量（仪表盘用）
    pub fn count_by_status(&self) -> RepositoryResult<Vec<(CylinderStatus, usize)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM cylinder GROUP BY status ORDER BY status")?;

        let counts = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((parse_status(0, &raw)?, count as usize))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(counts)
    }
}

fn map_row(row: &Row) -> SqliteResult<Cylinder> {
    let gas_raw: String = row.get(2)?;
    let size_raw: String = row.get(3)?;
    let status_raw: String = row.get(4)?;
    let updated_raw: String = row.get(7)?;

    Ok(Cylinder {
        cylinder_id: row.get(0)?,
        serial_code: row.get(1)?,
        gas_type: parse_gas(2, &gas_raw)?,
        size: parse_size(3, &size_raw)?,
        status: parse_status(4, &status_raw)?,
        holder_id: row.get(5)?,
        last_location: row.get(6)?,
        updated_at: parse_ts(7, &updated_raw)?,
    })
}
