// ==========================================
// 气瓶充装调度系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::refill_config_trait::RefillConfigReader;
use crate::domain::cylinder::DEFAULT_HOLDING_LOCATION;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// RefillConfigReader Trait 实现
// ==========================================
impl RefillConfigReader for ConfigManager {
    fn get_default_holding_location(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::DEFAULT_HOLDING_LOCATION,
            DEFAULT_HOLDING_LOCATION,
        )?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_HOLDING_LOCATION.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn get_sku_match_case_sensitive(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SKU_MATCH_CASE_SENSITIVE, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 位置
    pub const DEFAULT_HOLDING_LOCATION: &str = "default_holding_location";

    // 匹配口径
    pub const SKU_MATCH_CASE_SENSITIVE: &str = "sku_match_case_sensitive";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefillSettings;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_keys_absent() {
        let manager = setup_manager();
        let settings = manager.load_settings().unwrap();
        assert_eq!(settings, RefillSettings::default());
    }

    #[test]
    fn test_overrides_are_read_back() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::DEFAULT_HOLDING_LOCATION, "Depot B")
            .unwrap();
        manager
            .set_global_config_value(config_keys::SKU_MATCH_CASE_SENSITIVE, "TRUE")
            .unwrap();

        let settings = manager.load_settings().unwrap();
        assert_eq!(settings.default_holding_location, "Depot B");
        assert!(settings.sku_match_case_sensitive);

        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains("Depot B"));
    }

    #[test]
    fn test_blank_location_falls_back_to_default() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::DEFAULT_HOLDING_LOCATION, "   ")
            .unwrap();
        assert_eq!(
            manager.get_default_holding_location().unwrap(),
            DEFAULT_HOLDING_LOCATION
        );
    }
}
