// ==========================================
// 气瓶充装调度系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一连接,保证批次提交与回读看到同一份数据
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{CylinderApi, ImportApi, RefillApi, StationApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    CylinderRepository, PriceRuleRepository, StationRepository, TransactionRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径（内存库为 ":memory:"）
    pub db_path: String,

    /// 送充/回库API
    pub refill_api: Arc<RefillApi>,

    /// 批量导入API
    pub import_api: Arc<ImportApi>,

    /// 充装站与价格规则API
    pub station_api: Arc<StationApi>,

    /// 气瓶台账API
    pub cylinder_api: Arc<CylinderApi>,

    /// 配置管理器（运行期修改配置用）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已初始化的共享连接创建（测试与嵌入场景）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let cylinder_repo = Arc::new(CylinderRepository::new(conn.clone()));
        let station_repo = Arc::new(StationRepository::new(conn.clone()));
        let price_rule_repo = Arc::new(PriceRuleRepository::new(conn.clone()));
        let transaction_repo = Arc::new(TransactionRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 创建API实例
        // ==========================================
        let refill_api = Arc::new(RefillApi::new(
            cylinder_repo.clone(),
            station_repo.clone(),
            price_rule_repo.clone(),
            transaction_repo.clone(),
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(cylinder_repo.clone(), config_manager.clone()));
        let station_api = Arc::new(StationApi::new(station_repo, price_rule_repo));
        let cylinder_api = Arc::new(CylinderApi::new(
            cylinder_repo,
            transaction_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            refill_api,
            import_api,
            station_api,
            cylinder_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 CYLINDER_REFILL_DB_PATH
/// 2. 用户数据目录下的 cylinder-refill/cylinder_refill.db
/// 3. 当前目录 ./cylinder_refill.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CYLINDER_REFILL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cylinder_refill.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("cylinder-refill-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("cylinder-refill");

        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("cylinder_refill.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_on_memory_db() {
        let state = AppState::new(":memory:".to_string()).unwrap();
        assert!(state.station_api.list_stations().unwrap().is_empty());
        assert_eq!(state.db_path, ":memory:");
    }
}
