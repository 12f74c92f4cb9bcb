// ==========================================
// 气瓶充装调度系统 - 充装配置读取 Trait
// ==========================================
// 职责: 定义引擎所需配置的读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::cylinder::DEFAULT_HOLDING_LOCATION;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// RefillSettings - 引擎配置快照
// ==========================================
// 引擎只接收快照值,不直接读配置源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefillSettings {
    /// 默认在库位置（回库 / 归还 / 导入缺省）
    pub default_holding_location: String,
    /// SKU 过滤串匹配是否区分大小写
    pub sku_match_case_sensitive: bool,
}

impl Default for RefillSettings {
    fn default() -> Self {
        Self {
            default_holding_location: DEFAULT_HOLDING_LOCATION.to_string(),
            sku_match_case_sensitive: false,
        }
    }
}

// ==========================================
// RefillConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait RefillConfigReader: Send + Sync {
    /// 获取默认在库位置
    ///
    /// # 默认值
    /// - "Main Warehouse"
    fn get_default_holding_location(&self) -> Result<String, Box<dyn Error>>;

    /// 获取 SKU 匹配大小写口径
    ///
    /// # 默认值
    /// - false（不区分大小写）
    fn get_sku_match_case_sensitive(&self) -> Result<bool, Box<dyn Error>>;

    /// 一次性读取引擎配置快照
    fn load_settings(&self) -> Result<RefillSettings, Box<dyn Error>> {
        Ok(RefillSettings {
            default_holding_location: self.get_default_holding_location()?,
            sku_match_case_sensitive: self.get_sku_match_case_sensitive()?,
        })
    }
}
