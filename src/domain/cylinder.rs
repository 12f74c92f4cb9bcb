// ==========================================
// 气瓶充装调度系统 - 气瓶领域模型
// ==========================================
// 用途: 引擎只处理调用方传入的快照,返回新值,不持有长期引用
// 对齐: schema cylinder 表
// ==========================================

use crate::domain::types::{CylinderSize, CylinderStatus, GasType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 默认在库位置（配置缺失时使用）
pub const DEFAULT_HOLDING_LOCATION: &str = "Main Warehouse";

// ==========================================
// Cylinder - 气瓶
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    // ===== 主键 =====
    pub cylinder_id: String,

    // ===== 基础信息 =====
    pub serial_code: String,   // 钢印编号（首个 '-' 前为 SKU 前缀）
    pub gas_type: GasType,
    pub size: CylinderSize,

    // ===== 状态 =====
    pub status: CylinderStatus,
    pub holder_id: Option<String>, // 当前持有人（出租会员）
    pub last_location: String,     // 最后已知位置（自由文本）

    // ===== 审计字段 =====
    pub updated_at: DateTime<Utc>,
}

impl Cylinder {
    /// SKU 前缀: 钢印编号首个 '-' 之前的部分（无 '-' 时为整串）
    pub fn sku_prefix(&self) -> &str {
        sku_prefix_of(&self.serial_code)
    }
}

/// 从钢印编号提取 SKU 前缀
pub fn sku_prefix_of(serial_code: &str) -> &str {
    match serial_code.find('-') {
        Some(pos) => &serial_code[..pos],
        None => serial_code,
    }
}

// ==========================================
// CylinderDraft - 待入库气瓶（导入产物）
// ==========================================
// 生命周期: 导入确认前的候选值,主键由持久层分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderDraft {
    pub serial_code: String,
    pub gas_type: GasType,
    pub size: CylinderSize,
    pub status: CylinderStatus,
    pub last_location: String,
}

impl CylinderDraft {
    /// 分配主键,生成正式气瓶记录
    pub fn into_cylinder(self, cylinder_id: String, now: DateTime<Utc>) -> Cylinder {
        Cylinder {
            cylinder_id,
            serial_code: self.serial_code,
            gas_type: self.gas_type,
            size: self.size,
            status: self.status,
            holder_id: None,
            last_location: self.last_location,
            updated_at: now,
        }
    }
}
