// ==========================================
// 气瓶充装调度系统 - 气瓶数据仓储
// ==========================================
// 依据: db.rs cylinder 表
// 红线: 流程提交（气瓶更新 + 流水记录）必须在同一事务内
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::CylinderRepository;
pub use queries::{CylinderQuery, Page};
