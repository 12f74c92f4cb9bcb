// ==========================================
// 气瓶充装调度系统 - 批次状态流转
// ==========================================
// 红线: 先整体校验,后整体变更;快照本身不被修改
// ==========================================

use crate::domain::cylinder::Cylinder;
use crate::domain::types::CylinderStatus;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// 对选中气瓶执行 from → to 的整批流转
///
/// # 参数
/// - cylinder_ids: 选中气瓶ID（重复ID只流转一次,保持首次出现顺序）
/// - snapshot: 气瓶快照
/// - from / to: 源状态 / 目标状态
/// - now: 流转时间
/// - apply: 附加字段变更（位置、持有人等）
///
/// # 返回
/// - Ok(Vec<Cylinder>): 流转后的新值
/// - Err: 任一气瓶缺失或状态不符,整批不流转
pub(crate) fn transition_batch<F>(
    cylinder_ids: &[String],
    snapshot: &[Cylinder],
    from: CylinderStatus,
    to: CylinderStatus,
    now: DateTime<Utc>,
    apply: F,
) -> EngineResult<Vec<Cylinder>>
where
    F: Fn(&mut Cylinder),
{
    let by_id: HashMap<&str, &Cylinder> = snapshot
        .iter()
        .map(|c| (c.cylinder_id.as_str(), c))
        .collect();

    // === 步骤 1: 整批校验 ===
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(cylinder_ids.len());
    for id in cylinder_ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let cylinder = by_id
            .get(id.as_str())
            .ok_or_else(|| EngineError::UnknownCylinder(id.clone()))?;
        if cylinder.status != from {
            return Err(EngineError::InvalidStateTransition {
                cylinder_id: id.clone(),
                from: cylinder.status,
                to,
            });
        }
        selected.push(*cylinder);
    }

    // === 步骤 2: 整批变更 ===
    Ok(selected
        .into_iter()
        .map(|c| {
            let mut next = c.clone();
            next.status = to;
            next.updated_at = now;
            apply(&mut next);
            next
        })
        .collect())
}
