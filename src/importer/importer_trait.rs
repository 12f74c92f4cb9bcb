// ==========================================
// 气瓶充装调度系统 - 批量导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 文件解析 → 行级校验 → 预览 → 确认入库
// ==========================================

use crate::domain::cylinder::CylinderDraft;
use crate::domain::import::{ImportRow, RawImportLine};
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（已跳过表头与完全空白行）
    ///
    /// # 返回
    /// - Ok(Vec<RawImportLine>): 行记录列表
    /// - Err: 文件不存在、格式不支持、读取/解析错误
    fn parse_lines(&self, file_path: &Path) -> ImportResult<Vec<RawImportLine>>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 实现者: CylinderImportValidator
pub trait RowValidator: Send + Sync {
    /// 逐行校验,产出带结果的预览行（失败行不终止批次）
    fn validate(&self, lines: &[RawImportLine]) -> Vec<ImportRow>;

    /// 取出可入库的候选（仅校验通过的行;部分提交是预期行为）
    fn confirm_import(&self, rows: &[ImportRow]) -> Vec<CylinderDraft> {
        rows.iter()
            .filter_map(|row| row.outcome.as_ref().ok().cloned())
            .collect()
    }
}
