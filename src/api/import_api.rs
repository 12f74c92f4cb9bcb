// ==========================================
// 气瓶充装调度系统 - 气瓶批量导入 API
// ==========================================
// 职责: 解析 → 逐行校验 → 预览 → 确认入库（仅有效行）
// 说明: 校验失败的行在预览中可见,确认时被丢弃;部分提交是预期行为
// ==========================================

use crate::api::error::{config_error, ApiResult};
use crate::config::{ConfigManager, RefillConfigReader};
use crate::domain::cylinder::Cylinder;
use crate::domain::import::{ImportRow, ImportSummary, RawImportLine};
use crate::importer::{CsvParser, CylinderImportValidator, RowValidator, UniversalFileParser};
use crate::repository::CylinderRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// 导入预览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub rows: Vec<ImportRow>,
    pub summary: ImportSummary,
}

/// 导入确认结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCommit {
    /// 入库后回读的气瓶
    pub imported: Vec<Cylinder>,
    /// 因校验失败被丢弃的行数
    pub skipped: usize,
}

/// 导入API
pub struct ImportApi {
    cylinder_repo: Arc<CylinderRepository>,
    config: Arc<ConfigManager>,
}

impl ImportApi {
    pub fn new(cylinder_repo: Arc<CylinderRepository>, config: Arc<ConfigManager>) -> Self {
        Self {
            cylinder_repo,
            config,
        }
    }

    fn validator(&self) -> ApiResult<CylinderImportValidator> {
        let settings = self.config.load_settings().map_err(config_error)?;
        Ok(CylinderImportValidator::new(settings))
    }

    fn preview_lines(&self, lines: &[RawImportLine]) -> ApiResult<ImportPreview> {
        let rows = self.validator()?.validate(lines);
        let summary = ImportSummary::from_rows(&rows);
        info!(
            total = summary.total_rows,
            valid = summary.valid,
            invalid = summary.invalid,
            "导入预览完成"
        );
        Ok(ImportPreview { rows, summary })
    }

    /// 预览粘贴的表格文本（首行为表头）
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn preview_text(&self, text: &str) -> ApiResult<ImportPreview> {
        let lines = CsvParser::parse_text(text)?;
        self.preview_lines(&lines)
    }

    /// 预览文件（.csv / .txt / .xlsx）
    #[instrument(skip(self))]
    pub fn preview_file(&self, file_path: &str) -> ApiResult<ImportPreview> {
        let lines = UniversalFileParser.parse(file_path)?;
        self.preview_lines(&lines)
    }

    /// 确认导入
    ///
    /// # 参数
    /// - rows: 预览返回的行（含失败行）
    ///
    /// # 返回
    /// - Ok(ImportCommit): 仅有效行入库,主键新分配
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn confirm_import(&self, rows: &[ImportRow]) -> ApiResult<ImportCommit> {
        let drafts = self.validator()?.confirm_import(rows);
        let skipped = rows.len() - drafts.len();

        let now = Utc::now();
        let cylinders: Vec<Cylinder> = drafts
            .into_iter()
            .map(|draft| draft.into_cylinder(uuid::Uuid::new_v4().to_string(), now))
            .collect();

        self.cylinder_repo.insert_many(&cylinders)?;

        let ids: Vec<String> = cylinders.iter().map(|c| c.cylinder_id.clone()).collect();
        let imported = self.cylinder_repo.find_by_ids(&ids)?;

        info!(imported = imported.len(), skipped, "导入已提交");
        Ok(ImportCommit { imported, skipped })
    }
}
