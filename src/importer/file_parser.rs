// ==========================================
// 气瓶充装调度系统 - 文件解析器实现
// ==========================================
// 格式: 首行为表头（忽略）,其后每行按固定顺序
//       serial_code, gas_type, size, status, last_location
// 支持: CSV 文本 / .csv 文件 / Excel (.xlsx)
// ==========================================

use crate::domain::import::RawImportLine;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook, Reader, Xlsx};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 必填列数（serial_code, gas_type, size）
const REQUIRED_COLUMNS: usize = 3;

/// 整理 Excel 行: 全空行返回 None;尾部空单元格只裁到必填列为止
///
/// Excel 行宽取决于工作表范围,CSV 行宽取决于分隔符数;
/// 保留必填列使两种来源对同一行给出相同的校验结果
fn normalize_sheet_row(mut fields: Vec<String>) -> Option<Vec<String>> {
    if fields.iter().all(|f| f.is_empty()) {
        return None;
    }
    while fields.len() > REQUIRED_COLUMNS && fields.last().map_or(false, |f| f.is_empty()) {
        fields.pop();
    }
    Some(fields)
}

/// 检查文件存在与扩展名
fn check_file(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !allowed.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }
    Ok(())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意 Reader 解析（文本 / 文件共用）
    pub fn parse_reader<R: Read>(reader: R) -> ImportResult<Vec<RawImportLine>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true) // 首行表头忽略
            .flexible(true) // 允许行长度不一致
            .trim(Trim::All)
            .from_reader(reader);

        let mut lines = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let fields: Vec<String> = record.iter().map(|v| v.to_string()).collect();

            // 跳过完全空白的行
            if fields.iter().all(|v| v.is_empty()) {
                continue;
            }

            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            lines.push(RawImportLine { row_number, fields });
        }

        Ok(lines)
    }

    /// 从粘贴的表格文本解析
    pub fn parse_text(text: &str) -> ImportResult<Vec<RawImportLine>> {
        Self::parse_reader(text.as_bytes())
    }
}

impl FileParser for CsvParser {
    fn parse_lines(&self, file_path: &Path) -> ImportResult<Vec<RawImportLine>> {
        check_file(file_path, &["csv", "txt"])?;
        let file = File::open(file_path)?;
        Self::parse_reader(file)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_lines(&self, file_path: &Path) -> ImportResult<Vec<RawImportLine>> {
        check_file(file_path, &["xlsx"])?;

        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 第一行为表头,跳过;行号从 2 开始
        let mut lines = Vec::new();
        for (idx, data_row) in range.rows().enumerate().skip(1) {
            let fields: Vec<String> = data_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();

            let Some(fields) = normalize_sheet_row(fields) else {
                continue;
            };

            lines.push(RawImportLine {
                row_number: idx + 1,
                fields,
            });
        }

        Ok(lines)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawImportLine>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" => CsvParser.parse_lines(path),
            "xlsx" => ExcelParser.parse_lines(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
