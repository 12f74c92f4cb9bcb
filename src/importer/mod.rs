// ==========================================
// 气瓶充装调度系统 - 导入层
// ==========================================
// 职责: 外部气瓶清单导入（解析 + 行级校验,部分提交）
// 支持: CSV 文本 / CSV 文件 / Excel
// ==========================================

pub mod cylinder_validator;
pub mod error;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use cylinder_validator::CylinderImportValidator;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, RowValidator};
