// ==========================================
// 气瓶充装调度系统 - 气瓶导入行校验器
// ==========================================
// 校验顺序:
// 1. 字段数 ≥ 3,否则 "Missing Required Fields"
// 2. 气体种类在枚举内,否则 "Invalid Gas Type"
// 3. 规格在枚举内,否则 "Invalid Size"
// 4. 钢印编号非空,否则 "Missing Serial Code"
// 5. 钢印编号在本文件内唯一,否则 "Duplicate Serial Code"
// 状态: 缺失或不在枚举内时默认 Available（状态本身不构成失败）
// 位置: 空白时默认在库位置
// ==========================================

use crate::config::RefillSettings;
use crate::domain::cylinder::CylinderDraft;
use crate::domain::import::{ImportRow, ImportRowError, RawImportLine};
use crate::domain::types::{CylinderSize, CylinderStatus, GasType};
use crate::importer::importer_trait::RowValidator;
use std::collections::HashSet;
use tracing::debug;

/// 必填字段数（serial_code, gas_type, size）
const MIN_FIELDS: usize = 3;

pub struct CylinderImportValidator {
    settings: RefillSettings,
}

impl CylinderImportValidator {
    pub fn new(settings: RefillSettings) -> Self {
        Self { settings }
    }

    /// 单行校验（不含批内重复检查）
    fn validate_fields(&self, fields: &[String]) -> Result<CylinderDraft, ImportRowError> {
        if fields.len() < MIN_FIELDS {
            return Err(ImportRowError::MissingFields);
        }

        let field = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");

        let gas_type = GasType::parse(field(1)).ok_or(ImportRowError::InvalidGasType)?;
        let size = CylinderSize::parse(field(2)).ok_or(ImportRowError::InvalidSize)?;

        let serial_code = field(0);
        if serial_code.is_empty() {
            return Err(ImportRowError::MissingSerialCode);
        }

        let status = CylinderStatus::parse(field(3)).unwrap_or(CylinderStatus::Available);

        let last_location = match field(4) {
            "" => self.settings.default_holding_location.clone(),
            loc => loc.to_string(),
        };

        Ok(CylinderDraft {
            serial_code: serial_code.to_string(),
            gas_type,
            size,
            status,
            last_location,
        })
    }
}

impl RowValidator for CylinderImportValidator {
    fn validate(&self, lines: &[RawImportLine]) -> Vec<ImportRow> {
        let mut seen_serials = HashSet::new();

        let rows: Vec<ImportRow> = lines
            .iter()
            .map(|line| {
                let outcome = self.validate_fields(&line.fields).and_then(|draft| {
                    if seen_serials.insert(draft.serial_code.clone()) {
                        Ok(draft)
                    } else {
                        Err(ImportRowError::DuplicateSerialCode)
                    }
                });
                ImportRow {
                    row_number: line.row_number,
                    raw_fields: line.fields.clone(),
                    outcome,
                }
            })
            .collect();

        debug!(
            total = rows.len(),
            invalid = rows.iter().filter(|r| !r.is_valid()).count(),
            "导入行校验完成"
        );

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(row_number: usize, raw: &str) -> RawImportLine {
        RawImportLine {
            row_number,
            fields: raw.split(',').map(|s| s.to_string()).collect(),
        }
    }

    fn validator() -> CylinderImportValidator {
        CylinderImportValidator::new(RefillSettings::default())
    }

    #[test]
    fn test_valid_row_gets_defaults() {
        let rows = validator().validate(&[line(2, "OXY-1,Oxygen,6m3,,")]);
        let draft = rows[0].outcome.as_ref().unwrap();
        assert_eq!(draft.serial_code, "OXY-1");
        assert_eq!(draft.gas_type, GasType::Oxygen);
        assert_eq!(draft.size, CylinderSize::Cubic6);
        assert_eq!(draft.status, CylinderStatus::Available);
        assert_eq!(draft.last_location, "Main Warehouse");
    }

    #[test]
    fn test_unsupported_gas_is_rejected_and_not_committed() {
        let v = validator();
        let rows = v.validate(&[line(2, "X-1,Helium,6m3,,"), line(3, "OXY-1,Oxygen,6m3,,")]);
        assert_eq!(rows[0].error(), Some(ImportRowError::InvalidGasType));
        assert_eq!(rows[0].error().unwrap().reason(), "Invalid Gas Type");

        let committed = v.confirm_import(&rows);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].serial_code, "OXY-1");
    }

    #[test]
    fn test_gas_checked_before_size() {
        let rows = validator().validate(&[line(2, "X-1,Helium,Huge")]);
        assert_eq!(rows[0].error(), Some(ImportRowError::InvalidGasType));

        let rows = validator().validate(&[line(2, "X-1,Argon,Huge")]);
        assert_eq!(rows[0].error(), Some(ImportRowError::InvalidSize));
    }

    #[test]
    fn test_short_row_is_reported() {
        let rows = validator().validate(&[line(2, "OXY-1,Oxygen")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].error(), Some(ImportRowError::MissingFields));
    }

    #[test]
    fn test_unknown_status_defaults_to_available() {
        let rows = validator().validate(&[
            line(2, "A-1,Argon,Small,Lost,Shelf 3"),
            line(3, "A-2,Argon,Small,Empty Refill,"),
        ]);
        let first = rows[0].outcome.as_ref().unwrap();
        assert_eq!(first.status, CylinderStatus::Available);
        assert_eq!(first.last_location, "Shelf 3");
        let second = rows[1].outcome.as_ref().unwrap();
        assert_eq!(second.status, CylinderStatus::EmptyRefill);
    }

    #[test]
    fn test_missing_and_duplicate_serials() {
        let rows = validator().validate(&[
            line(2, ",Argon,Small"),
            line(3, "A-1,Argon,Small"),
            line(4, "A-1,Argon,Large"),
        ]);
        assert_eq!(rows[0].error(), Some(ImportRowError::MissingSerialCode));
        assert!(rows[1].is_valid());
        assert_eq!(rows[2].error(), Some(ImportRowError::DuplicateSerialCode));
    }

    #[test]
    fn test_custom_holding_location() {
        let settings = RefillSettings {
            default_holding_location: "Depot B".to_string(),
            ..RefillSettings::default()
        };
        let rows = CylinderImportValidator::new(settings).validate(&[line(2, "N-1,Nitrogen,Large")]);
        assert_eq!(rows[0].outcome.as_ref().unwrap().last_location, "Depot B");
    }
}
