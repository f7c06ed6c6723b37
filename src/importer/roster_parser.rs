// ==========================================
// 员工主数据生命周期系统 - 名册文件解析器
// ==========================================
// 职责: 解析 Excel/CSV 名册文件为 RosterRow 列表
// 约束: 表头大小写/变音符号不敏感，德语别名可识别
// 红线: 单元格解析失败不抛错，字段置空由对账层计数
// ==========================================

use crate::domain::employee::RosterRow;
use crate::importer::date_normalizer::{parse_bool_flexible, parse_date_flexible, serial_to_date};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// 表头字段枚举
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnField {
    FirstName,
    LastName,
    Email,
    StartDate,
    BirthDate,
    LockAll,
    LockFirstName,
    LockLastName,
    LockStartDate,
    LockBirthDate,
    LockEmail,
}

/// 去除常见欧洲语言变音符号（ä→a, é→e, ß→ss 等）
pub fn strip_diacritics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'ä' | 'à' | 'á' | 'â' | 'ã' | 'å' => out.push('a'),
            'Ä' | 'À' | 'Á' | 'Â' | 'Ã' | 'Å' => out.push('A'),
            'ö' | 'ò' | 'ó' | 'ô' | 'õ' | 'ø' => out.push('o'),
            'Ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => out.push('O'),
            'ü' | 'ù' | 'ú' | 'û' => out.push('u'),
            'Ü' | 'Ù' | 'Ú' | 'Û' => out.push('U'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'É' | 'È' | 'Ê' | 'Ë' => out.push('E'),
            'í' | 'ì' | 'î' | 'ï' => out.push('i'),
            'Í' | 'Ì' | 'Î' | 'Ï' => out.push('I'),
            'ý' | 'ÿ' => out.push('y'),
            'ñ' => out.push('n'),
            'Ñ' => out.push('N'),
            'ç' => out.push('c'),
            'Ç' => out.push('C'),
            'ß' => out.push_str("ss"),
            _ => out.push(c),
        }
    }
    out
}

/// 表头归一化: 小写 + 去变音 + 只留字母数字
fn normalize_header(raw: &str) -> String {
    strip_diacritics(raw)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// 归一化表头 → 字段（含德语别名）
fn resolve_header(raw: &str) -> Option<ColumnField> {
    match normalize_header(raw).as_str() {
        "firstname" | "vorname" => Some(ColumnField::FirstName),
        "lastname" | "nachname" => Some(ColumnField::LastName),
        "email" | "mail" => Some(ColumnField::Email),
        "startdate" | "eintrittsdatum" | "eintritt" => Some(ColumnField::StartDate),
        "birthdate" | "geburtsdatum" | "geburtstag" => Some(ColumnField::BirthDate),
        "lockall" => Some(ColumnField::LockAll),
        "lockfirstname" => Some(ColumnField::LockFirstName),
        "lastnamelock" | "locklastname" => Some(ColumnField::LockLastName),
        "lockstartdate" => Some(ColumnField::LockStartDate),
        "lockbirthdate" => Some(ColumnField::LockBirthDate),
        "lockemail" => Some(ColumnField::LockEmail),
        _ => None,
    }
}

/// 构建列号 → 字段的映射表
fn build_column_map(headers: &[String]) -> Vec<Option<ColumnField>> {
    headers.iter().map(|h| resolve_header(h)).collect()
}

/// 非空字符串单元格，空白视为缺失
fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 将字符串单元格写入名册行的对应字段
fn apply_text_cell(row: &mut RosterRow, field: ColumnField, raw: &str) {
    match field {
        ColumnField::FirstName => row.first_name = non_empty(raw),
        ColumnField::LastName => row.last_name = non_empty(raw),
        ColumnField::Email => row.email = non_empty(raw),
        ColumnField::StartDate => row.start_date = parse_date_flexible(raw),
        ColumnField::BirthDate => row.birth_date = parse_date_flexible(raw),
        ColumnField::LockAll => row.locks.lock_all = parse_bool_flexible(raw),
        ColumnField::LockFirstName => row.locks.lock_first_name = parse_bool_flexible(raw),
        ColumnField::LockLastName => row.locks.lock_last_name = parse_bool_flexible(raw),
        ColumnField::LockStartDate => row.locks.lock_start_date = parse_bool_flexible(raw),
        ColumnField::LockBirthDate => row.locks.lock_birth_date = parse_bool_flexible(raw),
        ColumnField::LockEmail => row.locks.lock_email = parse_bool_flexible(raw),
    }
}

/// 将 Excel 类型化单元格写入名册行（日期列优先走序列号）
fn apply_excel_cell(row: &mut RosterRow, field: ColumnField, cell: &Data) {
    match cell {
        Data::Empty => {}
        Data::Float(f) => match field {
            ColumnField::StartDate => row.start_date = serial_to_date(*f),
            ColumnField::BirthDate => row.birth_date = serial_to_date(*f),
            _ => apply_text_cell(row, field, &cell.to_string()),
        },
        Data::Int(i) => match field {
            ColumnField::StartDate => row.start_date = serial_to_date(*i as f64),
            ColumnField::BirthDate => row.birth_date = serial_to_date(*i as f64),
            _ => apply_text_cell(row, field, &cell.to_string()),
        },
        Data::DateTime(dt) => match field {
            ColumnField::StartDate => row.start_date = serial_to_date(dt.as_f64()),
            ColumnField::BirthDate => row.birth_date = serial_to_date(dt.as_f64()),
            _ => apply_text_cell(row, field, &cell.to_string()),
        },
        Data::Bool(b) => {
            let raw = if *b { "true" } else { "false" };
            apply_text_cell(row, field, raw);
        }
        _ => apply_text_cell(row, field, &cell.to_string()),
    }
}

/// 行是否全空（全空行跳过，不计入任何计数）
fn row_is_blank(row: &RosterRow) -> bool {
    row.first_name.is_none()
        && row.last_name.is_none()
        && row.email.is_none()
        && row.start_date.is_none()
        && row.birth_date.is_none()
}

// ==========================================
// RosterParser - 名册文件解析器
// ==========================================
/// 名册文件解析器（支持 .xlsx/.xls/.csv）
pub struct RosterParser {
    max_bytes: u64,
    max_rows: usize,
}

impl RosterParser {
    /// 创建解析器，携带上传限制（来自配置层）
    pub fn new(max_bytes: u64, max_rows: usize) -> Self {
        Self {
            max_bytes,
            max_rows,
        }
    }

    /// 解析名册文件（按扩展名分发）
    pub fn parse_file(&self, file_path: &str) -> ImportResult<Vec<RosterRow>> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Err(ImportError::FileNotFound(file_path.to_string()));
        }

        self.check_file_size(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let rows = match extension.as_str() {
            "xlsx" | "xls" => self.parse_excel(file_path)?,
            "csv" => self.parse_csv(file_path)?,
            _ => return Err(ImportError::UnsupportedFormat(extension)),
        };

        debug!(file = file_path, rows = rows.len(), "名册文件解析完成");
        Ok(rows)
    }

    fn check_file_size(&self, path: &Path) -> ImportResult<()> {
        let actual_bytes = std::fs::metadata(path)?.len();
        if actual_bytes > self.max_bytes {
            return Err(ImportError::FileTooLarge {
                actual_bytes,
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }

    fn check_row_count(&self, actual_rows: usize) -> ImportResult<()> {
        if actual_rows > self.max_rows {
            return Err(ImportError::TooManyRows {
                actual_rows,
                max_rows: self.max_rows,
            });
        }
        Ok(())
    }

    /// 解析 Excel 文件（首个工作表）
    fn parse_excel(&self, file_path: &str) -> ImportResult<Vec<RosterRow>> {
        let mut workbook = open_workbook_auto(file_path)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ImportError::EmptySheet)?
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let mut iter = range.rows();
        let header_row = iter.next().ok_or(ImportError::EmptySheet)?;
        let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();
        let column_map = build_column_map(&headers);

        if column_map.iter().all(|f| f.is_none()) {
            warn!(file = file_path, "未识别到任何已知表头列");
        }

        self.check_row_count(range.height().saturating_sub(1))?;

        let mut rows = Vec::new();
        // 表头占第 1 行，数据行号从 2 起
        for (idx, cells) in iter.enumerate() {
            let mut row = RosterRow {
                row_number: idx + 2,
                ..Default::default()
            };
            for (col, cell) in cells.iter().enumerate() {
                if let Some(Some(field)) = column_map.get(col) {
                    apply_excel_cell(&mut row, *field, cell);
                }
            }
            if !row_is_blank(&row) {
                rows.push(row);
            }
        }

        Ok(rows)
    }

    /// 解析 CSV 文件（UTF-8，首行表头）
    fn parse_csv(&self, file_path: &str) -> ImportResult<Vec<RosterRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(file_path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let column_map = build_column_map(&headers);

        if column_map.iter().all(|f| f.is_none()) {
            warn!(file = file_path, "未识别到任何已知表头列");
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            self.check_row_count(idx + 1)?;

            let mut row = RosterRow {
                row_number: idx + 2,
                ..Default::default()
            };
            for (col, raw) in record.iter().enumerate() {
                if let Some(Some(field)) = column_map.get(col) {
                    apply_text_cell(&mut row, *field, raw);
                }
            }
            if !row_is_blank(&row) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn default_parser() -> RosterParser {
        RosterParser::new(8 * 1024 * 1024, 5000)
    }

    #[test]
    fn test_parse_csv_basic() {
        let file = write_csv(
            "firstName,lastName,email,startDate,birthDate\n\
             Anna,Schmidt,anna.schmidt@example.com,01.03.2020,24.12.1995\n\
             Max,Müller,,15.06.21,1990-05-01\n",
        );
        let rows = default_parser()
            .parse_file(file.path().to_str().unwrap())
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first_name.as_deref(), Some("Anna"));
        assert_eq!(rows[0].last_name.as_deref(), Some("Schmidt"));
        assert_eq!(
            rows[0].start_date,
            NaiveDate::from_ymd_opt(2020, 3, 1)
        );
        assert_eq!(
            rows[0].birth_date,
            NaiveDate::from_ymd_opt(1995, 12, 24)
        );
        assert_eq!(rows[0].row_number, 2);

        assert_eq!(rows[1].first_name.as_deref(), Some("Max"));
        assert_eq!(rows[1].email, None);
        assert_eq!(
            rows[1].start_date,
            NaiveDate::from_ymd_opt(2021, 6, 15)
        );
        assert_eq!(
            rows[1].birth_date,
            NaiveDate::from_ymd_opt(1990, 5, 1)
        );
        assert_eq!(rows[1].row_number, 3);
    }

    #[test]
    fn test_german_header_aliases() {
        let file = write_csv(
            "Vorname,Nachname,Eintrittsdatum,Geburtsdatum\n\
             Lena,Köhler,1.1.2022,2.2.1992\n",
        );
        let rows = default_parser()
            .parse_file(file.path().to_str().unwrap())
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name.as_deref(), Some("Lena"));
        assert_eq!(rows[0].last_name.as_deref(), Some("Köhler"));
        assert_eq!(
            rows[0].start_date,
            NaiveDate::from_ymd_opt(2022, 1, 1)
        );
    }

    #[test]
    fn test_lock_columns() {
        let file = write_csv(
            "firstName,lastName,birthDate,lockAll,lockEmail\n\
             Jan,Weber,3.3.1993,WAHR,ja\n\
             Eva,Braun,4.4.1994,,nein\n",
        );
        let rows = default_parser()
            .parse_file(file.path().to_str().unwrap())
            .unwrap();

        assert!(rows[0].locks.lock_all);
        assert!(rows[0].locks.lock_email);
        assert!(!rows[1].locks.lock_all);
        assert!(!rows[1].locks.lock_email);
    }

    #[test]
    fn test_blank_rows_skipped() {
        let file = write_csv(
            "firstName,lastName,birthDate\n\
             ,,\n\
             Jan,Weber,3.3.1993\n\
             ,,\n",
        );
        let rows = default_parser()
            .parse_file(file.path().to_str().unwrap())
            .unwrap();

        assert_eq!(rows.len(), 1);
        // 行号按文件原始位置计，不因跳过空行而压缩
        assert_eq!(rows[0].row_number, 3);
    }

    #[test]
    fn test_unparseable_date_left_empty() {
        let file = write_csv(
            "firstName,lastName,birthDate\n\
             Jan,Weber,kein datum\n",
        );
        let rows = default_parser()
            .parse_file(file.path().to_str().unwrap())
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].birth_date, None);
    }

    #[test]
    fn test_row_cap_enforced() {
        let mut content = String::from("firstName,lastName,birthDate\n");
        for i in 0..5 {
            content.push_str(&format!("P{},Q{},1.1.1990\n", i, i));
        }
        let file = write_csv(&content);
        let parser = RosterParser::new(8 * 1024 * 1024, 3);
        let err = parser
            .parse_file(file.path().to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, ImportError::TooManyRows { max_rows: 3, .. }));
    }

    #[test]
    fn test_byte_cap_enforced() {
        let file = write_csv("firstName,lastName,birthDate\nJan,Weber,3.3.1993\n");
        let parser = RosterParser::new(10, 5000);
        let err = parser
            .parse_file(file.path().to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, ImportError::FileTooLarge { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .unwrap();
        file.write_all(b"hello").unwrap();
        let err = default_parser()
            .parse_file(file.path().to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = default_parser()
            .parse_file("/nonexistent/roster.csv")
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Müller"), "Muller");
        assert_eq!(strip_diacritics("Groß"), "Gross");
        assert_eq!(strip_diacritics("André"), "Andre");
        assert_eq!(strip_diacritics("plain"), "plain");
    }
}
