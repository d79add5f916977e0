use crate::error::{Result, SyncError};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::row::RawRow;

/// Workbook extensions read through calamine.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read the rows of the first sheet of a workbook.
///
/// Spreadsheets use their first row as headers. A `.json` file holding an
/// array of `{column: cell}` objects is accepted as an already-extracted
/// sheet. Rows whose cells are all blank are dropped.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let rows = if ext == "json" {
        read_json_rows(path)?
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        read_sheet_rows(path)?
    } else {
        return Err(SyncError::workbook(
            path,
            format!("unsupported workbook type '.{}'", ext),
        ));
    };

    debug!(rows = rows.len(), file = %path.display(), "read workbook rows");
    Ok(rows)
}

fn read_sheet_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SyncError::workbook(path, e.to_string()))?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SyncError::EmptyWorkbook {
            file: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| SyncError::workbook(path, e.to_string()))?;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(cell_text).collect();

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let mut row = RawRow::new();
        for (index, column) in header.iter().enumerate() {
            if column.trim().is_empty() {
                continue;
            }
            let text = cells.get(index).map(cell_text).unwrap_or_default();
            row.insert(column.clone(), text);
        }
        push_non_blank(&mut rows, row);
    }
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_json_rows(path: &Path) -> Result<Vec<RawRow>> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| SyncError::workbook(path, format!("invalid JSON rows: {}", e)))?;
    let Value::Array(items) = value else {
        return Err(SyncError::workbook(path, "expected a JSON array of row objects"));
    };

    let mut rows = Vec::new();
    for item in items {
        let Value::Object(object) = item else {
            return Err(SyncError::workbook(path, "every row must be a JSON object"));
        };
        let row: RawRow = object
            .into_iter()
            .map(|(column, cell)| {
                let text = match cell {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (column, text)
            })
            .collect();
        push_non_blank(&mut rows, row);
    }
    Ok(rows)
}

fn push_non_blank(rows: &mut Vec<RawRow>, row: RawRow) {
    if row.values().any(|v| !v.trim().is_empty()) {
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.json");
        fs::write(
            &path,
            r#"[
  {"key": "home.title", "en": "Welcome", "de": "Willkommen"},
  {"key": "", "en": "", "de": null},
  {"key": "count", "en": 3}
]"#,
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("de").map(String::as_str), Some("Willkommen"));
        assert_eq!(rows[1].get("en").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_json_rows_must_be_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sheet.json");
        fs::write(&path, r#"{"key": "x"}"#).unwrap();
        assert!(matches!(read_rows(&path), Err(SyncError::Workbook { .. })));
    }

    #[test]
    fn test_unsupported_workbook_type() {
        let err = read_rows(Path::new("rows.txt")).unwrap_err();
        assert!(err.to_string().contains("unsupported workbook type"));
    }

    #[test]
    fn test_missing_spreadsheet_is_workbook_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_rows(&temp_dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, SyncError::Workbook { .. }));
    }
}
