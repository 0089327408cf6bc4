//! Spreadsheet decoding.
//!
//! Reads the first worksheet of an uploaded xlsx/xls payload into loosely
//! typed rows. The first sheet row is the header; every later row becomes a
//! header→cell-text map. Fully blank rows are dropped, but their position is
//! preserved so error reports still point at the right sheet row.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::import::error::SheetError;

/// One data row as read from the sheet.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 0-based position among the sheet's data rows (header excluded).
    /// Stable even when blank rows are skipped.
    pub index: usize,
    pub cells: HashMap<String, String>,
}

/// Decode the first worksheet of a spreadsheet byte buffer.
///
/// Subsequent worksheets are ignored.
pub fn decode_first_sheet(bytes: &[u8]) -> Result<Vec<RawRow>, SheetError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| SheetError::WorkbookRead(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)?
        .map_err(|e| SheetError::WorkbookRead(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(SheetError::EmptySheet)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| render_cell(cell).unwrap_or_default())
        .collect();

    Ok(collect_rows(&headers, rows))
}

/// Pair data-row cells with their headers, skipping blank rows while
/// keeping the original row index.
fn collect_rows<'a>(
    headers: &[String],
    rows: impl Iterator<Item = &'a [Data]>,
) -> Vec<RawRow> {
    let mut records = Vec::new();

    for (index, data_row) in rows.enumerate() {
        let mut cells = HashMap::new();

        for (col, cell) in data_row.iter().enumerate() {
            let Some(header) = headers.get(col) else {
                continue;
            };
            if header.is_empty() {
                continue;
            }
            if let Some(value) = render_cell(cell) {
                cells.insert(header.clone(), value);
            }
        }

        if cells.is_empty() {
            continue;
        }

        records.push(RawRow { index, cells });
    }

    records
}

/// Render a cell as trimmed text. Integral floats lose the trailing `.0`
/// Excel gives numeric cells, so a phone typed as a number survives intact.
fn render_cell(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::Error(_) => return None,
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_cell_integral_float() {
        assert_eq!(render_cell(&Data::Float(5550001.0)), Some("5550001".to_string()));
        assert_eq!(render_cell(&Data::Float(400.5)), Some("400.5".to_string()));
    }

    #[test]
    fn test_render_cell_empty_and_blank() {
        assert_eq!(render_cell(&Data::Empty), None);
        assert_eq!(render_cell(&Data::String("   ".to_string())), None);
        assert_eq!(render_cell(&Data::String(" x ".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_collect_rows_basic() {
        let hdrs = headers(&["Phone", "Name"]);
        let data = vec![
            vec![Data::Float(5550001.0), Data::String("Jane".into())],
            vec![Data::String("555-0002".into()), Data::Empty],
        ];
        let rows = collect_rows(&hdrs, data.iter().map(|r| r.as_slice()));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells.get("Phone"), Some(&"5550001".to_string()));
        assert_eq!(rows[0].cells.get("Name"), Some(&"Jane".to_string()));
        assert_eq!(rows[1].cells.get("Name"), None);
    }

    #[test]
    fn test_collect_rows_blank_row_preserves_index() {
        let hdrs = headers(&["Phone"]);
        let data = vec![
            vec![Data::String("111".into())],
            vec![Data::Empty],
            vec![Data::String("222".into())],
        ];
        let rows = collect_rows(&hdrs, data.iter().map(|r| r.as_slice()));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        // Blank row is dropped but row 222 keeps sheet position 2
        assert_eq!(rows[1].index, 2);
    }

    #[test]
    fn test_collect_rows_unheadered_column_dropped() {
        let hdrs = headers(&["Phone", ""]);
        let data = vec![vec![
            Data::String("111".into()),
            Data::String("stray".into()),
        ]];
        let rows = collect_rows(&hdrs, data.iter().map(|r| r.as_slice()));

        assert_eq!(rows[0].cells.len(), 1);
        assert!(rows[0].cells.contains_key("Phone"));
    }

    #[test]
    fn test_decode_rejects_garbage_bytes() {
        let result = decode_first_sheet(b"this is not a spreadsheet");
        assert!(matches!(result, Err(SheetError::WorkbookRead(_))));
    }
}
