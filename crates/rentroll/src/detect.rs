//! Sheet structure detection
//!
//! Rent roll sheets carry no schema. The column layout is inferred from
//! a small header region: the file-type marker in the top-left cell
//! picks the unit column, and the code/amount/name columns are located
//! by scanning the header rows for known labels.

use rentroll_core::{CellValue, Worksheet};
use thiserror::Error;

/// Row index (0-based) of the primary header row ("row 6" on screen)
const HEADER_ROW: u32 = 5;

/// Fallback rows scanned when the code header is not in the primary row
const CODE_FALLBACK_ROWS: std::ops::RangeInclusive<u32> = 6..=11;

/// Errors from structure detection
///
/// These are the only fatal errors in the pipeline: without a unit and
/// code column there is nothing to extract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// The top-left cell did not match either recognized layout
    #[error("Unit column could not be detected (row 1 mismatch)")]
    UnitColumn,

    /// No "Code" / "Rent Code" header in the scanned rows
    #[error("Rent Code column not found in row 6 or rows 7-12")]
    CodeColumn,
}

/// Detected column layout of a rent roll sheet
///
/// All indices are 0-based. `name_col` is `None` when no name header
/// was found; extraction then leaves resident names blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    /// Column holding unit identifiers
    pub unit_col: u16,
    /// Column holding charge codes
    pub code_col: u16,
    /// Column holding charge amounts
    pub amount_col: u16,
    /// Column holding resident names, if one was found
    pub name_col: Option<u16>,
}

/// Infer the column layout of a rent roll sheet
///
/// Steps, in order:
///
/// 1. **Unit column** from the file-type marker in the top-left cell:
///    text starting with "affordable" puts units in column C, text
///    starting with "rent" puts them in column A. Anything else fails.
/// 2. **Code column**: a cell reading exactly "code" or "rent code" in
///    the header row, falling back to rows 7-12 (row-major, first
///    match) for layouts that push the header down.
/// 3. **Amount column**: a header-row cell containing "amount", or the
///    column right after the code column when none is labeled.
/// 4. **Name column**: a cell containing "name" in the header row, then
///    the row above it. Missing names are a warning, not a failure.
pub fn detect_structure(sheet: &Worksheet) -> Result<ColumnMap, DetectError> {
    let max_col = sheet.last_used_column();

    let unit_col = detect_unit_column(sheet).ok_or(DetectError::UnitColumn)?;
    let code_col = detect_code_column(sheet, max_col).ok_or(DetectError::CodeColumn)?;

    let amount_col = scan_row(sheet, HEADER_ROW, max_col, |t| t.contains("amount"))
        .unwrap_or(code_col + 1);

    let name_col = scan_row(sheet, HEADER_ROW, max_col, |t| t.contains("name"))
        .or_else(|| scan_row(sheet, HEADER_ROW - 1, max_col, |t| t.contains("name")));
    if name_col.is_none() {
        log::warn!(
            "sheet '{}': name column not found in rows 5-6, resident names will be blank",
            sheet.name()
        );
    }

    let map = ColumnMap {
        unit_col,
        code_col,
        amount_col,
        name_col,
    };
    log::debug!("sheet '{}': detected columns {:?}", sheet.name(), map);
    Ok(map)
}

fn detect_unit_column(sheet: &Worksheet) -> Option<u16> {
    let title = sheet.text_at(0, 0).to_lowercase();
    if title.starts_with("affordable") {
        Some(2)
    } else if title.starts_with("rent") {
        Some(0)
    } else {
        None
    }
}

fn detect_code_column(sheet: &Worksheet, max_col: u16) -> Option<u16> {
    let is_code_header = |t: &str| t == "code" || t == "rent code";

    scan_row(sheet, HEADER_ROW, max_col, is_code_header)
        .or_else(|| CODE_FALLBACK_ROWS.find_map(|row| scan_row(sheet, row, max_col, is_code_header)))
}

/// Scan one header row left to right for a text cell matching the
/// predicate (applied to the trimmed, lowercased text)
fn scan_row<F>(sheet: &Worksheet, row: u32, max_col: u16, pred: F) -> Option<u16>
where
    F: Fn(&str) -> bool,
{
    (0..=max_col).find(|&col| {
        // Only text cells count as headers; numbers never match
        match sheet.get_value_at(row, col) {
            CellValue::String(s) => pred(&s.as_str().trim().to_lowercase()),
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet_with_title(title: &str) -> Worksheet {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value_at(0, 0, title).unwrap();
        ws.set_cell_value_at(HEADER_ROW, 1, "Code").unwrap();
        ws.set_cell_value_at(HEADER_ROW, 2, "Amount").unwrap();
        ws
    }

    #[test]
    fn test_affordable_layout_uses_column_c() {
        let map = detect_structure(&sheet_with_title("Affordable Rent Roll")).unwrap();
        assert_eq!(map.unit_col, 2);
    }

    #[test]
    fn test_rent_roll_layout_uses_column_a() {
        let map = detect_structure(&sheet_with_title("Rent Roll - May 2024")).unwrap();
        assert_eq!(map.unit_col, 0);
    }

    #[test]
    fn test_unknown_title_fails() {
        let err = detect_structure(&sheet_with_title("Ledger")).unwrap_err();
        assert_eq!(err, DetectError::UnitColumn);
    }

    #[test]
    fn test_code_header_variants() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value_at(0, 0, "Rent Roll").unwrap();
        ws.set_cell_value_at(HEADER_ROW, 3, "  RENT CODE ").unwrap();
        let map = detect_structure(&ws).unwrap();
        assert_eq!(map.code_col, 3);
        // No amount header: defaults to the next column over
        assert_eq!(map.amount_col, 4);
    }

    #[test]
    fn test_code_header_found_via_fallback_rows() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value_at(0, 0, "Rent Roll").unwrap();
        // Header pushed down to on-screen row 9
        ws.set_cell_value_at(8, 2, "Code").unwrap();
        let map = detect_structure(&ws).unwrap();
        assert_eq!(map.code_col, 2);
    }

    #[test]
    fn test_missing_code_header_fails() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value_at(0, 0, "Rent Roll").unwrap();
        ws.set_cell_value_at(HEADER_ROW, 1, "Description").unwrap();
        let err = detect_structure(&ws).unwrap_err();
        assert_eq!(err, DetectError::CodeColumn);
    }

    #[test]
    fn test_numeric_cells_are_not_headers() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value_at(0, 0, "Rent Roll").unwrap();
        ws.set_cell_value_at(HEADER_ROW, 0, 1234.0).unwrap();
        ws.set_cell_value_at(HEADER_ROW, 1, "Code").unwrap();
        let map = detect_structure(&ws).unwrap();
        assert_eq!(map.code_col, 1);
    }

    #[test]
    fn test_name_column_detection() {
        let mut ws = sheet_with_title("Rent Roll");
        ws.set_cell_value_at(HEADER_ROW, 4, "Resident Name").unwrap();
        let map = detect_structure(&ws).unwrap();
        assert_eq!(map.name_col, Some(4));
    }

    #[test]
    fn test_name_column_falls_back_to_row_above() {
        let mut ws = sheet_with_title("Rent Roll");
        ws.set_cell_value_at(HEADER_ROW - 1, 5, "Name").unwrap();
        let map = detect_structure(&ws).unwrap();
        assert_eq!(map.name_col, Some(5));
    }

    #[test]
    fn test_missing_name_column_is_not_fatal() {
        let map = detect_structure(&sheet_with_title("Rent Roll")).unwrap();
        assert_eq!(map.name_col, None);
    }
}
