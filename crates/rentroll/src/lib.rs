//! # rentroll
//!
//! Charge-code extraction for property rent roll spreadsheets.
//!
//! Rent roll workbooks come in two recognized layouts ("Rent Roll" and
//! "Affordable Rent Roll"), both loosely tabular: per-unit charge line
//! items are grouped visually under unit rows, with header cells in
//! inconsistent positions and no explicit schema. This crate infers the
//! column layout, walks the sheet body reconstructing one record per
//! unit (charge code → summed amount, plus a total), and writes the
//! aggregated results back into new columns of the same sheet.
//!
//! ## Pipeline
//!
//! The four stages run in order on a single in-memory workbook:
//!
//! 1. [`detect_structure`] — infer unit/code/amount/name columns
//! 2. [`extract_rentroll`] — segment rows into unit blocks and aggregate
//! 3. [`append_extracted`] — project the results into appended columns
//! 4. [`autofit_columns`] / [`highlight_columns`] — cosmetic finish
//!
//! [`process_workbook`] drives all four and reports stage progress
//! through a caller-supplied callback.
//!
//! ## Example
//!
//! ```rust
//! use rentroll::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Rent Roll").unwrap();
//! sheet.set_cell_value("B6", "Code").unwrap();
//! sheet.set_cell_value("C6", "Amount").unwrap();
//!
//! let map = detect_structure(workbook.worksheet(0).unwrap()).unwrap();
//! assert_eq!(map.unit_col, 0);
//! assert_eq!(map.code_col, 1);
//! ```

pub mod amount;
pub mod append;
pub mod detect;
pub mod extract;
pub mod format;
pub mod pipeline;
pub mod prelude;

// Re-export core types
pub use rentroll_core::{
    CellAddress,
    CellData,
    CellRange,
    // Cell types
    CellValue,
    Color,
    // Error types
    Error,
    FillStyle,
    FontStyle,
    NumberFormat,
    Result,
    // Style types
    Style,
    StylePool,
    // Main types
    Workbook,
    Worksheet,
    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use rentroll_xlsx::{XlsxError, XlsxReader, XlsxWriter};

// Domain operations
pub use amount::parse_amount;
pub use append::append_extracted;
pub use detect::{detect_structure, ColumnMap, DetectError};
pub use extract::{extract_rentroll, extract_rentroll_with, BoldHeaders, CodeOrder, StyleClassifier, UnitRecord};
pub use format::{autofit_columns, highlight_columns, HIGHLIGHT_COLOR};
pub use pipeline::{process_workbook, processed_file_name, PipelineError, ProcessSummary, Stage};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => {
                XlsxWriter::write_file(self, path).map_err(|e| Error::other(e.to_string()))
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}
