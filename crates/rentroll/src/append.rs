//! Result write-back
//!
//! Projects extracted unit records into new columns appended after the
//! last used column of the original sheet, keyed by unit label.

use ahash::AHashMap;
use rentroll_core::{Result, Worksheet};

use crate::detect::ColumnMap;
use crate::extract::{CodeOrder, UnitRecord};

/// Header above the resident name column
pub const NAME_HEADER: &str = "Resident Name";
/// Header above the total column
pub const TOTAL_HEADER: &str = "Total Amount";

/// Append the extracted results as new columns
///
/// Layout, starting right after the last used column: a header row
/// (row 1) with "Resident Name", one header per code in first-seen
/// order, then "Total Amount". Each unit's row is found by matching
/// its label against the unit column (first occurrence wins for
/// duplicate labels); codes the unit never incurred are written as
/// 0.0. Units whose label no longer matches any row are dropped.
///
/// Returns the appended column indices, for the formatting pass.
pub fn append_extracted(
    sheet: &mut Worksheet,
    units: &[UnitRecord],
    codes: &CodeOrder,
    map: &ColumnMap,
) -> Result<Vec<u16>> {
    let start_col = sheet.last_used_column() + 1;

    // Header row
    let mut new_cols = Vec::with_capacity(codes.len() + 2);
    sheet.set_cell_value_at(0, start_col, NAME_HEADER)?;
    new_cols.push(start_col);

    let mut col = start_col + 1;
    for code in codes.iter() {
        sheet.set_cell_value_at(0, col, code)?;
        new_cols.push(col);
        col += 1;
    }

    let total_col = col;
    sheet.set_cell_value_at(0, total_col, TOTAL_HEADER)?;
    new_cols.push(total_col);

    // Unit label -> original row; first occurrence wins so duplicate
    // labels never reassign
    let mut unit_rows: AHashMap<String, u32> = AHashMap::new();
    if let Some(last_row) = sheet.last_used_row() {
        for row in 0..=last_row {
            let label = sheet.text_at(row, map.unit_col);
            if !label.is_empty() {
                unit_rows.entry(label).or_insert(row);
            }
        }
    }

    for unit in units {
        let row = match unit_rows.get(unit.unit.trim()) {
            Some(&row) => row,
            // Tolerated degradation: extracted unit with no home row
            None => continue,
        };

        sheet.set_cell_value_at(row, start_col, unit.name.as_str())?;
        for (i, code) in codes.iter().enumerate() {
            let col = start_col + 1 + i as u16;
            sheet.set_cell_value_at(row, col, unit.charge_amount(code))?;
        }
        sheet.set_cell_value_at(row, total_col, unit.total)?;
    }

    Ok(new_cols)
}
