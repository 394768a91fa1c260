//! Charge extraction
//!
//! The sheet body groups charge rows under unit rows with nothing but
//! visual cues to mark the boundaries. Extraction runs in two passes:
//! a pre-pass collects the set of valid unit labels (non-bold cells in
//! the unit column; bold cells there are section headers), then the
//! main pass walks the data rows as a two-state machine, opening a
//! block when a row's unit cell matches a known label and closing it
//! on an explicit "Total" row or at the next block start.

use ahash::{AHashMap, AHashSet};
use rentroll_core::{CellValue, Worksheet};

use crate::amount::parse_amount;
use crate::detect::ColumnMap;

/// First data row (0-based); everything above is header region
const FIRST_DATA_ROW: u32 = 6;

/// Distinguishes section-header cells from data cells
///
/// The stock rent roll layouts mark headers by boldness alone, but the
/// boundary signal is pluggable so an alternate layout can supply its
/// own without touching the extraction logic.
pub trait StyleClassifier {
    /// Whether the cell at (row, col) is a section header, not data
    fn is_header(&self, sheet: &Worksheet, row: u32, col: u16) -> bool;
}

/// The default classifier: bold cells are headers
#[derive(Debug, Default, Clone, Copy)]
pub struct BoldHeaders;

impl StyleClassifier for BoldHeaders {
    fn is_header(&self, sheet: &Worksheet, row: u32, col: u16) -> bool {
        sheet.is_bold_at(row, col)
    }
}

/// Aggregated charges for one unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecord {
    /// Unit identifier, trimmed
    pub unit: String,
    /// Resident name, blank when the sheet has no name column
    pub name: String,
    /// Summed amount per lowercased charge code
    pub charges: AHashMap<String, f64>,
    /// Amount from the block's "Total" row, 0.0 if the block had none
    pub total: f64,
}

impl UnitRecord {
    fn new(unit: String, name: String) -> Self {
        Self {
            unit,
            name,
            charges: AHashMap::new(),
            total: 0.0,
        }
    }

    /// Summed amount for a charge code, 0.0 when the unit has none
    pub fn charge_amount(&self, code: &str) -> f64 {
        self.charges.get(code).copied().unwrap_or(0.0)
    }
}

/// Distinct charge codes in first-occurrence order across the sheet
///
/// Fixes the output column order; never mutated after extraction.
#[derive(Debug, Default, Clone)]
pub struct CodeOrder {
    codes: Vec<String>,
    seen: AHashSet<String>,
}

impl CodeOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a code; only the first occurrence changes the order
    pub fn record(&mut self, code: &str) {
        if self.seen.insert(code.to_string()) {
            self.codes.push(code.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Extraction state machine: either no block is open, or exactly one
/// record is accumulating charges
#[derive(Debug, Default)]
struct Extraction {
    units: Vec<UnitRecord>,
    codes: CodeOrder,
    open: Option<UnitRecord>,
}

impl Extraction {
    /// Open a new block, closing any block still open without a total
    fn start_block(&mut self, unit: String, name: String) {
        if let Some(record) = self.open.take() {
            self.units.push(record);
        }
        self.open = Some(UnitRecord::new(unit, name));
    }

    fn has_open(&self) -> bool {
        self.open.is_some()
    }

    /// Close the open block with its explicit total
    fn close_with_total(&mut self, total: f64) {
        if let Some(mut record) = self.open.take() {
            record.total = total;
            self.units.push(record);
        }
    }

    /// Add an amount to the open block's running sum for a code
    fn add_charge(&mut self, code: &str, amount: f64) {
        if let Some(record) = self.open.as_mut() {
            *record.charges.entry(code.to_string()).or_insert(0.0) += amount;
            self.codes.record(code);
        }
    }

    /// Emit a still-open trailing block; partial data beats silent loss
    fn finish(mut self) -> (Vec<UnitRecord>, CodeOrder) {
        if let Some(record) = self.open.take() {
            self.units.push(record);
        }
        (self.units, self.codes)
    }
}

/// Extract per-unit charge records using the default bold-header
/// classifier
pub fn extract_rentroll(sheet: &Worksheet, map: &ColumnMap) -> (Vec<UnitRecord>, CodeOrder) {
    extract_rentroll_with(sheet, map, &BoldHeaders)
}

/// Extract per-unit charge records with a custom header classifier
///
/// Output units preserve sheet order; the code order preserves first
/// occurrence across the whole sheet.
pub fn extract_rentroll_with(
    sheet: &Worksheet,
    map: &ColumnMap,
    classifier: &dyn StyleClassifier,
) -> (Vec<UnitRecord>, CodeOrder) {
    let last_row = match sheet.last_used_row() {
        Some(r) => r,
        None => return (Vec::new(), CodeOrder::new()),
    };

    // Pre-pass: every non-empty, non-header cell in the unit column is
    // a valid unit label
    let mut unit_labels: AHashSet<String> = AHashSet::new();
    for row in 0..=last_row {
        if classifier.is_header(sheet, row, map.unit_col) {
            continue;
        }
        let text = sheet.text_at(row, map.unit_col);
        if !text.is_empty() {
            unit_labels.insert(text);
        }
    }

    let mut state = Extraction::default();

    for row in FIRST_DATA_ROW..=last_row {
        let unit_text = sheet.text_at(row, map.unit_col);
        let amount = parse_amount(&sheet.get_value_at(row, map.amount_col));

        // Block start; the same row may also carry the first charge,
        // so it falls through to the code handling below
        if !unit_text.is_empty() && unit_labels.contains(&unit_text) {
            let name = map
                .name_col
                .map(|col| name_text(&sheet.get_value_at(row, col)))
                .unwrap_or_default();
            state.start_block(unit_text, name);
        }

        // Rows before the first unit block are ignored
        if !state.has_open() {
            continue;
        }

        match code_text(&sheet.get_value_at(row, map.code_col)) {
            Some(code) if code == "total" => state.close_with_total(amount),
            Some(code) => state.add_charge(&code, amount),
            None => {}
        }
    }

    state.finish()
}

/// Resident names are taken only from text cells
fn name_text(value: &CellValue) -> String {
    match value {
        CellValue::String(s) => s.as_str().to_string(),
        _ => String::new(),
    }
}

/// Charge-code key for a cell: trimmed, lowercased rendered text.
/// Empty cells, zero, and false carry no code.
fn code_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => return None,
        CellValue::Number(n) if *n == 0.0 => return None,
        CellValue::Boolean(false) => return None,
        _ => {}
    }
    let text = value.to_string().trim().to_lowercase();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect_structure;
    use pretty_assertions::assert_eq;
    use rentroll_core::Style;

    /// A minimal Rent Roll layout: units in column A, codes in B,
    /// amounts in C, names in D
    fn base_sheet() -> Worksheet {
        let mut ws = Worksheet::new("Rent Roll");
        ws.set_cell_value_at(0, 0, "Rent Roll").unwrap();
        ws.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
        ws.set_cell_value_at(5, 1, "Code").unwrap();
        ws.set_cell_value_at(5, 2, "Amount").unwrap();
        ws.set_cell_value_at(5, 3, "Name").unwrap();
        ws
    }

    fn map_for(ws: &Worksheet) -> ColumnMap {
        detect_structure(ws).unwrap()
    }

    #[test]
    fn test_single_block_with_total() {
        let mut ws = base_sheet();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 1000.0).unwrap();
        ws.set_cell_value_at(6, 3, "Alice Smith").unwrap();
        ws.set_cell_value_at(7, 1, "fee").unwrap();
        ws.set_cell_value_at(7, 2, 50.0).unwrap();
        ws.set_cell_value_at(8, 1, "Total").unwrap();
        ws.set_cell_value_at(8, 2, 1050.0).unwrap();

        let (units, codes) = extract_rentroll(&ws, &map_for(&ws));

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].unit, "101");
        assert_eq!(units[0].name, "Alice Smith");
        assert_eq!(units[0].charge_amount("rent"), 1000.0);
        assert_eq!(units[0].charge_amount("fee"), 50.0);
        assert_eq!(units[0].total, 1050.0);
        assert_eq!(codes.as_slice(), &["rent".to_string(), "fee".to_string()]);
    }

    #[test]
    fn test_repeated_codes_sum() {
        let mut ws = base_sheet();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 600.0).unwrap();
        ws.set_cell_value_at(7, 1, "RENT").unwrap();
        ws.set_cell_value_at(7, 2, 400.0).unwrap();

        let (units, codes) = extract_rentroll(&ws, &map_for(&ws));

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].charge_amount("rent"), 1000.0);
        assert_eq!(codes.len(), 1);
    }

    #[test]
    fn test_bold_unit_cells_are_not_unit_labels() {
        let mut ws = base_sheet();
        // Bold section header sitting in the unit column
        ws.set_cell_value_at(6, 0, "Building A").unwrap();
        ws.set_cell_style_at(6, 0, &Style::new().bold(true)).unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 999.0).unwrap();
        ws.set_cell_value_at(7, 0, "101").unwrap();
        ws.set_cell_value_at(7, 1, "rent").unwrap();
        ws.set_cell_value_at(7, 2, 800.0).unwrap();

        let (units, _) = extract_rentroll(&ws, &map_for(&ws));

        // The header row's charge lands nowhere: no block was open yet
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].unit, "101");
        assert_eq!(units[0].charge_amount("rent"), 800.0);
    }

    #[test]
    fn test_trailing_block_without_total_is_emitted() {
        let mut ws = base_sheet();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 700.0).unwrap();

        let (units, _) = extract_rentroll(&ws, &map_for(&ws));

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].charge_amount("rent"), 700.0);
        assert_eq!(units[0].total, 0.0);
    }

    #[test]
    fn test_new_block_closes_previous_without_total() {
        let mut ws = base_sheet();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 700.0).unwrap();
        ws.set_cell_value_at(7, 0, "102").unwrap();
        ws.set_cell_value_at(7, 1, "rent").unwrap();
        ws.set_cell_value_at(7, 2, 750.0).unwrap();

        let (units, _) = extract_rentroll(&ws, &map_for(&ws));

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit, "101");
        assert_eq!(units[1].unit, "102");
    }

    #[test]
    fn test_code_order_is_first_occurrence_across_units() {
        let mut ws = base_sheet();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 700.0).unwrap();
        ws.set_cell_value_at(7, 1, "pet").unwrap();
        ws.set_cell_value_at(7, 2, 30.0).unwrap();
        ws.set_cell_value_at(8, 1, "Total").unwrap();
        ws.set_cell_value_at(8, 2, 730.0).unwrap();
        // Second unit lists the shared code after its own new one
        ws.set_cell_value_at(9, 0, "102").unwrap();
        ws.set_cell_value_at(9, 1, "parking").unwrap();
        ws.set_cell_value_at(9, 2, 25.0).unwrap();
        ws.set_cell_value_at(10, 1, "rent").unwrap();
        ws.set_cell_value_at(10, 2, 650.0).unwrap();

        let (_, codes) = extract_rentroll(&ws, &map_for(&ws));

        let order: Vec<&str> = codes.iter().collect();
        assert_eq!(order, vec!["rent", "pet", "parking"]);
    }

    #[test]
    fn test_blank_separator_rows_are_ignored() {
        let mut ws = base_sheet();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 700.0).unwrap();
        // rows 7-8 blank
        ws.set_cell_value_at(9, 1, "fee").unwrap();
        ws.set_cell_value_at(9, 2, 10.0).unwrap();

        let (units, _) = extract_rentroll(&ws, &map_for(&ws));

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].charge_amount("fee"), 10.0);
    }

    #[test]
    fn test_empty_sheet_yields_nothing() {
        let ws = Worksheet::new("Rent Roll");
        let map = ColumnMap {
            unit_col: 0,
            code_col: 1,
            amount_col: 2,
            name_col: None,
        };
        let (units, codes) = extract_rentroll(&ws, &map);
        assert!(units.is_empty());
        assert!(codes.is_empty());
    }

    #[test]
    fn test_missing_name_column_leaves_names_blank() {
        let mut ws = Worksheet::new("Rent Roll");
        ws.set_cell_value_at(0, 0, "Rent Roll").unwrap();
        ws.set_cell_value_at(5, 1, "Code").unwrap();
        ws.set_cell_value_at(5, 2, "Amount").unwrap();
        ws.set_cell_value_at(6, 0, "101").unwrap();
        ws.set_cell_value_at(6, 1, "rent").unwrap();
        ws.set_cell_value_at(6, 2, 700.0).unwrap();

        let map = map_for(&ws);
        assert_eq!(map.name_col, None);

        let (units, _) = extract_rentroll(&ws, &map);
        assert_eq!(units[0].name, "");
    }
}
