//! End-to-end pipeline tests
//!
//! Each test builds a synthetic rent roll sheet, runs the full
//! pipeline, and checks the appended columns — including after a trip
//! through the XLSX codec, since boldness must survive file I/O for
//! block detection to work on real files.

use pretty_assertions::assert_eq;
use rentroll::prelude::*;
use std::io::Cursor;

/// Two-unit Rent Roll layout: units in A, codes in B, amounts in C,
/// names in D
fn two_unit_workbook() -> Workbook {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();

    let bold = Style::new().bold(true);
    ws.set_cell_value("A1", "Rent Roll - May 2024").unwrap();
    ws.set_cell_style("A1", &bold).unwrap();
    ws.set_cell_value("B6", "Code").unwrap();
    ws.set_cell_value("C6", "Amount").unwrap();
    ws.set_cell_value("D6", "Resident Name").unwrap();
    for addr in ["B6", "C6", "D6"] {
        ws.set_cell_style(addr, &bold).unwrap();
    }

    // Unit 101: rent + fee, explicit total
    ws.set_cell_value("A7", "101").unwrap();
    ws.set_cell_value("B7", "rent").unwrap();
    ws.set_cell_value("C7", 1000.0).unwrap();
    ws.set_cell_value("D7", "Alice Smith").unwrap();
    ws.set_cell_value("B8", "fee").unwrap();
    ws.set_cell_value("C8", "50.00").unwrap();
    ws.set_cell_value("B9", "Total").unwrap();
    ws.set_cell_value("C9", 1050.0).unwrap();

    // Blank separator row 10

    // Unit 102: rent + parking, accounting-style credit on rent
    ws.set_cell_value("A11", "102").unwrap();
    ws.set_cell_value("B11", "rent").unwrap();
    ws.set_cell_value("C11", 950.0).unwrap();
    ws.set_cell_value("D11", "Bob Jones").unwrap();
    ws.set_cell_value("B12", "parking").unwrap();
    ws.set_cell_value("C12", "(25.00)").unwrap();
    ws.set_cell_value("B13", "Total").unwrap();
    ws.set_cell_value("C13", 925.0).unwrap();

    wb
}

#[test]
fn full_pipeline_appends_expected_columns() {
    let mut wb = two_unit_workbook();
    let summary = process_workbook(&mut wb, |_| {}).unwrap();

    assert_eq!(summary.units, 2);
    assert_eq!(summary.codes, 3);
    // Original sheet used A-D; appended block is E-I
    assert_eq!(summary.appended_columns, vec![4, 5, 6, 7, 8]);

    let ws = wb.worksheet(0).unwrap();
    assert_eq!(ws.get_value("E1").unwrap().as_string(), Some("Resident Name"));
    assert_eq!(ws.get_value("F1").unwrap().as_string(), Some("rent"));
    assert_eq!(ws.get_value("G1").unwrap().as_string(), Some("fee"));
    assert_eq!(ws.get_value("H1").unwrap().as_string(), Some("parking"));
    assert_eq!(ws.get_value("I1").unwrap().as_string(), Some("Total Amount"));

    // Unit 101 row
    assert_eq!(ws.get_value("E7").unwrap().as_string(), Some("Alice Smith"));
    assert_eq!(ws.get_value("F7").unwrap().as_number(), Some(1000.0));
    assert_eq!(ws.get_value("G7").unwrap().as_number(), Some(50.0));
    assert_eq!(ws.get_value("H7").unwrap().as_number(), Some(0.0));
    assert_eq!(ws.get_value("I7").unwrap().as_number(), Some(1050.0));

    // Unit 102 row; parenthesized parking charge came through negative
    assert_eq!(ws.get_value("E11").unwrap().as_string(), Some("Bob Jones"));
    assert_eq!(ws.get_value("F11").unwrap().as_number(), Some(950.0));
    assert_eq!(ws.get_value("G11").unwrap().as_number(), Some(0.0));
    assert_eq!(ws.get_value("H11").unwrap().as_number(), Some(-25.0));
    assert_eq!(ws.get_value("I11").unwrap().as_number(), Some(925.0));
}

#[test]
fn appended_cells_are_highlighted_and_sized() {
    let mut wb = two_unit_workbook();
    let summary = process_workbook(&mut wb, |_| {}).unwrap();

    let ws = wb.worksheet(0).unwrap();
    for &col in &summary.appended_columns {
        // Header cell is always non-empty, so always highlighted
        let style = ws.cell_style_at(0, col).expect("header style");
        assert!(style.font.bold);
        assert_eq!(style.font.color, Color::rgb(0xE2, 0, 0));
    }

    // "Resident Name" (13 chars) + padding
    assert_eq!(ws.column_width(4), 15.0);
    // "Total Amount" (12 chars) beats "1050" and "925"
    assert_eq!(ws.column_width(8), 14.0);
}

#[test]
fn pipeline_survives_xlsx_roundtrip() {
    // Write the raw sheet to XLSX first, then process what was read
    // back, so block detection runs against codec-produced styles.
    let wb = two_unit_workbook();
    let mut buf = Cursor::new(Vec::new());
    XlsxWriter::write(&wb, &mut buf).unwrap();
    buf.set_position(0);

    let mut wb = XlsxReader::read(buf).unwrap();
    let summary = process_workbook(&mut wb, |_| {}).unwrap();
    assert_eq!(summary.units, 2);

    // And the processed result survives a second trip
    let mut buf = Cursor::new(Vec::new());
    XlsxWriter::write(&wb, &mut buf).unwrap();
    buf.set_position(0);
    let wb = XlsxReader::read(buf).unwrap();

    let ws = wb.worksheet(0).unwrap();
    assert_eq!(ws.get_value("F7").unwrap().as_number(), Some(1000.0));
    assert!(ws.is_bold_at(0, 4));
    assert_eq!(ws.column_width(4), 15.0);
}

#[test]
fn affordable_layout_reads_units_from_column_c() {
    let mut wb = Workbook::new();
    let ws = wb.worksheet_mut(0).unwrap();

    ws.set_cell_value("A1", "Affordable Rent Roll").unwrap();
    ws.set_cell_style("A1", &Style::new().bold(true)).unwrap();
    ws.set_cell_value("D6", "Rent Code").unwrap();
    ws.set_cell_value("E6", "Amount").unwrap();

    ws.set_cell_value("C7", "APT-3").unwrap();
    ws.set_cell_value("D7", "rent").unwrap();
    ws.set_cell_value("E7", "$2,000").unwrap();
    ws.set_cell_value("D8", "Total").unwrap();
    ws.set_cell_value("E8", 2000.0).unwrap();

    let summary = process_workbook(&mut wb, |_| {}).unwrap();
    assert_eq!(summary.units, 1);

    let ws = wb.worksheet(0).unwrap();
    // Appended after column E: name, rent, total
    assert_eq!(ws.get_value("F1").unwrap().as_string(), Some("Resident Name"));
    assert_eq!(ws.get_value("G7").unwrap().as_number(), Some(2000.0));
    assert_eq!(ws.get_value("H7").unwrap().as_number(), Some(2000.0));
}

#[test]
fn save_and_open_via_workbook_ext() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roll.xlsx");

    let mut wb = two_unit_workbook();
    process_workbook(&mut wb, |_| {}).unwrap();
    wb.save(&path).unwrap();

    let wb2 = Workbook::open(&path).unwrap();
    let ws = wb2.worksheet(0).unwrap();
    assert_eq!(ws.get_value("I7").unwrap().as_number(), Some(1050.0));
}
