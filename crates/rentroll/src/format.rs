//! Cosmetic finish for appended columns
//!
//! Sizes each appended column to its content and restyles its cells so
//! the extracted data stands out from the original sheet.

use rentroll_core::{Color, Result, Worksheet};

/// Font color applied to appended cells
pub const HIGHLIGHT_COLOR: Color = Color::rgb(0xE2, 0x00, 0x00);

/// Padding added on top of the longest rendered value
const WIDTH_PADDING: f64 = 2.0;

/// Size each column to its longest rendered value plus padding
pub fn autofit_columns(sheet: &mut Worksheet, cols: &[u16]) -> Result<()> {
    let last_row = match sheet.last_used_row() {
        Some(r) => r,
        None => return Ok(()),
    };

    for &col in cols {
        let mut max_len = 0usize;
        for row in 0..=last_row {
            max_len = max_len.max(sheet.text_at(row, col).chars().count());
        }
        sheet.set_column_width(col, max_len as f64 + WIDTH_PADDING)?;
    }
    Ok(())
}

/// Restyle every non-empty cell in the given columns with a bold red
/// font, keeping each cell's fill and number format intact
pub fn highlight_columns(sheet: &mut Worksheet, cols: &[u16]) -> Result<()> {
    let last_row = match sheet.last_used_row() {
        Some(r) => r,
        None => return Ok(()),
    };

    for &col in cols {
        for row in 0..=last_row {
            if sheet.get_value_at(row, col).is_empty() {
                continue;
            }
            let mut style = sheet.cell_style_at(row, col).cloned().unwrap_or_default();
            style.font.bold = true;
            style.font.color = HIGHLIGHT_COLOR;
            sheet.set_cell_style_at(row, col, &style)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rentroll_core::{NumberFormat, Style};

    #[test]
    fn test_autofit_uses_longest_value() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value_at(0, 1, "Resident Name").unwrap();
        ws.set_cell_value_at(1, 1, "Alice Smith").unwrap();
        ws.set_cell_value_at(2, 1, "Bo").unwrap();

        autofit_columns(&mut ws, &[1]).unwrap();

        // "Resident Name" is 13 chars
        assert_eq!(ws.column_width(1), 15.0);
    }

    #[test]
    fn test_autofit_empty_column_gets_padding_only() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value_at(0, 0, "x").unwrap();

        autofit_columns(&mut ws, &[5]).unwrap();
        assert_eq!(ws.column_width(5), 2.0);
    }

    #[test]
    fn test_highlight_sets_bold_red_font() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value_at(0, 0, "rent").unwrap();
        ws.set_cell_value_at(1, 0, 1000.0).unwrap();

        highlight_columns(&mut ws, &[0]).unwrap();

        let style = ws.cell_style_at(0, 0).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.font.color, HIGHLIGHT_COLOR);
        assert!(ws.is_bold_at(1, 0));
    }

    #[test]
    fn test_highlight_skips_empty_cells() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value_at(0, 0, "rent").unwrap();
        ws.set_cell_value_at(2, 0, 5.0).unwrap();

        highlight_columns(&mut ws, &[0]).unwrap();
        assert!(!ws.is_bold_at(1, 0));
    }

    #[test]
    fn test_highlight_keeps_number_format() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value_at(0, 0, 1234.5).unwrap();
        let mut style = Style::new();
        style.number_format = NumberFormat::thousands_decimal();
        ws.set_cell_style_at(0, 0, &style).unwrap();

        highlight_columns(&mut ws, &[0]).unwrap();

        let style = ws.cell_style_at(0, 0).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.number_format, NumberFormat::thousands_decimal());
    }
}
