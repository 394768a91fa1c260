//! Worksheet type

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get cell value by address string
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices (Empty if the cell does not exist)
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Get the rendered text of a cell, trimmed of surrounding whitespace
    ///
    /// Numbers render via their Display form, empty cells as "".
    pub fn text_at(&self, row: u32, col: u16) -> String {
        match self.cells.get(row, col) {
            Some(c) => c.value.to_string().trim().to_string(),
            None => String::new(),
        }
    }

    /// Get a cell's style index by row/column
    ///
    /// Returns 0 if the cell does not exist or has the default style.
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map(|c| c.style_index).unwrap_or(0)
    }

    /// Get a style by its index in this worksheet's style pool
    pub fn style_by_index(&self, style_index: u32) -> Option<&Style> {
        self.cells.style_pool().get(style_index)
    }

    /// Get the non-default style applied to a cell, if any
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        let idx = self.cell_style_index_at(row, col);
        if idx == 0 {
            None
        } else {
            self.style_by_index(idx)
        }
    }

    /// Check whether a cell renders in a bold font
    pub fn is_bold_at(&self, row: u32, col: u16) -> bool {
        self.cell_style_at(row, col)
            .map(|s| s.font.bold)
            .unwrap_or(false)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style by row and column indices
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Set a raw style index for a cell (index must come from this sheet's pool)
    pub fn set_cell_style_index_at(&mut self, row: u32, col: u16, style_index: u32) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    // === Range Operations ===

    /// Get the used range (bounds of all non-empty cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// The last row index containing data, or None if the sheet is empty
    pub fn last_used_row(&self) -> Option<u32> {
        self.cells.used_bounds().map(|(_, _, max_row, _)| max_row)
    }

    /// The last column index containing data
    ///
    /// Returns 0 for an empty sheet so that appended data starts right
    /// after column A.
    pub fn last_used_column(&self) -> u16 {
        self.cells
            .used_bounds()
            .map(|(_, _, _, max_col)| max_col)
            .unwrap_or(0)
    }

    /// Iterate over all non-empty cells in row order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Iterate over non-empty cells in a specific row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    // === Dimensions ===

    /// Get a column's width in characters
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set a column's width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        self.cells.set_column_width(col, width);
        Ok(())
    }

    /// Get a row's height in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.cells.row_height(row)
    }

    /// Set a row's height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        self.cells.set_row_height(row, height);
        Ok(())
    }

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Add a merged region
    pub fn add_merged_region(&mut self, range: CellRange) {
        self.cells.add_merged_region(range);
    }

    /// Access the underlying cell storage
    pub fn storage(&self) -> &CellStorage {
        &self.cells
    }

    /// Access the underlying cell storage mutably
    pub fn storage_mut(&mut self) -> &mut CellStorage {
        &mut self.cells
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_cell_values() {
        let mut ws = Worksheet::new("Test");

        ws.set_cell_value("A1", "Unit").unwrap();
        ws.set_cell_value_at(0, 1, 42.5).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("Unit"));
        assert_eq!(ws.get_value_at(0, 1).as_number(), Some(42.5));
        assert!(ws.get_value_at(5, 5).is_empty());
    }

    #[test]
    fn test_text_at() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value_at(0, 0, "  Rent Code  ").unwrap();
        ws.set_cell_value_at(1, 0, 1050.0).unwrap();

        assert_eq!(ws.text_at(0, 0), "Rent Code");
        assert_eq!(ws.text_at(1, 0), "1050");
        assert_eq!(ws.text_at(9, 9), "");
    }

    #[test]
    fn test_bold_detection() {
        let mut ws = Worksheet::new("Test");

        ws.set_cell_value_at(0, 0, "Header").unwrap();
        ws.set_cell_style_at(0, 0, &Style::new().bold(true)).unwrap();
        ws.set_cell_value_at(1, 0, "101A").unwrap();

        assert!(ws.is_bold_at(0, 0));
        assert!(!ws.is_bold_at(1, 0));
        assert!(!ws.is_bold_at(7, 7)); // missing cell
    }

    #[test]
    fn test_style_preserved_on_value_change() {
        let mut ws = Worksheet::new("Test");

        ws.set_cell_value_at(0, 0, "x").unwrap();
        ws.set_cell_style_at(0, 0, &Style::new().font_color(Color::RED))
            .unwrap();
        ws.set_cell_value_at(0, 0, "y").unwrap();

        let style = ws.cell_style_at(0, 0).unwrap();
        assert_eq!(style.font.color, Color::RED);
    }

    #[test]
    fn test_last_used_column() {
        let mut ws = Worksheet::new("Test");
        assert_eq!(ws.last_used_column(), 0);

        ws.set_cell_value_at(0, 4, "e").unwrap();
        ws.set_cell_value_at(3, 2, "c").unwrap();
        assert_eq!(ws.last_used_column(), 4);
        assert_eq!(ws.last_used_row(), Some(3));
    }

    #[test]
    fn test_bounds_validation() {
        let mut ws = Worksheet::new("Test");
        assert!(ws.set_cell_value_at(crate::MAX_ROWS, 0, 1.0).is_err());
    }
}
