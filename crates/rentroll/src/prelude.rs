//! Prelude module - common imports for rentroll users
//!
//! ```rust
//! use rentroll::prelude::*;
//! ```

pub use crate::{
    // Operations
    append_extracted,
    autofit_columns,
    detect_structure,
    extract_rentroll,
    highlight_columns,
    parse_amount,
    process_workbook,
    processed_file_name,

    CellAddress,
    CellRange,
    // Cell types
    CellValue,
    Color,
    // Detection types
    ColumnMap,
    DetectError,

    // Error types
    Error,
    FillStyle,
    FontStyle,
    NumberFormat,
    PipelineError,
    ProcessSummary,
    Result,
    Stage,

    Style,
    // Extraction types
    CodeOrder,
    StyleClassifier,
    UnitRecord,

    // Main types
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,

    // I/O types
    XlsxReader,
    XlsxWriter,
};
