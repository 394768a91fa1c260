//! The end-to-end processing pipeline
//!
//! Detect, extract, append, format — run in order on the active sheet
//! of one workbook. The caller owns progress reporting via a stage
//! callback; this module has no UI of its own.

use thiserror::Error;

use rentroll_core::Workbook;

use crate::append::append_extracted;
use crate::detect::{detect_structure, DetectError};
use crate::extract::extract_rentroll;
use crate::format::{autofit_columns, highlight_columns};

/// The pipeline stages, in execution order
///
/// Reported through the progress callback as each stage begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Inferring the column layout
    DetectingStructure,
    /// Walking the sheet body and aggregating charges
    ExtractingCharges,
    /// Writing results into appended columns
    AppendingData,
    /// Column sizing and cell highlighting
    Formatting,
}

impl Stage {
    /// Human-readable label for progress display
    pub fn label(&self) -> &'static str {
        match self {
            Stage::DetectingStructure => "Detecting structure",
            Stage::ExtractingCharges => "Extracting charges",
            Stage::AppendingData => "Appending extracted data",
            Stage::Formatting => "Adjusting and highlighting columns",
        }
    }
}

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The workbook has no worksheets at all
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    /// Structure detection failed; nothing was extracted or written
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// A cell write went out of bounds
    #[error(transparent)]
    Core(#[from] rentroll_core::Error),
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Units extracted and written back
    pub units: usize,
    /// Distinct charge codes found
    pub codes: usize,
    /// Column indices appended to the sheet
    pub appended_columns: Vec<u16>,
}

/// Run the full pipeline on the workbook's active sheet
///
/// The progress callback fires at the start of each [`Stage`]. On a
/// detection failure the workbook is left untouched; all later stages
/// only degrade per-cell and cannot fail the run short of an
/// out-of-bounds sheet.
pub fn process_workbook<F>(
    workbook: &mut Workbook,
    mut progress: F,
) -> Result<ProcessSummary, PipelineError>
where
    F: FnMut(Stage),
{
    let sheet_index = workbook.active_sheet();
    let sheet = workbook
        .worksheet_mut(sheet_index)
        .ok_or(PipelineError::EmptyWorkbook)?;

    progress(Stage::DetectingStructure);
    let map = detect_structure(sheet)?;

    progress(Stage::ExtractingCharges);
    let (units, codes) = extract_rentroll(sheet, &map);
    log::info!(
        "extracted {} units, {} distinct charge codes",
        units.len(),
        codes.len()
    );

    progress(Stage::AppendingData);
    let new_cols = append_extracted(sheet, &units, &codes, &map)?;

    progress(Stage::Formatting);
    autofit_columns(sheet, &new_cols)?;
    highlight_columns(sheet, &new_cols)?;

    Ok(ProcessSummary {
        units: units.len(),
        codes: codes.len(),
        appended_columns: new_cols,
    })
}

/// Output file name for a processed workbook
pub fn processed_file_name(input_name: &str) -> String {
    format!("processed_{input_name}")
}
