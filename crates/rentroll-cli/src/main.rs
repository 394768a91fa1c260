//! Rent roll CLI - charge-code extraction tool

use anyhow::{Context, Result};
use clap::Parser;
use rentroll::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rentroll")]
#[command(
    author,
    version,
    about = "Extract charge codes from Rent Roll and Affordable Rent Roll spreadsheets"
)]
struct Cli {
    /// Input rent roll workbook (.xlsx)
    input: PathBuf,

    /// Directory for the processed file (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Suppress stage progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut workbook = Workbook::open(&cli.input)
        .with_context(|| format!("Failed to open '{}'", cli.input.display()))?;

    let quiet = cli.quiet;
    let summary = process_workbook(&mut workbook, |stage| {
        if !quiet {
            eprintln!("{}...", stage.label());
        }
    })
    .context("Processing failed")?;

    let output_path = output_path_for(&cli.input, cli.output_dir.as_deref())?;
    workbook
        .save(&output_path)
        .with_context(|| format!("Failed to write '{}'", output_path.display()))?;

    println!(
        "Wrote '{}' ({} units, {} charge codes, {} new columns)",
        output_path.display(),
        summary.units,
        summary.codes,
        summary.appended_columns.len()
    );

    Ok(())
}

/// The processed file keeps the input's name with a `processed_`
/// prefix, placed in the output directory or next to the input
fn output_path_for(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Input path '{}' has no file name", input.display()))?;

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    Ok(dir.join(processed_file_name(file_name)))
}
