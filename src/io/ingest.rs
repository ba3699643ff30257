//! CSV ingest.
//!
//! This module is responsible for turning a wide CSV export (one row per
//! category, one column per year) into a `RawTable`.
//!
//! Design goals:
//! - **No numeric parsing here**: cells stay as text; coercion is done by the
//!   reshaper so the policy lives in exactly one place
//! - **Structural errors are dataset errors**: they come back as `PipelineError`
//!   so the caller can keep processing the other dataset
//! - **Deterministic behavior** (no hidden defaults beyond padding short rows)

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{RawRow, RawTable};
use crate::error::PipelineError;

/// Load a wide table from a CSV file.
pub fn load_raw_table(path: &Path, category_column: Option<&str>) -> Result<RawTable, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let table = read_raw_table(file, category_column)?;
    debug!(
        path = %path.display(),
        rows = table.rows.len(),
        years = table.year_headers.len(),
        "loaded table"
    );
    Ok(table)
}

/// Read a wide table from any CSV source.
///
/// The category column is the column named `category_column` (matched
/// case-insensitively) or, when `None`, the first column. All remaining columns
/// are value columns. Rows shorter than the header are padded with empty cells.
pub fn read_raw_table<R: Read>(source: R, category_column: Option<&str>) -> Result<RawTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::parse("<header>", format!("failed to read CSV headers: {e}")))?
        .clone();

    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if names.is_empty() {
        return Err(PipelineError::parse("<header>", "CSV has no columns"));
    }

    let category_idx = match category_column {
        Some(wanted) => names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(wanted.trim()))
            .ok_or_else(|| PipelineError::parse(wanted, "category column not found in CSV header"))?,
        None => 0,
    };

    let year_headers: Vec<String> = names
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != category_idx)
        .map(|(_, n)| n.clone())
        .collect();

    let mut rows = Vec::new();
    let mut blank = 0usize;
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::parse("<row>", format!("line {line}: {e}")))?;
        if record.len() > names.len() {
            return Err(PipelineError::parse(
                "<row>",
                format!("line {line}: {} cells but only {} headers", record.len(), names.len()),
            ));
        }
        // Spreadsheet exports often end with comma-only rows.
        if record.iter().all(str::is_empty) {
            blank += 1;
            continue;
        }
        rows.push(split_row(&record, category_idx, names.len()));
    }
    if blank > 0 {
        debug!(blank, "skipped blank rows");
    }

    Ok(RawTable {
        category_column: names[category_idx].clone(),
        year_headers,
        rows,
    })
}

fn split_row(record: &StringRecord, category_idx: usize, width: usize) -> RawRow {
    let cell = |i: usize| record.get(i).unwrap_or("").to_string();
    RawRow {
        category: cell(category_idx),
        cells: (0..width).filter(|&i| i != category_idx).map(cell).collect(),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Left in place it would turn the first year into a parse error
    // (or hide the category column).
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}
