//! Wide-to-long reshaping.
//!
//! A `RawTable` has one row per category and one column per year. Reshaping
//! emits one `LongRecord` per cell, in row-major order.
//!
//! Two parsing policies apply, deliberately different:
//! - **Year headers are strict**: a header that is not an integer fails the
//!   whole table with `PipelineError::Parse`.
//! - **Cells are lenient**: anything that is not a finite number becomes
//!   "unset" (`None`) via [`coerce_cell`]. Source exports use placeholders such
//!   as `-` or `n/a`; those must not abort the run.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::{CoercionStats, LongRecord, RawTable};
use crate::error::PipelineError;

/// Output of [`reshape`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reshaped {
    pub records: Vec<LongRecord>,
    pub coercion: CoercionStats,
}

/// Coerce a raw cell to a number, or "unset".
///
/// Empty text, non-numeric text and non-finite values (`NaN`, `inf`) are all
/// unset. This is the data-cleaning policy for every numeric cell.
pub fn coerce_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a year header.
pub fn parse_year(header: &str) -> Result<i32, PipelineError> {
    header
        .trim()
        .parse::<i32>()
        .map_err(|_| PipelineError::parse(header, "year header is not an integer"))
}

/// Convert a wide table into long records.
pub fn reshape(table: &RawTable) -> Result<Reshaped, PipelineError> {
    let mut years = Vec::with_capacity(table.year_headers.len());
    let mut seen_years = HashSet::new();
    for header in &table.year_headers {
        let year = parse_year(header)?;
        if !seen_years.insert(year) {
            return Err(PipelineError::parse(header, "duplicate year column"));
        }
        years.push(year);
    }

    // Repeated labels are summed downstream like any other rows.
    let mut seen_categories = HashSet::new();
    for row in &table.rows {
        if !seen_categories.insert(row.category.as_str()) {
            warn!(category = %row.category, "duplicate category label; rows will be summed");
        }
    }

    let mut records = Vec::with_capacity(table.rows.len() * years.len());
    let mut coercion = CoercionStats::default();

    for row in &table.rows {
        for (i, &year) in years.iter().enumerate() {
            let raw = row.cells.get(i).map(String::as_str).unwrap_or("");
            let value = coerce_cell(raw);
            coercion.cells += 1;
            if value.is_none() {
                coercion.unset += 1;
                debug!(category = %row.category, year, raw, "cell coerced to unset");
            }
            records.push(LongRecord {
                category: row.category.clone(),
                year,
                value,
            });
        }
    }

    if coercion.cells > 0 && coercion.unset == coercion.cells {
        warn!(cells = coercion.cells, "every cell in the table is unset");
    } else if coercion.unset > 0 {
        info!(unset = coercion.unset, cells = coercion.cells, "coerced non-numeric cells to unset");
    }

    Ok(Reshaped { records, coercion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;

    fn table(headers: &[&str], rows: &[(&str, &[&str])]) -> RawTable {
        RawTable {
            category_column: "Classe".to_string(),
            year_headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(c, cells)| RawRow {
                    category: c.to_string(),
                    cells: cells.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn coerce_cell_policy() {
        assert_eq!(coerce_cell(" 12.5 "), Some(12.5));
        assert_eq!(coerce_cell("-3"), Some(-3.0));
        assert_eq!(coerce_cell(""), None);
        assert_eq!(coerce_cell("-"), None);
        assert_eq!(coerce_cell("n/a"), None);
        assert_eq!(coerce_cell("NaN"), None);
        assert_eq!(coerce_cell("inf"), None);
    }

    #[test]
    fn every_cell_becomes_one_record() {
        let t = table(&["2019", "2020"], &[("Forest", &["1", "x"]), ("Pasture", &["3", "4"])]);
        let out = reshape(&t).unwrap();
        assert_eq!(out.records.len(), 4);
        assert_eq!(out.coercion, CoercionStats { cells: 4, unset: 1 });
        assert_eq!(
            out.records[1],
            LongRecord {
                category: "Forest".to_string(),
                year: 2020,
                value: None
            }
        );
        assert_eq!(out.records[3].value, Some(4.0));
    }

    #[test]
    fn malformed_year_header_fails() {
        let t = table(&["2019", "abc"], &[("Forest", &["1", "2"])]);
        let err = reshape(&t).unwrap_err();
        assert_eq!(err, PipelineError::parse("abc", "year header is not an integer"));
    }

    #[test]
    fn duplicate_categories_are_kept_and_duplicate_years_fail() {
        let t = table(&["2019"], &[("Forest", &["1"]), ("Forest", &["2"])]);
        let out = reshape(&t).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].value, Some(2.0));

        let t = table(&["2019", " 2019"], &[("Forest", &["1", "2"])]);
        assert_eq!(reshape(&t).unwrap_err().kind(), "parse");
    }

    #[test]
    fn missing_cells_are_unset() {
        let t = table(&["2019", "2020"], &[("Forest", &["1"])]);
        let out = reshape(&t).unwrap();
        assert_eq!(out.records[1].value, None);
    }
}
