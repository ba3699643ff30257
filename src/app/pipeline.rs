//! Shared pipeline logic, run once per dataset.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! reshape -> aggregate -> split -> fit -> forecast -> evaluate
//!
//! The dashboard then only deals with presentation.

use tracing::{info, info_span, warn};

use crate::data::{aggregate, reshape, split};
use crate::domain::{DatasetRun, DatasetSpec, ForecastResult, ModelOrder, RawTable, SplitConfig};
use crate::error::PipelineError;
use crate::fit::fit_arima;
use crate::io::ingest::load_raw_table;
use crate::report::evaluate;

/// A dataset description together with its table, or the error hit while
/// loading it. Loading happens once; runs reuse the table.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub spec: DatasetSpec,
    pub table: Result<RawTable, PipelineError>,
}

/// One dataset's result for a given order.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOutcome {
    pub key: String,
    pub title: String,
    pub value_label: String,
    pub result: Result<DatasetRun, PipelineError>,
}

/// Read every configured table. Failures are kept per dataset.
pub fn load_datasets(specs: &[DatasetSpec]) -> Vec<LoadedDataset> {
    specs
        .iter()
        .map(|spec| {
            let table = load_raw_table(&spec.path, spec.category_column.as_deref());
            if let Err(err) = &table {
                warn!(dataset = %spec.key, error = %err, "failed to load table");
            }
            LoadedDataset {
                spec: spec.clone(),
                table,
            }
        })
        .collect()
}

/// Run the full pipeline for one table.
pub fn run_dataset(table: &RawTable, order: &ModelOrder, config: &SplitConfig) -> Result<DatasetRun, PipelineError> {
    let reshaped = reshape(table)?;
    let history = aggregate(&reshaped.records);
    info!(years = history.len(), records = reshaped.records.len(), "aggregated");

    let split = split(&history, config, order)?;
    let fitted = fit_arima(&split.train.totals(), order)?;

    let forecast = ForecastResult {
        years: config.test_years().to_vec(),
        values: fitted.forecast(config.horizon())?,
    };
    let report = evaluate(&forecast, &split.test)?;
    info!(mse = report.mse, mae = report.mae, "evaluated");

    Ok(DatasetRun {
        history,
        split,
        forecast,
        report,
        fit: fitted.fit,
        coercion: reshaped.coercion,
    })
}

/// Run every dataset independently with the same order and split.
pub fn run_all(datasets: &[LoadedDataset], order: &ModelOrder, config: &SplitConfig) -> Vec<DatasetOutcome> {
    datasets
        .iter()
        .map(|ds| {
            let span = info_span!("dataset", key = %ds.spec.key, order = %order);
            let _enter = span.enter();

            let result = match &ds.table {
                Ok(table) => run_dataset(table, order, config),
                Err(err) => Err(err.clone()),
            };
            if let Err(err) = &result {
                warn!(kind = err.kind(), error = %err, "dataset run failed");
            }

            DatasetOutcome {
                key: ds.spec.key.clone(),
                title: ds.spec.title.clone(),
                value_label: ds.spec.value_label.clone(),
                result,
            }
        })
        .collect()
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

    fn spec(key: &str) -> DatasetSpec {
        DatasetSpec {
            key: key.to_string(),
            title: key.to_uppercase(),
            value_label: "Total".to_string(),
            path: std::path::PathBuf::from(format!("{key}.csv")),
            category_column: None,
        }
    }

    #[test]
    fn pipeline_reports_stage_errors() {
        let t = table(&["2019", "2020", "2021"], &[("a", &["1", "2", "3"])]);
        let order = ModelOrder::new(5, 2, 5).unwrap();
        let err = run_dataset(&t, &order, &SplitConfig::default()).unwrap_err();
        assert_eq!(err, PipelineError::InsufficientData { needed: 8, got: 2 });
    }

    #[test]
    fn load_failure_is_carried_per_dataset() {
        let good: Vec<String> = (2000..=2023).map(|y| y.to_string()).collect();
        let good_refs: Vec<&str> = good.iter().map(String::as_str).collect();
        let values: Vec<String> = (0..good.len()).map(|i| (i * 2).to_string()).collect();
        let value_refs: Vec<&str> = values.iter().map(String::as_str).collect();

        let datasets = vec![
            LoadedDataset {
                spec: spec("missing"),
                table: Err(PipelineError::Io {
                    path: "missing.csv".to_string(),
                    message: "not found".to_string(),
                }),
            },
            LoadedDataset {
                spec: spec("ok"),
                table: Ok(table(&good_refs, &[("a", &value_refs)])),
            },
        ];
        let out = run_all(&datasets, &ModelOrder::new(0, 1, 0).unwrap(), &SplitConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].result.as_ref().unwrap_err().kind(), "io");
        let run = out[1].result.as_ref().unwrap();
        assert_eq!(run.forecast.values.len(), 3);
        assert_eq!(out[1].title, "OK");
    }

    #[test]
    fn short_test_window_is_a_length_mismatch() {
        let headers: Vec<String> = (2010..=2022).map(|y| y.to_string()).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let cells: Vec<String> = (0..headers.len()).map(|i| (10 + i).to_string()).collect();
        let cell_refs: Vec<&str> = cells.iter().map(String::as_str).collect();
        let t = table(&header_refs, &[("a", &cell_refs)]);
        let err = run_dataset(&t, &ModelOrder::new(0, 1, 0).unwrap(), &SplitConfig::default()).unwrap_err();
        assert_eq!(err, PipelineError::LengthMismatch { forecast: 3, actual: 2 });
    }
}
