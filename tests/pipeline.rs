//! End-to-end pipeline runs over in-memory CSV tables.

use arima_dash::app::pipeline::{run_all, run_dataset, LoadedDataset};
use arima_dash::domain::{DatasetSpec, ModelOrder, RawTable, SplitConfig};
use arima_dash::error::PipelineError;
use arima_dash::io::read_raw_table;

/// Land-use table whose totals are 100, 110, ... for 2011..=2023.
/// The "Outros" row is all placeholders and contributes nothing.
fn land_use_csv() -> String {
    let years: Vec<i32> = (2011..=2023).collect();
    let mut csv = String::from("Classe");
    for y in &years {
        csv.push_str(&format!(",{y}"));
    }
    csv.push('\n');
    for (name, base, slope) in [("Floresta", 60.0, 6.0), ("Savana", 40.0, 4.0)] {
        csv.push_str(name);
        for y in &years {
            csv.push_str(&format!(",{}", base + slope * f64::from(y - 2011)));
        }
        csv.push('\n');
    }
    csv.push_str("Outros");
    for _ in &years {
        csv.push_str(",-");
    }
    csv.push('\n');
    csv
}

fn emissions_csv(first_header: &str) -> String {
    let mut csv = format!("Categoria,{first_header}");
    for y in 2001..=2023 {
        csv.push_str(&format!(",{y}"));
    }
    csv.push('\n');
    for (name, scale) in [("Energia", 1.0), ("Agropecuaria", 2.5)] {
        csv.push_str(name);
        for i in 0..=23 {
            let wiggle = if i % 3 == 0 { 4.0 } else { -1.5 };
            csv.push_str(&format!(",{:.2}", scale * (500.0 + 7.0 * f64::from(i) + wiggle)));
        }
        csv.push('\n');
    }
    csv
}

fn table(csv: &str, category: &str) -> RawTable {
    read_raw_table(csv.as_bytes(), Some(category)).unwrap()
}

fn dataset(key: &str, table: Result<RawTable, PipelineError>) -> LoadedDataset {
    LoadedDataset {
        spec: DatasetSpec {
            key: key.to_string(),
            title: key.to_string(),
            value_label: "Total".to_string(),
            path: format!("{key}.csv").into(),
            category_column: None,
        },
        table,
    }
}

#[test]
fn linear_trend_is_continued() {
    let t = table(&land_use_csv(), "Classe");
    let order = ModelOrder::new(1, 1, 0).unwrap();
    let run = run_dataset(&t, &order, &SplitConfig::default()).unwrap();

    assert_eq!(run.history.len(), 13);
    assert_eq!(run.split.train.years(), (2011..=2020).collect::<Vec<_>>());
    assert_eq!(run.split.test.totals(), vec![210.0, 220.0, 230.0]);
    assert_eq!(run.forecast.years, vec![2021, 2022, 2023]);
    for (f, a) in run.forecast.values.iter().zip([210.0, 220.0, 230.0]) {
        assert!((f - a).abs() < 0.05, "forecast {f} vs {a}");
    }
    assert!(run.report.mae < 0.05);
    assert!(run.report.mse < 0.0025);
    assert_eq!(run.coercion.cells, 39);
    assert_eq!(run.coercion.unset, 13);
}

#[test]
fn both_datasets_run_with_the_default_order() {
    let datasets = vec![
        dataset("land-use", Ok(table(&land_use_csv(), "Classe"))),
        dataset("emissions", Ok(table(&emissions_csv("2000"), "Categoria"))),
    ];
    let outcomes = run_all(&datasets, &ModelOrder::default(), &SplitConfig::default());
    assert_eq!(outcomes.len(), 2);
    for o in &outcomes {
        let run = o.result.as_ref().unwrap_or_else(|e| panic!("{}: {e}", o.key));
        assert_eq!(run.forecast.values.len(), 3);
        assert!(run.report.mse >= 0.0 && run.report.mae >= 0.0);
        assert!(run.forecast.values.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn malformed_header_fails_only_its_dataset() {
    let datasets = vec![
        dataset("land-use", Ok(table(&land_use_csv(), "Classe"))),
        dataset("emissions", Ok(table(&emissions_csv("abc"), "Categoria"))),
    ];
    let outcomes = run_all(&datasets, &ModelOrder::new(1, 1, 0).unwrap(), &SplitConfig::default());

    assert!(outcomes[0].result.is_ok());
    match &outcomes[1].result {
        Err(PipelineError::Parse { column, .. }) => assert_eq!(column, "abc"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn trailing_blank_rows_do_not_abort_the_dataset() {
    let blank = format!("{}\n", ",".repeat(13));
    let csv = format!("{}{blank}{blank}", land_use_csv());
    let t = table(&csv, "Classe");
    let run = run_dataset(&t, &ModelOrder::new(1, 1, 0).unwrap(), &SplitConfig::default()).unwrap();
    for (f, a) in run.forecast.values.iter().zip([210.0, 220.0, 230.0]) {
        assert!((f - a).abs() < 0.05, "forecast {f} vs {a}");
    }
}

#[test]
fn repeated_category_labels_are_summed() {
    let csv = "Classe,2019,2020\nFloresta,1,2\nFloresta,10,20\n";
    let t = table(csv, "Classe");
    let reshaped = arima_dash::data::reshape(&t).unwrap();
    let totals = arima_dash::data::aggregate(&reshaped.records).totals();
    assert_eq!(totals, vec![11.0, 22.0]);
}

#[test]
fn two_training_years_with_large_order_is_insufficient() {
    let csv = "Classe,2019,2020,2021,2022,2023\nFloresta,1,2,3,4,5\n";
    let t = table(csv, "Classe");
    let order = ModelOrder::new(5, 2, 5).unwrap();
    let err = run_dataset(&t, &order, &SplitConfig::default()).unwrap_err();
    assert_eq!(err, PipelineError::InsufficientData { needed: 8, got: 2 });
}

#[test]
fn custom_split_window_sets_the_horizon() {
    let t = table(&land_use_csv(), "Classe");
    let config = SplitConfig::window(2018, 2).unwrap();
    let run = run_dataset(&t, &ModelOrder::new(1, 1, 0).unwrap(), &config).unwrap();
    assert_eq!(run.forecast.years, vec![2019, 2020]);
    assert_eq!(run.forecast.values.len(), 2);
}

#[test]
fn outputs_serialize_to_json() {
    let t = table(&land_use_csv(), "Classe");
    let run = run_dataset(&t, &ModelOrder::new(1, 1, 0).unwrap(), &SplitConfig::default()).unwrap();
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["forecast"]["years"], serde_json::json!([2021, 2022, 2023]));
    assert!(json["report"]["mse"].is_number());
    assert_eq!(json["fit"]["order"]["d"], serde_json::json!(1));
}
