//! Dashboard configuration from the environment (and `.env`).
//!
//! | variable                        | default                                  |
//! |---------------------------------|------------------------------------------|
//! | `ARIMA_DASH_LAND_USE_CSV`       | `tp_final/MapBiomas-Tabela_de_Dados.csv` |
//! | `ARIMA_DASH_LAND_USE_CATEGORY`  | `Classe`                                 |
//! | `ARIMA_DASH_EMISSIONS_CSV`      | `tp_final/SEEG.csv`                      |
//! | `ARIMA_DASH_EMISSIONS_CATEGORY` | `Categoria`                              |
//! | `ARIMA_DASH_TRAIN_END`          | `2020`                                   |
//! | `ARIMA_DASH_TEST_YEARS`         | `2021,2022,2023`                         |
//! | `ARIMA_DASH_ORDER`              | `1,1,1`                                  |
//! | `ARIMA_DASH_LOG_FILE`           | unset                                    |
//!
//! An empty category variable selects the first column of the table.

use std::path::PathBuf;

use crate::domain::{DatasetSpec, ModelOrder, SplitConfig};
use crate::error::AppError;

pub const ENV_LAND_USE_CSV: &str = "ARIMA_DASH_LAND_USE_CSV";
pub const ENV_LAND_USE_CATEGORY: &str = "ARIMA_DASH_LAND_USE_CATEGORY";
pub const ENV_EMISSIONS_CSV: &str = "ARIMA_DASH_EMISSIONS_CSV";
pub const ENV_EMISSIONS_CATEGORY: &str = "ARIMA_DASH_EMISSIONS_CATEGORY";
pub const ENV_TRAIN_END: &str = "ARIMA_DASH_TRAIN_END";
pub const ENV_TEST_YEARS: &str = "ARIMA_DASH_TEST_YEARS";
pub const ENV_ORDER: &str = "ARIMA_DASH_ORDER";
pub const ENV_LOG_FILE: &str = "ARIMA_DASH_LOG_FILE";

const DEFAULT_LAND_USE_CSV: &str = "tp_final/MapBiomas-Tabela_de_Dados.csv";
const DEFAULT_EMISSIONS_CSV: &str = "tp_final/SEEG.csv";

/// Everything the dashboard needs before it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub datasets: Vec<DatasetSpec>,
    pub split: SplitConfig,
    /// Initial order; the dashboard lets the operator change it.
    pub order: ModelOrder,
    pub log_file: Option<PathBuf>,
}

impl DashboardConfig {
    /// Load `.env` (if present), then read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let land_use = DatasetSpec {
            key: "land-use".to_string(),
            title: "Land use: deforestation".to_string(),
            value_label: "Deforestation".to_string(),
            path: PathBuf::from(get(ENV_LAND_USE_CSV).unwrap_or_else(|| DEFAULT_LAND_USE_CSV.to_string())),
            category_column: category(get(ENV_LAND_USE_CATEGORY), "Classe"),
        };
        let emissions = DatasetSpec {
            key: "emissions".to_string(),
            title: "GHG emissions".to_string(),
            value_label: "Emissions".to_string(),
            path: PathBuf::from(get(ENV_EMISSIONS_CSV).unwrap_or_else(|| DEFAULT_EMISSIONS_CSV.to_string())),
            category_column: category(get(ENV_EMISSIONS_CATEGORY), "Categoria"),
        };

        let train_end = match get(ENV_TRAIN_END) {
            Some(v) => v
                .parse::<i32>()
                .map_err(|_| config_error(ENV_TRAIN_END, &v, "expected a year"))?,
            None => SplitConfig::default().train_end(),
        };
        let test_years = match get(ENV_TEST_YEARS) {
            Some(v) => parse_list::<i32>(&v).ok_or_else(|| config_error(ENV_TEST_YEARS, &v, "expected comma-separated years"))?,
            None => SplitConfig::default().test_years().to_vec(),
        };
        let split = SplitConfig::new(train_end, test_years).map_err(|e| AppError::new(2, e.to_string()))?;

        let order = match get(ENV_ORDER) {
            Some(v) => parse_order(&v).map_err(|msg| config_error(ENV_ORDER, &v, &msg))?,
            None => ModelOrder::default(),
        };

        let log_file = get(ENV_LOG_FILE).filter(|v| !v.is_empty()).map(PathBuf::from);

        Ok(Self {
            datasets: vec![land_use, emissions],
            split,
            order,
            log_file,
        })
    }
}

/// `None` for the variable means the default column; an empty value means
/// "first column".
fn category(value: Option<String>, default: &str) -> Option<String> {
    match value {
        None => Some(default.to_string()),
        Some(v) if v.is_empty() => None,
        Some(v) => Some(v),
    }
}

fn parse_list<T: std::str::FromStr>(raw: &str) -> Option<Vec<T>> {
    raw.split(',').map(|s| s.trim().parse::<T>().ok()).collect()
}

fn parse_order(raw: &str) -> Result<ModelOrder, String> {
    let parts = parse_list::<i64>(raw).ok_or_else(|| "expected p,d,q".to_string())?;
    let [p, d, q] = parts[..] else {
        return Err("expected exactly three values p,d,q".to_string());
    };
    ModelOrder::new(p, d, q).map_err(|e| e.to_string())
}

fn config_error(key: &str, value: &str, msg: &str) -> AppError {
    AppError::new(2, format!("Invalid {key}='{value}': {msg}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DashboardConfig, AppError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        DashboardConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.split, SplitConfig::default());
        assert_eq!(cfg.order, ModelOrder::default());
        assert_eq!(cfg.datasets.len(), 2);
        assert_eq!(cfg.datasets[0].category_column.as_deref(), Some("Classe"));
        assert_eq!(cfg.datasets[1].category_column.as_deref(), Some("Categoria"));
        assert_eq!(cfg.datasets[1].path, PathBuf::from("tp_final/SEEG.csv"));
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            (ENV_TRAIN_END, "2015"),
            (ENV_TEST_YEARS, "2016, 2017"),
            (ENV_ORDER, "2,0,1"),
            (ENV_LAND_USE_CATEGORY, ""),
            (ENV_LOG_FILE, "dash.log"),
        ])
        .unwrap();
        assert_eq!(cfg.split.train_end(), 2015);
        assert_eq!(cfg.split.test_years(), &[2016, 2017]);
        assert_eq!(cfg.order, ModelOrder::new(2, 0, 1).unwrap());
        assert_eq!(cfg.datasets[0].category_column, None);
        assert_eq!(cfg.log_file, Some(PathBuf::from("dash.log")));
    }

    #[test]
    fn invalid_values_exit_with_code_2() {
        for vars in [
            vec![(ENV_ORDER, "1,1")],
            vec![(ENV_ORDER, "9,0,0")],
            vec![(ENV_TRAIN_END, "twenty")],
            vec![(ENV_TEST_YEARS, "2019")],
            vec![(ENV_TEST_YEARS, "2021,x")],
        ] {
            let err = config(&vars).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{vars:?}");
        }
    }
}
