//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages without hidden state
//! - handed to a presentation layer as plain structured data
//!
//! Everything here is derived and immutable: a pipeline run recomputes all of it
//! from the raw tables and the chosen model order.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::PipelineError;

/// Largest supported autoregressive order.
pub const MAX_P: usize = 5;
/// Largest supported differencing order.
pub const MAX_D: usize = 2;
/// Largest supported moving-average order.
pub const MAX_Q: usize = 5;

/// A wide table as read from disk: one row per category, one column per year.
///
/// Cells are kept as raw text; numeric coercion is a separate, explicit step
/// (`data::reshape::coerce_cell`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTable {
    /// Header of the category column (e.g. `Classe`).
    pub category_column: String,
    /// Headers of the value columns, in file order. Each should name a year.
    pub year_headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// One category row of a `RawTable`.
///
/// `cells[i]` belongs to `RawTable::year_headers[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRow {
    pub category: String,
    pub cells: Vec<String>,
}

/// A single (category, year, value) observation after reshaping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub category: String,
    pub year: i32,
    /// `None` means the cell was missing or not numeric.
    pub value: Option<f64>,
}

/// Total across categories for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    pub year: i32,
    pub total: f64,
}

/// Yearly totals, ascending by year, one entry per year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearlySeries(pub Vec<YearPoint>);

impl YearlySeries {
    pub fn points(&self) -> &[YearPoint] {
        &self.0
    }

    pub fn years(&self) -> Vec<i32> {
        self.0.iter().map(|p| p.year).collect()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.total).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Train/test year boundaries.
///
/// Training covers every year `<= train_end`; the test window is exactly the
/// listed years. The forecast horizon is the number of test years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitConfig {
    train_end: i32,
    test_years: Vec<i32>,
}

impl SplitConfig {
    /// Build a split configuration from explicit test years.
    ///
    /// Test years must be non-empty, strictly ascending and all after `train_end`,
    /// which keeps train and test disjoint.
    pub fn new(train_end: i32, test_years: Vec<i32>) -> Result<Self, PipelineError> {
        if test_years.is_empty() {
            return Err(PipelineError::InvalidSplit("test window is empty".to_string()));
        }
        if test_years.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PipelineError::InvalidSplit(format!(
                "test years must be strictly ascending: {test_years:?}"
            )));
        }
        if test_years[0] <= train_end {
            return Err(PipelineError::InvalidSplit(format!(
                "test year {} overlaps the training range (<= {train_end})",
                test_years[0]
            )));
        }
        Ok(Self { train_end, test_years })
    }

    /// Contiguous window `[train_end + 1, train_end + k]`.
    pub fn window(train_end: i32, k: usize) -> Result<Self, PipelineError> {
        let k = i32::try_from(k).map_err(|_| PipelineError::InvalidSplit(format!("window too long: {k}")))?;
        Self::new(train_end, (1..=k).map(|i| train_end + i).collect())
    }

    pub fn train_end(&self) -> i32 {
        self.train_end
    }

    pub fn test_years(&self) -> &[i32] {
        &self.test_years
    }

    /// Number of steps the model must forecast.
    pub fn horizon(&self) -> usize {
        self.test_years.len()
    }
}

impl Default for SplitConfig {
    /// Train through 2020, test on 2021–2023.
    fn default() -> Self {
        Self {
            train_end: 2020,
            test_years: vec![2021, 2022, 2023],
        }
    }
}

/// Result of the train/test split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Split {
    pub train: YearlySeries,
    pub test: YearlySeries,
}

/// ARIMA order `(p, d, q)`.
///
/// Fields are private so every value in circulation has passed range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModelOrder {
    p: usize,
    d: usize,
    q: usize,
}

impl ModelOrder {
    /// Validate and build an order. Negative or out-of-range values are rejected.
    pub fn new(p: i64, d: i64, q: i64) -> Result<Self, PipelineError> {
        Ok(Self {
            p: check_component("p", p, MAX_P)?,
            d: check_component("d", d, MAX_D)?,
            q: check_component("q", q, MAX_Q)?,
        })
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn d(&self) -> usize {
        self.d
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Smallest training length that can support this order: `p + d + 1`.
    pub fn min_observations(&self) -> usize {
        self.p + self.d + 1
    }

    /// Copy with one component replaced, re-validated.
    pub fn with_component(self, component: OrderComponent, value: i64) -> Result<Self, PipelineError> {
        let (p, d, q) = (self.p as i64, self.d as i64, self.q as i64);
        match component {
            OrderComponent::P => Self::new(value, d, q),
            OrderComponent::D => Self::new(p, value, q),
            OrderComponent::Q => Self::new(p, d, value),
        }
    }

    pub fn get(&self, component: OrderComponent) -> usize {
        match component {
            OrderComponent::P => self.p,
            OrderComponent::D => self.d,
            OrderComponent::Q => self.q,
        }
    }
}

impl Default for ModelOrder {
    /// ARIMA(1,1,1).
    fn default() -> Self {
        Self { p: 1, d: 1, q: 1 }
    }
}

impl std::fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Names one of the three order parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderComponent {
    P,
    D,
    Q,
}

impl OrderComponent {
    pub const ALL: [OrderComponent; 3] = [OrderComponent::P, OrderComponent::D, OrderComponent::Q];

    pub fn label(self) -> &'static str {
        match self {
            OrderComponent::P => "AR order (p)",
            OrderComponent::D => "Differencing (d)",
            OrderComponent::Q => "MA order (q)",
        }
    }

    pub fn max(self) -> usize {
        match self {
            OrderComponent::P => MAX_P,
            OrderComponent::D => MAX_D,
            OrderComponent::Q => MAX_Q,
        }
    }
}

fn check_component(name: &str, value: i64, max: usize) -> Result<usize, PipelineError> {
    if value < 0 || value > max as i64 {
        return Err(PipelineError::InvalidOrder(format!(
            "{name}={value} is outside [0, {max}]"
        )));
    }
    Ok(value as usize)
}

/// Point forecasts, aligned positionally with the configured test years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Out-of-sample accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorReport {
    pub mse: f64,
    pub mae: f64,
}

/// Estimated ARIMA parameters and fit diagnostics.
///
/// Coefficients follow the sign convention
/// `(1 - φ1 B - … - φp B^p)(1 - B)^d y_t = μ + (1 + θ1 B + … + θq B^q) ε_t`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaFit {
    pub order: ModelOrder,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    /// Mean of the differenced series; only estimated when `d == 0`.
    pub mean: Option<f64>,
    /// Innovation variance `σ²`.
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Observations entering the likelihood (after differencing).
    pub n_obs: usize,
    pub iterations: usize,
}

/// How many cells were coerced to "unset" during reshaping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoercionStats {
    pub cells: usize,
    pub unset: usize,
}

/// Everything one successful pipeline run produces for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRun {
    /// Full yearly history (all years in the table).
    pub history: YearlySeries,
    pub split: Split,
    pub forecast: ForecastResult,
    pub report: ErrorReport,
    pub fit: ArimaFit,
    pub coercion: CoercionStats,
}

/// Static description of an input dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Short identifier used in logs (e.g. `land-use`).
    pub key: String,
    /// Title shown by the presentation layer.
    pub title: String,
    /// Label for the aggregated value (e.g. `Deforestation`).
    pub value_label: String,
    pub path: PathBuf,
    /// Name of the category column. `None` means the first column.
    pub category_column: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_order_rejects_negative_and_out_of_range() {
        assert!(ModelOrder::new(1, 1, 1).is_ok());
        assert!(ModelOrder::new(5, 2, 5).is_ok());
        assert!(matches!(ModelOrder::new(-1, 0, 0), Err(PipelineError::InvalidOrder(_))));
        assert!(matches!(ModelOrder::new(0, 3, 0), Err(PipelineError::InvalidOrder(_))));
        assert!(matches!(ModelOrder::new(0, 0, 6), Err(PipelineError::InvalidOrder(_))));
    }

    #[test]
    fn model_order_min_observations() {
        let order = ModelOrder::new(5, 2, 5).unwrap();
        assert_eq!(order.min_observations(), 8);
        assert_eq!(ModelOrder::default().to_string(), "(1,1,1)");
    }

    #[test]
    fn with_component_revalidates() {
        let order = ModelOrder::default();
        let bumped = order.with_component(OrderComponent::D, 2).unwrap();
        assert_eq!(bumped.d(), 2);
        assert!(order.with_component(OrderComponent::D, 3).is_err());
        assert!(order.with_component(OrderComponent::P, -1).is_err());
    }

    #[test]
    fn split_config_validation() {
        assert!(SplitConfig::new(2020, vec![]).is_err());
        assert!(SplitConfig::new(2020, vec![2020, 2021]).is_err());
        assert!(SplitConfig::new(2020, vec![2022, 2021]).is_err());

        let cfg = SplitConfig::window(2020, 3).unwrap();
        assert_eq!(cfg.test_years(), &[2021, 2022, 2023]);
        assert_eq!(cfg.horizon(), 3);
        assert_eq!(cfg, SplitConfig::default());
    }
}
