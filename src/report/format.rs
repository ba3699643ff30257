//! Formatted text for a dataset's results.
//!
//! We keep formatting code in one place so:
//! - the pipeline and fitting code stay free of presentation concerns
//! - output changes are localized and testable without a terminal

use crate::domain::{ArimaFit, DatasetRun};
use crate::error::PipelineError;

/// Text lines describing one dataset's pipeline outcome.
///
/// On success: forecasts for the test years, the held-out actuals, MSE/MAE
/// with two decimals, fit diagnostics and coercion counts. On failure: the
/// error, tagged with its kind.
pub fn format_dataset(result: &Result<DatasetRun, PipelineError>) -> Vec<String> {
    let run = match result {
        Ok(run) => run,
        Err(err) => return vec![format!("Error ({}): {err}", err.kind())],
    };

    let mut out = Vec::new();
    out.push(format!("Forecast for {}:", fmt_year_range(&run.forecast.years)));
    for (year, value) in run.forecast.years.iter().zip(&run.forecast.values) {
        out.push(format!("  {year}: {value:.2}"));
    }

    let actual: Vec<String> = run
        .split
        .test
        .points()
        .iter()
        .map(|p| format!("{}: {:.2}", p.year, p.total))
        .collect();
    out.push(format!("Actual: {}", actual.join("  ")));
    out.push(format!("MSE: {:.2}  MAE: {:.2}", run.report.mse, run.report.mae));
    out.push(format_fit(&run.fit));
    out.push(format!(
        "train={} test={} | cells={} unset={}",
        run.split.train.len(),
        run.split.test.len(),
        run.coercion.cells,
        run.coercion.unset
    ));
    out
}

/// One-line fit diagnostics.
pub fn format_fit(fit: &ArimaFit) -> String {
    let mut s = format!("ARIMA{}", fit.order);
    if !fit.ar.is_empty() {
        s.push_str(&format!(" ar={}", fmt_vec(&fit.ar)));
    }
    if !fit.ma.is_empty() {
        s.push_str(&format!(" ma={}", fmt_vec(&fit.ma)));
    }
    if let Some(mean) = fit.mean {
        s.push_str(&format!(" mean={mean:.3}"));
    }
    s.push_str(&format!(
        " sigma2={:.4e} loglik={:.3} AIC={:.3} BIC={:.3}",
        fit.sigma2, fit.log_likelihood, fit.aic, fit.bic
    ));
    s
}

fn fmt_year_range(years: &[i32]) -> String {
    match (years.first(), years.last()) {
        (Some(a), Some(b)) if a != b => format!("{a}-{b}"),
        (Some(a), _) => a.to_string(),
        _ => "-".to_string(),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}
