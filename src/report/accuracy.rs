//! Out-of-sample accuracy.

use crate::domain::{ErrorReport, ForecastResult, YearlySeries};
use crate::error::PipelineError;

/// Compare forecasts with held-out actuals, position by position.
///
/// Both sides must have the same, non-zero length; the forecast is never
/// truncated or padded to fit.
pub fn evaluate(forecast: &ForecastResult, actual: &YearlySeries) -> Result<ErrorReport, PipelineError> {
    let n = forecast.len();
    if n == 0 || n != actual.len() {
        return Err(PipelineError::LengthMismatch {
            forecast: n,
            actual: actual.len(),
        });
    }

    let (mut sse, mut sae) = (0.0, 0.0);
    for (f, a) in forecast.values.iter().zip(actual.points()) {
        let e = f - a.total;
        sse += e * e;
        sae += e.abs();
    }

    Ok(ErrorReport {
        mse: sse / n as f64,
        mae: sae / n as f64,
    })
}
