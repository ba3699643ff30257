//! Maximum-likelihood ARIMA fitting.
//!
//! Given a training series `y` and an order `(p, d, q)`:
//! - difference `y` `d` times (`w`)
//! - scale `w` to unit RMS (`z`) for conditioning
//! - maximise the exact Gaussian likelihood of ARMA(p, q) on `z` over the
//!   stationary/invertible region (Nelder–Mead on transformed parameters)
//!
//! A mean is estimated only for `d = 0`; differenced models carry no drift.
//! Everything is deterministic: the starting point is a fixed function of the
//! data and the optimiser has no random component.

use tracing::debug;

use crate::domain::{ArimaFit, ModelOrder};
use crate::error::PipelineError;
use crate::math::{constrain_stationary, lag_regression, unconstrain_stationary, Minimum, NelderMead};
use crate::models::{difference, forecast_arma, integrate, kalman_filter, ArmaParams, Filtered};

/// A fitted model, ready to forecast.
#[derive(Debug, Clone)]
pub struct FittedArima {
    pub fit: ArimaFit,
    /// Parameters on the scaled, differenced series.
    params: ArmaParams,
    filtered: Filtered,
    scale: f64,
    history: Vec<f64>,
}

impl FittedArima {
    /// Point forecasts for the next `horizon` steps, on the original scale.
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>, PipelineError> {
        let scaled = forecast_arma(&self.filtered, &self.params, horizon);
        let differenced: Vec<f64> = scaled.iter().map(|v| v * self.scale).collect();
        let out = integrate(&differenced, &self.history, self.fit.order.d());
        if out.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::ModelFit("forecast produced non-finite values".to_string()));
        }
        Ok(out)
    }
}

/// Parameter vector layout: `[mean?, ar_0..ar_p, ma_0..ma_q]`, unconstrained.
#[derive(Debug, Clone, Copy)]
struct Layout {
    mean: bool,
    p: usize,
    q: usize,
}

impl Layout {
    fn len(self) -> usize {
        usize::from(self.mean) + self.p + self.q
    }

    fn unpack(self, x: &[f64]) -> ArmaParams {
        let off = usize::from(self.mean);
        ArmaParams {
            mean: if self.mean { x[0] } else { 0.0 },
            ar: constrain_stationary(&x[off..off + self.p]),
            // Invertible MA: 1 + θ1 z + … has the same roots as the stationary
            // AR polynomial built from the same partials, with θ = -φ.
            ma: constrain_stationary(&x[off + self.p..off + self.p + self.q])
                .into_iter()
                .map(|c| -c)
                .collect(),
        }
    }
}

/// Fit an ARIMA model to `train` by exact maximum likelihood.
pub fn fit_arima(train: &[f64], order: &ModelOrder) -> Result<FittedArima, PipelineError> {
    if train.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::ModelFit("training series contains non-finite values".to_string()));
    }
    let needed = order.min_observations();
    if train.len() < needed {
        return Err(PipelineError::ModelFit(format!(
            "training series has {} observations; order {order} needs at least {needed}",
            train.len()
        )));
    }

    let w = difference(train, order.d());
    let scale = rms(&w);
    let z: Vec<f64> = w.iter().map(|v| v / scale).collect();

    let layout = Layout {
        mean: order.d() == 0,
        p: order.p(),
        q: order.q(),
    };
    let n = z.len() as f64;
    let objective = |x: &[f64]| match kalman_filter(&z, &layout.unpack(x)) {
        Some(f) => -f.log_likelihood().0 / n,
        None => f64::INFINITY,
    };

    let start = starting_values(&z, layout);
    let best = minimize_with_restart(&objective, &start, layout.len())?;
    let params = layout.unpack(&best.point);
    let filtered = kalman_filter(&z, &params)
        .ok_or_else(|| PipelineError::ModelFit("likelihood is not finite at the optimum".to_string()))?;

    let (ll_scaled, sigma2_scaled) = filtered.log_likelihood();
    // Undo the scaling: each observation's density picks up a factor 1/scale.
    let log_likelihood = ll_scaled - n * scale.ln();
    let k = (layout.len() + 1) as f64;

    let fit = ArimaFit {
        order: *order,
        ar: params.ar.clone(),
        ma: params.ma.clone(),
        mean: layout.mean.then(|| params.mean * scale),
        sigma2: sigma2_scaled * scale * scale,
        log_likelihood,
        aic: -2.0 * log_likelihood + 2.0 * k,
        bic: -2.0 * log_likelihood + k * n.ln(),
        n_obs: z.len(),
        iterations: best.iterations,
    };
    debug!(
        order = %order,
        iterations = fit.iterations,
        log_likelihood = fit.log_likelihood,
        ar = ?fit.ar,
        ma = ?fit.ma,
        "ARIMA fit converged"
    );

    Ok(FittedArima {
        fit,
        params,
        filtered,
        scale,
        history: train.to_vec(),
    })
}

/// Run the simplex search, restarting once from the best vertex if the first
/// run does not converge.
///
/// The objective must be finite at `start`; otherwise there is no likelihood to
/// improve on and the order is reported as unfittable.
fn minimize_with_restart<F>(objective: &F, start: &[f64], dim: usize) -> Result<Minimum, PipelineError>
where
    F: Fn(&[f64]) -> f64,
{
    if !objective(start).is_finite() {
        return Err(PipelineError::ModelFit(
            "likelihood cannot be evaluated at the starting values".to_string(),
        ));
    }
    let nm = NelderMead {
        max_iter: 2_000 + 1_000 * dim,
        tolerance: 1e-9,
        ..NelderMead::default()
    };

    let first = nm.minimize(objective, start);
    if first.converged {
        return Ok(first);
    }
    debug!(iterations = first.iterations, "optimizer restart");
    let second = nm.minimize(objective, &first.point);
    let iterations = first.iterations + second.iterations;
    if second.converged {
        return Ok(Minimum { iterations, ..second });
    }
    Err(PipelineError::ModelFit(format!(
        "optimizer did not converge after {iterations} iterations"
    )))
}

/// Deterministic starting point.
///
/// Mean: sample mean. AR: lag regression on the demeaned series, mapped back
/// into the unconstrained space (zeros when the regression is unusable or
/// non-stationary). MA: zeros.
fn starting_values(z: &[f64], layout: Layout) -> Vec<f64> {
    let mut x = Vec::with_capacity(layout.len());
    let mean = if layout.mean { z.iter().sum::<f64>() / z.len() as f64 } else { 0.0 };
    if layout.mean {
        x.push(mean);
    }

    let centered: Vec<f64> = z.iter().map(|v| v - mean).collect();
    let ar = lag_regression(&centered, layout.p)
        .and_then(|phi| unconstrain_stationary(&phi))
        .unwrap_or_else(|| vec![0.0; layout.p]);
    x.extend(ar);
    x.extend(std::iter::repeat(0.0).take(layout.q));
    x
}

/// Root mean square, or 1 for an all-zero series.
fn rms(w: &[f64]) -> f64 {
    let s = (w.iter().map(|v| v * v).sum::<f64>() / w.len().max(1) as f64).sqrt();
    if s.is_finite() && s > 0.0 { s } else { 1.0 }
}
