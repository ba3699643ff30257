//! ARMA evaluation in state-space form.
//!
//! The fitter relies on three primitive operations:
//! - build the state-space matrices for given AR/MA coefficients
//! - run a Kalman filter to get the exact Gaussian likelihood
//! - propagate the filtered state forward for point forecasts
//!
//! The representation is Harvey's: with `r = max(p, q + 1)`,
//!
//! ```text
//! z_t - μ = [1, 0, …, 0] α_t
//! α_{t+1} = T α_t + R ε_{t+1},   ε ~ N(0, σ²)
//! ```
//!
//! where the first column of `T` holds `φ1..φp`, the superdiagonal is ones and
//! `R = (1, θ1, …, θ_{r-1})'`. The filter runs with `σ² = 1`; the variance is
//! concentrated out of the likelihood afterwards.

use nalgebra::{DMatrix, DVector};

/// Lower bound for the concentrated innovation variance.
///
/// Series are scaled to unit RMS before fitting, so this is relative to the
/// data. It only matters for exactly deterministic inputs (e.g. a straight line
/// after differencing), where the unconstrained estimate would be zero.
const VARIANCE_FLOOR: f64 = 1e-12;

/// ARMA parameters on the (scaled, differenced) series.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmaParams {
    pub mean: f64,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
}

/// Kalman filter output.
#[derive(Debug, Clone)]
pub struct Filtered {
    /// `Σ v_t² / F_t` (standardised squared innovations, `σ² = 1`).
    pub sum_sq: f64,
    /// `Σ ln F_t`.
    pub sum_log_f: f64,
    pub n: usize,
    /// One-step-ahead predicted state after the last observation.
    pub state: DVector<f64>,
}

impl Filtered {
    /// Concentrated log-likelihood and the matching `σ²` estimate.
    pub fn log_likelihood(&self) -> (f64, f64) {
        let n = self.n as f64;
        let sigma2 = (self.sum_sq / n).max(VARIANCE_FLOOR);
        let ll = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + 1.0 + sigma2.ln()) - 0.5 * self.sum_log_f;
        (ll, sigma2)
    }
}

fn state_dim(params: &ArmaParams) -> usize {
    params.ar.len().max(params.ma.len() + 1)
}

/// Transition matrix `T`.
fn transition(params: &ArmaParams, r: usize) -> DMatrix<f64> {
    let mut t = DMatrix::<f64>::zeros(r, r);
    for (i, &phi) in params.ar.iter().enumerate() {
        t[(i, 0)] = phi;
    }
    for i in 0..r.saturating_sub(1) {
        t[(i, i + 1)] = 1.0;
    }
    t
}

/// `R R'` for the shock loading `R = (1, θ1, …)`.
fn shock_covariance(params: &ArmaParams, r: usize) -> DMatrix<f64> {
    let mut loading = DVector::<f64>::zeros(r);
    loading[0] = 1.0;
    for (i, &theta) in params.ma.iter().enumerate() {
        loading[i + 1] = theta;
    }
    &loading * loading.transpose()
}

/// Stationary state covariance: solves `P = T P T' + R R'`.
///
/// Uses the vectorised form `(I - T ⊗ T) vec(P) = vec(R R')`.
/// Returns `None` if the system is singular (unit root).
fn stationary_covariance(t: &DMatrix<f64>, rrt: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let r = t.nrows();
    let lhs = DMatrix::<f64>::identity(r * r, r * r) - t.kronecker(t);
    let rhs = DVector::from_column_slice(rrt.as_slice());
    let vec_p = lhs.lu().solve(&rhs)?;
    let p = DMatrix::from_column_slice(r, r, vec_p.as_slice());
    // Symmetrise away rounding noise.
    let p = (&p + p.transpose()) * 0.5;
    if p.iter().all(|v| v.is_finite()) && p[(0, 0)] > 0.0 {
        Some(p)
    } else {
        None
    }
}

/// Run the Kalman filter over `z`.
///
/// Returns `None` when the likelihood cannot be evaluated (no stationary
/// initial covariance, or a non-positive innovation variance).
pub fn kalman_filter(z: &[f64], params: &ArmaParams) -> Option<Filtered> {
    let r = state_dim(params);
    let t = transition(params, r);
    let rrt = shock_covariance(params, r);
    let mut p = stationary_covariance(&t, &rrt)?;
    let mut a = DVector::<f64>::zeros(r);

    let mut sum_sq = 0.0;
    let mut sum_log_f = 0.0;

    for &obs in z {
        let f = p[(0, 0)];
        if !(f.is_finite() && f > 0.0) {
            return None;
        }
        let v = obs - params.mean - a[0];
        sum_sq += v * v / f;
        sum_log_f += f.ln();

        let pz = p.column(0).clone_owned();
        a += &pz * (v / f);
        p -= (&pz * pz.transpose()) / f;

        a = &t * &a;
        p = &t * &p * t.transpose() + &rrt;
    }

    if !(sum_sq.is_finite() && sum_log_f.is_finite()) {
        return None;
    }

    Some(Filtered {
        sum_sq,
        sum_log_f,
        n: z.len(),
        state: a,
    })
}

/// Point forecasts `h = 1..=horizon` from the filtered state.
pub fn forecast_arma(filtered: &Filtered, params: &ArmaParams, horizon: usize) -> Vec<f64> {
    let r = state_dim(params);
    let t = transition(params, r);
    let mut a = filtered.state.clone();
    let mut out = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        out.push(params.mean + a[0]);
        a = &t * &a;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(mean: f64, ar: &[f64], ma: &[f64]) -> ArmaParams {
        ArmaParams {
            mean,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
        }
    }

    #[test]
    fn ar1_stationary_variance() {
        let p = params(0.0, &[0.5], &[]);
        let t = transition(&p, 1);
        let rrt = shock_covariance(&p, 1);
        let cov = stationary_covariance(&t, &rrt).unwrap();
        assert_relative_eq!(cov[(0, 0)], 1.0 / (1.0 - 0.25), epsilon = 1e-12);
    }

    #[test]
    fn ma1_stationary_variance() {
        // Var(ε_t + θ ε_{t-1}) = 1 + θ².
        let p = params(0.0, &[], &[0.4]);
        let r = state_dim(&p);
        let cov = stationary_covariance(&transition(&p, r), &shock_covariance(&p, r)).unwrap();
        assert_relative_eq!(cov[(0, 0)], 1.16, epsilon = 1e-12);
    }

    #[test]
    fn white_noise_likelihood_matches_closed_form() {
        let z = [0.5, -1.0, 1.5, 0.0];
        let f = kalman_filter(&z, &params(0.0, &[], &[])).unwrap();
        let (ll, sigma2) = f.log_likelihood();
        let s2 = z.iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert_relative_eq!(sigma2, s2, epsilon = 1e-12);
        let expected = -2.0 * ((2.0 * std::f64::consts::PI).ln() + 1.0 + s2.ln());
        assert_relative_eq!(ll, expected, epsilon = 1e-12);
    }

    #[test]
    fn ar1_forecast_decays_to_mean() {
        let p = params(2.0, &[0.5], &[]);
        let f = kalman_filter(&[2.0, 4.0], &p).unwrap();
        let fc = forecast_arma(&f, &p, 3);
        // Last deviation is 2.0, so forecasts are 2 + 2*0.5^h.
        assert_relative_eq!(fc[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(fc[1], 2.5, epsilon = 1e-12);
        assert_relative_eq!(fc[2], 2.25, epsilon = 1e-12);
    }

    #[test]
    fn unit_root_has_no_stationary_covariance() {
        let p = params(0.0, &[1.0], &[]);
        assert!(kalman_filter(&[1.0, 2.0], &p).is_none());
    }
}
