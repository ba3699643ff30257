//! Stationarity-preserving reparametrisation of lag polynomials.
//!
//! The optimiser works on unconstrained reals. Each value is squashed into a
//! partial autocorrelation `r ∈ (-1, 1)` and the Durbin–Levinson recursion maps
//! the partial autocorrelations to polynomial coefficients. Any coefficient
//! vector produced this way describes a stationary AR polynomial
//! `1 - φ1 z - … - φp z^p` (roots outside the unit circle).
//!
//! Partial autocorrelations are capped at `±MAX_PARTIAL` so the likelihood
//! stays finite for series that sit on a unit root (e.g. an exact linear trend
//! after one difference).

/// Largest magnitude allowed for a partial autocorrelation.
pub const MAX_PARTIAL: f64 = 0.9999;

/// Map unconstrained values to stationary AR coefficients.
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained
        .iter()
        .map(|&x| (x / (1.0 + x * x).sqrt()).clamp(-MAX_PARTIAL, MAX_PARTIAL))
        .collect();
    partials_to_coefficients(&partials)
}

/// Inverse of [`constrain_stationary`].
///
/// Returns `None` when `coefficients` is not strictly inside the stationary
/// region (some partial autocorrelation has magnitude `>= 1`). Partials beyond
/// the cap are pulled back to it.
pub fn unconstrain_stationary(coefficients: &[f64]) -> Option<Vec<f64>> {
    let partials = coefficients_to_partials(coefficients)?;
    Some(
        partials
            .into_iter()
            .map(|r| {
                let r = r.clamp(-MAX_PARTIAL, MAX_PARTIAL);
                r / (1.0 - r * r).sqrt()
            })
            .collect(),
    )
}

/// Durbin–Levinson: partial autocorrelations to AR coefficients.
pub fn partials_to_coefficients(partials: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, &r) in partials.iter().enumerate() {
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        phi.push(r);
    }
    phi
}

/// Reverse Durbin–Levinson: AR coefficients to partial autocorrelations.
pub fn coefficients_to_partials(coefficients: &[f64]) -> Option<Vec<f64>> {
    let p = coefficients.len();
    let mut phi = coefficients.to_vec();
    let mut partials = vec![0.0; p];
    for k in (0..p).rev() {
        let r = phi[k];
        if !r.is_finite() || r.abs() >= 1.0 {
            return None;
        }
        partials[k] = r;
        let denom = 1.0 - r * r;
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = (prev[j] + r * prev[k - 1 - j]) / denom;
        }
        phi.truncate(k);
    }
    Some(partials)
}
