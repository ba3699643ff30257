//! Least squares solver.
//!
//! Used to seed the ARIMA optimiser: the autoregressive part is first estimated
//! by regressing the (demeaned) series on its own lags,
//!
//! ```text
//! minimize Σ (x_t - φ1 x_{t-1} - … - φp x_{t-p})^2
//! ```
//!
//! Implementation choices:
//! - SVD solve, because the lag matrix is tall (more rows than columns) and can
//!   be rank deficient on short or perfectly trending series.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The dimension is tiny (at most 5 columns), so SVD cost is irrelevant.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Regress `x_t` on `x_{t-1}, …, x_{t-p}` (no intercept).
///
/// Returns `None` when there are fewer usable rows than lags or the solve fails.
pub fn lag_regression(x: &[f64], p: usize) -> Option<Vec<f64>> {
    if p == 0 {
        return Some(Vec::new());
    }
    let rows = x.len().checked_sub(p)?;
    if rows < p {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(rows, p);
    let mut target = DVector::<f64>::zeros(rows);
    for r in 0..rows {
        let t = r + p;
        target[r] = x[t];
        for j in 0..p {
            design[(r, j)] = x[t - 1 - j];
        }
    }

    solve_least_squares(&design, &target).map(|b| b.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert_relative_eq!(beta[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(beta[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn lag_regression_recovers_exact_ar1() {
        // x_t = 0.5 x_{t-1}
        let x: Vec<f64> = (0..10).map(|i| 64.0 * 0.5_f64.powi(i)).collect();
        let phi = lag_regression(&x, 1).unwrap();
        assert_relative_eq!(phi[0], 0.5, epsilon = 1e-10);
    }

    #[test]
    fn lag_regression_needs_enough_rows() {
        assert!(lag_regression(&[1.0, 2.0, 3.0], 2).is_none());
        assert_eq!(lag_regression(&[1.0], 0), Some(vec![]));
    }
}
