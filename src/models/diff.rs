//! Differencing and its inverse.

/// Difference a series `d` times. Each pass shortens the series by one.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        if out.len() <= 1 {
            return Vec::new();
        }
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Undo `d` differences for values that continue `history`.
///
/// `differenced` holds future values of the `d`-times differenced series; the
/// result holds the matching future values of the original series. Each level
/// is re-accumulated from the last observed value at that level.
pub fn integrate(differenced: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    let mut out = differenced.to_vec();
    for level in (0..d).rev() {
        let last = difference(history, level).last().copied().unwrap_or(0.0);
        let mut acc = last;
        for v in out.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
    out
}
