//! Derivative-free minimisation (Nelder–Mead simplex).
//!
//! The ARIMA likelihood is cheap to evaluate but has no convenient analytic
//! gradient once the stationarity transform is applied, so the fitter uses a
//! simplex search. Everything here is deterministic: the initial simplex is a
//! fixed function of the starting point.

/// Outcome of a Nelder–Mead run.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Nelder–Mead settings.
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    pub max_iter: usize,
    /// Converged when the spread of objective values across the simplex, or the
    /// simplex radius, drops below this while the vertices are still distinct
    /// at the scale of their coordinates.
    pub tolerance: f64,
    /// Absolute step used to build the initial simplex around a zero coordinate.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iter: 5_000,
            tolerance: 1e-10,
            initial_step: 0.1,
        }
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl NelderMead {
    /// Minimise `objective` starting at `start`.
    ///
    /// Non-finite objective values are treated as `+∞`, so the simplex walks
    /// away from regions where the objective cannot be evaluated.
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let f = |x: &[f64]| {
            let v = objective(x);
            if v.is_finite() { v } else { f64::INFINITY }
        };

        let n = start.len();
        if n == 0 {
            return Minimum {
                point: Vec::new(),
                value: f(start),
                iterations: 0,
                converged: true,
            };
        }

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(start.to_vec());
        for i in 0..n {
            let mut vertex = start.to_vec();
            let step = if start[i].abs() > 1e-8 {
                0.05 * start[i].abs().max(self.initial_step)
            } else {
                self.initial_step
            };
            vertex[i] += step;
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));
            let best = order[0];
            let worst = order[n];
            let second_worst = order[n - 1];

            let centroid = centroid_without(&simplex, worst);
            let spread = values[worst] - values[best];
            let radius = simplex
                .iter()
                .map(|v| distance(v, &centroid))
                .fold(0.0, f64::max);
            if (spread.is_finite() && spread < self.tolerance) || radius < self.tolerance {
                // A simplex whose vertices are no longer distinguishable at the
                // scale of its coordinates has collapsed, not converged.
                let scale = simplex[best].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                let resolvable = radius.is_finite() && radius > f64::EPSILON * scale;
                converged = values[best].is_finite() && resolvable;
                break;
            }

            let reflected = towards(&centroid, &simplex[worst], -REFLECT);
            let f_reflected = f(&reflected);

            if f_reflected < values[best] {
                let expanded = towards(&centroid, &simplex[worst], -REFLECT * EXPAND);
                let f_expanded = f(&expanded);
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
                continue;
            }

            // Outside contraction when the reflection improved on the worst
            // vertex, inside contraction otherwise.
            let (contracted, bound) = if f_reflected < values[worst] {
                (towards(&centroid, &simplex[worst], -REFLECT * CONTRACT), f_reflected)
            } else {
                (towards(&centroid, &simplex[worst], CONTRACT), values[worst])
            };
            let f_contracted = f(&contracted);
            if f_contracted < bound {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
                continue;
            }

            let anchor = simplex[best].clone();
            for i in 0..=n {
                if i == best {
                    continue;
                }
                simplex[i] = towards(&anchor, &simplex[i], SHRINK);
                values[i] = f(&simplex[i]);
            }
        }

        let best = values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);

        Minimum {
            point: simplex[best].clone(),
            value: values[best],
            iterations,
            converged,
        }
    }
}

/// `from + t * (to - from)`.
fn towards(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(a, b)| a + t * (b - a)).collect()
}

fn centroid_without(simplex: &[Vec<f64>], skip: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let mut c = vec![0.0; n];
    for (i, v) in simplex.iter().enumerate() {
        if i == skip {
            continue;
        }
        for j in 0..n {
            c[j] += v[j];
        }
    }
    let count = (simplex.len() - 1) as f64;
    c.iter_mut().for_each(|x| *x /= count);
    c
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}
