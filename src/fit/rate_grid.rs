//! Decay-rate grid generation.
//!
//! We fit the exponential-sum model using a deterministic grid search over the
//! two decay rates, with an exact linear solve for the amplitudes at each
//! candidate.
//!
//! Why grid search?
//! - It avoids the local minima and divergence issues of iterative nonlinear
//!   optimizers on this strongly correlated basis.
//! - It is deterministic given the same inputs/flags.
//! - With two nonlinear parameters and a 2-column linear solve per candidate,
//!   a modest grid is fast enough for interactive calibration runs.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid rate range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Rate steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Decay-rate grid: pairs `[b, d]` of negative rates with `b <= d`.
///
/// The grid is built from log-spaced decay *magnitudes* `k`; the model rates
/// are `-k`. The `min_ratio` constraint keeps the fast term separated from the
/// slow term (`k_fast >= min_ratio · k_slow`), which prevents near-duplicate
/// columns from dominating the candidate set.
pub fn rate_grid(
    min: f64,
    max: f64,
    steps: usize,
    min_ratio: f64,
) -> Result<Vec<[f64; 2]>, AppError> {
    if !(min_ratio.is_finite() && min_ratio >= 1.0) {
        return Err(AppError::new(
            2,
            format!("Invalid rate ratio: {min_ratio} (must be finite and >= 1)."),
        ));
    }

    let magnitudes = log_space(min, max, steps)?;

    let mut out = Vec::new();
    for &k_slow in &magnitudes {
        for &k_fast in &magnitudes {
            if k_fast >= min_ratio * k_slow {
                out.push([-k_fast, -k_slow]);
            }
        }
    }

    if out.is_empty() {
        return Err(AppError::new(
            2,
            "Rate grid is empty (min_ratio excludes every candidate pair).",
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_endpoints_inclusive() {
        let values = log_space(0.1, 10.0, 5).unwrap();
        assert_eq!(values.len(), 5);
        assert!((values[0] - 0.1).abs() < 1e-12);
        assert!((values[4] - 10.0).abs() < 1e-9);
        for pair in values.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn log_space_rejects_bad_ranges() {
        assert!(log_space(0.0, 1.0, 5).is_err());
        assert!(log_space(2.0, 1.0, 5).is_err());
        assert!(log_space(0.1, 1.0, 1).is_err());
    }

    #[test]
    fn rate_grid_orders_fast_before_slow() {
        let grid = rate_grid(0.1, 10.0, 8, 1.5).unwrap();
        assert!(!grid.is_empty());
        for [b, d] in grid {
            assert!(b < 0.0 && d < 0.0);
            // b is the fast (more negative) decay.
            assert!(b <= d);
            assert!(b.abs() >= 1.5 * d.abs() - 1e-12);
        }
    }

    #[test]
    fn rate_grid_rejects_impossible_ratio() {
        // A ratio larger than max/min excludes every pair.
        assert!(rate_grid(1.0, 2.0, 4, 10.0).is_err());
    }
}
