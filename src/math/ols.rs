//! Least squares solver.
//!
//! In this project we repeatedly solve small linear regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! The exponential-sum model is linear in the amplitudes given fixed decay
//! rates, so we solve for the amplitudes many times during the rate grid search.
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Because our parameter dimension is tiny (2 columns), SVD performance is
//!   more than acceptable for a calibration run.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    // SVD solve with a relaxed tolerance to handle near-singular matrices.
    // Nearby decay rates produce nearly collinear basis columns, so we use a
    // tolerance ladder that balances numerical stability with acceptance.
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_recovers_exponential_amplitudes() {
        // Two-column exponential design with known amplitudes.
        let rates = [-3.877f64, -0.6346];
        let amps = [75.59, 21.31];
        let volts = [0.4, 0.8, 1.2, 1.6, 2.0, 2.4];

        let mut x = DMatrix::<f64>::zeros(volts.len(), 2);
        let mut y = DVector::<f64>::zeros(volts.len());
        for (i, &v) in volts.iter().enumerate() {
            x[(i, 0)] = (rates[0] * v).exp();
            x[(i, 1)] = (rates[1] * v).exp();
            y[i] = amps[0] * x[(i, 0)] + amps[1] * x[(i, 1)];
        }

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - amps[0]).abs() < 1e-8);
        assert!((beta[1] - amps[1]).abs() < 1e-8);
    }
}
