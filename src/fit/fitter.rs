//! Low-level fitting for the exponential-sum model.
//!
//! Given:
//! - voltages `v_i`
//! - observed distances `x_i`
//! - a list of candidate decay-rate pairs `[b, d]`
//!
//! we solve, for each rate pair:
//! - an OLS problem to find the best amplitudes `(a, c)`
//! - the resulting SSE
//!
//! and return the best (lowest SSE) candidate, optionally sharpened by a few
//! deterministic local refinement rounds around the incumbent rates.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{FitConfig, FitQuality, FitResult, FittedModel, Sample};
use crate::error::AppError;
use crate::fit::rate_grid::rate_grid;
use crate::math::solve_least_squares;
use crate::models::{fill_design_row, predict};

/// Minimum number of samples required for a meaningful 4-parameter fit.
pub const MIN_SAMPLES: usize = 6;

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    rates: [f64; 2],
    amps: [f64; 2],
    sse: f64,
}

/// Fit the exponential-sum model over a decay-rate grid.
pub fn fit_exp_sum(samples: &[Sample], config: &FitConfig) -> Result<FitResult, AppError> {
    let n = samples.len();
    if n < MIN_SAMPLES {
        return Err(AppError::new(
            3,
            format!("Too few samples to fit: n={n} (need at least {MIN_SAMPLES})."),
        ));
    }

    let volts: Vec<f64> = samples.iter().map(|s| s.volts).collect();
    let cms: Vec<f64> = samples.iter().map(|s| s.distance_cm).collect();
    if volts.iter().chain(cms.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::new(3, "Non-finite value in sample data."));
    }

    let grid = rate_grid(
        config.rate_min,
        config.rate_max,
        config.rate_steps,
        config.rate_min_ratio,
    )?;

    let mut best = search(&grid, &volts, &cms)?;

    // Local refinement: re-grid around the incumbent rates with shrinking
    // spacing. Still a grid search, so the result stays deterministic.
    let coarse_spacing = (config.rate_max / config.rate_min)
        .powf(1.0 / (config.rate_steps as f64 - 1.0));
    for round in 0..config.refine_rounds {
        let factor = coarse_spacing.powf(0.5_f64.powi(round as i32 + 1));
        let local = local_grid(best.rates, factor, config.rate_min_ratio);
        if local.is_empty() {
            break;
        }
        if let Ok(candidate) = search(&local, &volts, &cms) {
            if candidate.sse < best.sse {
                best = candidate;
            }
        }
    }

    let rmse = (best.sse / n as f64).sqrt();
    Ok(FitResult {
        model: FittedModel {
            a: best.amps[0],
            b: best.rates[0],
            c: best.amps[1],
            d: best.rates[1],
        },
        quality: FitQuality {
            sse: best.sse,
            rmse,
            n,
        },
    })
}

fn search(grid: &[[f64; 2]], volts: &[f64], cms: &[f64]) -> Result<Candidate, AppError> {
    // Evaluate each rate pair independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &rates)| {
            evaluate_candidate(rates, volts, cms).map(|(amps, sse)| Candidate {
                idx,
                rates,
                amps,
                sse,
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::new(
            4,
            "Fit failed: no rate candidate produced a finite solution.",
        ));
    }

    // Deterministic selection: pick the minimum SSE; break ties by grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    Ok(best.clone())
}

fn evaluate_candidate(rates: [f64; 2], volts: &[f64], cms: &[f64]) -> Option<([f64; 2], f64)> {
    let n = volts.len();

    let mut x = DMatrix::<f64>::zeros(n, 2);
    let mut y = DVector::<f64>::zeros(n);
    let mut row = [0.0; 2];

    for i in 0..n {
        fill_design_row(volts[i], rates, &mut row);
        if !(row[0].is_finite() && row[1].is_finite()) {
            return None;
        }
        x[(i, 0)] = row[0];
        x[(i, 1)] = row[1];
        y[i] = cms[i];
    }

    let beta = solve_least_squares(&x, &y)?;
    let amps = [beta[0], beta[1]];

    let mut sse = 0.0;
    for i in 0..n {
        let r = cms[i] - predict(volts[i], amps, rates);
        sse += r * r;
    }

    if sse.is_finite() { Some((amps, sse)) } else { None }
}

/// Build a small grid of rate pairs around `center` with multiplicative
/// spacing `factor` on each decay magnitude.
fn local_grid(center: [f64; 2], factor: f64, min_ratio: f64) -> Vec<[f64; 2]> {
    let k_fast = center[0].abs();
    let k_slow = center[1].abs();

    let mut out = Vec::with_capacity(25);
    for i in -2i32..=2 {
        for j in -2i32..=2 {
            let f = k_fast * factor.powi(i);
            let s = k_slow * factor.powi(j);
            if f.is_finite() && s.is_finite() && f > 0.0 && s > 0.0 && f >= min_ratio * s {
                out.push([-f, -s]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SensorKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn base_config() -> FitConfig {
        FitConfig {
            sensor: SensorKind::Gp2d120xj00f,
            data_path: "datapoints.csv".into(),
            rate_min: 0.05,
            rate_max: 20.0,
            rate_steps: 40,
            rate_min_ratio: 1.5,
            refine_rounds: 2,
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_model: None,
            export_plot: None,
        }
    }

    fn synth_samples(amps: [f64; 2], rates: [f64; 2], n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let v = 0.3 + i as f64 * (2.9 / (n as f64 - 1.0));
                Sample {
                    distance_cm: predict(v, amps, rates),
                    volts: v,
                }
            })
            .collect()
    }

    #[test]
    fn recovers_model_when_true_rates_are_on_grid() {
        // log_space(0.5, 4.0, 4) = [0.5, 1.0, 2.0, 4.0] contains both true
        // magnitudes exactly, so the fit should be essentially exact.
        let true_amps = [75.59, 21.31];
        let true_rates = [-4.0, -0.5];
        let samples = synth_samples(true_amps, true_rates, 20);

        let mut config = base_config();
        config.rate_min = 0.5;
        config.rate_max = 4.0;
        config.rate_steps = 4;
        config.refine_rounds = 0;

        let fit = fit_exp_sum(&samples, &config).unwrap();
        assert!((fit.model.b - true_rates[0]).abs() < 1e-12);
        assert!((fit.model.d - true_rates[1]).abs() < 1e-12);
        assert!((fit.model.a - true_amps[0]).abs() < 1e-6);
        assert!((fit.model.c - true_amps[1]).abs() < 1e-6);
        assert!(fit.quality.sse < 1e-12);
    }

    #[test]
    fn refinement_improves_off_grid_rates() {
        // True rates fall between coarse grid points; refinement should bring
        // the SSE down to a small fraction of the working-range scale.
        let true_amps = [70.0, 22.0];
        let true_rates = [-3.877, -0.6346];
        let samples = synth_samples(true_amps, true_rates, 28);

        let config = base_config();
        let fit = fit_exp_sum(&samples, &config).unwrap();

        // Sub-centimeter residuals over a 3..36cm span.
        assert!(fit.quality.rmse < 1.0, "rmse={}", fit.quality.rmse);
        assert!(fit.model.b < fit.model.d, "fast decay should come first");

        // The refined fit must not be worse than the best coarse-grid-only fit.
        let mut coarse_only = config.clone();
        coarse_only.refine_rounds = 0;
        let coarse = fit_exp_sum(&samples, &coarse_only).unwrap();
        assert!(fit.quality.sse <= coarse.quality.sse);
    }

    #[test]
    fn fitted_sse_beats_poor_guess() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.3).unwrap();

        let true_amps = [75.59, 21.31];
        let true_rates = [-3.877, -0.6346];
        let samples: Vec<Sample> = synth_samples(true_amps, true_rates, 28)
            .into_iter()
            .map(|s| Sample {
                distance_cm: s.distance_cm + noise.sample(&mut rng),
                volts: s.volts,
            })
            .collect();

        let fit = fit_exp_sum(&samples, &base_config()).unwrap();

        // A deliberately poor fixed guess: unit amplitudes, unit decay.
        let poor = FittedModel {
            a: 1.0,
            b: -1.0,
            c: 1.0,
            d: -1.0,
        };
        let poor_sse: f64 = samples
            .iter()
            .map(|s| {
                let r = s.distance_cm - poor.distance_cm(s.volts);
                r * r
            })
            .sum();

        assert!(fit.quality.sse <= poor_sse);
    }

    #[test]
    fn rejects_underdetermined_input() {
        let samples = synth_samples([75.0, 21.0], [-3.9, -0.6], MIN_SAMPLES - 1);
        let err = fit_exp_sum(&samples, &base_config()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn rejects_non_finite_samples() {
        let mut samples = synth_samples([75.0, 21.0], [-3.9, -0.6], 10);
        samples[3].volts = f64::NAN;
        let err = fit_exp_sum(&samples, &base_config()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
