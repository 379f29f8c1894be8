//! Formatted terminal output for fit runs.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{FitConfig, FitResult, Sample, SensorKind};
use crate::models::reference_distance_cm;

/// RMSE of the datasheet reference model over the observed samples.
///
/// This is the baseline the fitted model is meant to beat: the datasheet
/// curve describes a typical part, while the fit describes *this* part.
pub fn reference_rmse(sensor: SensorKind, samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let sse: f64 = samples
        .iter()
        .map(|s| {
            let r = s.distance_cm - reference_distance_cm(sensor, s.volts);
            r * r
        })
        .sum();
    (sse / samples.len() as f64).sqrt()
}

/// Format the full run summary (dataset stats + fitted parameters + quality).
pub fn format_fit_summary(config: &FitConfig, samples: &[Sample], fit: &FitResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== ircal - {} calibration fit ===\n",
        config.sensor.part_code()
    ));
    out.push_str(&format!("Data: '{}'\n", config.data_path.display()));

    let (v_lo, v_hi) = span(samples.iter().map(|s| s.volts));
    let (x_lo, x_hi) = span(samples.iter().map(|s| s.distance_cm));
    out.push_str(&format!(
        "Samples: n={} | V=[{v_lo:.2}, {v_hi:.2}] | x=[{x_lo:.2}, {x_hi:.2}]cm\n",
        samples.len()
    ));

    out.push('\n');
    out.push_str(&format!("parameters =  {}\n", fmt_params(fit.model.params())));

    out.push_str("\nFit quality:\n");
    out.push_str(&format!("- SSE:  {:.4}\n", fit.quality.sse));
    out.push_str(&format!("- RMSE: {:.4}cm\n", fit.quality.rmse));
    out.push_str(&format!(
        "- datasheet model RMSE over the same samples: {:.4}cm\n",
        reference_rmse(config.sensor, samples)
    ));

    out
}

fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

fn fmt_params(params: [f64; 4]) -> String {
    let inner = params
        .iter()
        .map(|p| format!("{p:.6}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}
