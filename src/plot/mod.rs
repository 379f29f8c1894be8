//! Comparison plots: observed samples vs fitted model vs datasheet reference.
//!
//! - deterministic ASCII rendering for the terminal (`ascii`)
//! - SVG export via Plotters (`svg`)

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

/// Number of evenly spaced points used to sample each curve.
pub const CURVE_POINTS: usize = 1000;

/// Sample a voltage→distance function over the given span.
pub(crate) fn sample_curve(
    (v0, v1): (f64, f64),
    n: usize,
    f: impl Fn(f64) -> f64,
) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let v = v0 + (v1 - v0) * i as f64 / (n as f64 - 1.0);
            (v, f(v))
        })
        .collect()
}
