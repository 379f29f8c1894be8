//! Model evaluation for the exponential-sum fit and the datasheet references.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given voltage and decay rates (for OLS)
//! - predict `distance(v)` given amplitudes and rates (for residuals/plots)
//!
//! The datasheet reference models are the closed forms published by Sharp,
//! used only as a comparison baseline. They are keyed by `SensorKind`.

use crate::domain::SensorKind;

/// Fill a design row for the exponential-sum model at the given voltage.
///
/// The model is linear in the amplitudes once the decay rates are fixed:
///
/// `distance(v) = amp[0]·e^(rates[0]·v) + amp[1]·e^(rates[1]·v)`
///
/// # Panics
/// Panics if `out` does not have length 2. Callers should size the array
/// correctly.
pub fn fill_design_row(volts: f64, rates: [f64; 2], out: &mut [f64]) {
    out[0] = (rates[0] * volts).exp();
    out[1] = (rates[1] * volts).exp();
}

/// Predict `distance(v)` for the given amplitudes and decay rates.
pub fn predict(volts: f64, amps: [f64; 2], rates: [f64; 2]) -> f64 {
    amps[0] * (rates[0] * volts).exp() + amps[1] * (rates[1] * volts).exp()
}

/// Evaluate the datasheet-derived reference model: voltage → distance (cm).
///
/// The first two sensors use published exponential sums; the GP2Y0A02YK0F
/// datasheet curve is a quintic polynomial (evaluated in Horner form).
pub fn reference_distance_cm(kind: SensorKind, v: f64) -> f64 {
    match kind {
        SensorKind::Gp2d120xj00f => 75.59 * (-3.877 * v).exp() + 21.31 * (-0.6346 * v).exp(),
        SensorKind::Gp2y0a21yk => 223.9 * (-4.307 * v).exp() + 49.65 * (-0.7061 * v).exp(),
        SensorKind::Gp2y0a02yk0f => {
            v * (v * (v * (v * (-15.01 * v + 136.9) - 495.0) + 896.9) - 846.8) + 385.7
        }
    }
}
