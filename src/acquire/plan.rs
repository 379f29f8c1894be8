//! Target distance planning.
//!
//! The plan is a finite, restartable sequence of target distances with an
//! explicit inclusive-upper-bound contract. Distances are derived from integer
//! step counts (`min + i·step`) rather than repeated float addition, so a
//! range that divides evenly by the step includes the boundary exactly once
//! instead of drifting past it.

use crate::domain::SensorKind;
use crate::error::AppError;

/// Tolerance, as a fraction of the step size, within which the last step is
/// considered to land exactly on the range maximum.
const STEP_TOL: f64 = 1e-6;

/// A finite ascending sequence of target distances.
#[derive(Debug, Clone, Copy)]
pub struct DistancePlan {
    min_cm: f64,
    step_cm: f64,
    count: usize,
}

impl DistancePlan {
    /// Build a plan over `[min_cm, max_cm]` with the given step.
    ///
    /// The sequence is `min, min+step, min+2·step, …` up to and including the
    /// largest value `<= max_cm` (within `STEP_TOL·step` of it).
    pub fn from_range(min_cm: f64, max_cm: f64, step_cm: f64) -> Result<Self, AppError> {
        if !(step_cm.is_finite() && step_cm > 0.0) {
            return Err(AppError::new(
                2,
                format!("Invalid distance step: {step_cm} (must be finite and > 0)."),
            ));
        }
        if !(min_cm.is_finite() && max_cm.is_finite() && min_cm <= max_cm) {
            return Err(AppError::new(
                2,
                format!("Invalid distance range: [{min_cm}, {max_cm}]."),
            ));
        }

        let steps = ((max_cm - min_cm) / step_cm + STEP_TOL).floor() as usize;
        Ok(Self {
            min_cm,
            step_cm,
            count: steps + 1,
        })
    }

    /// Build a plan covering the sensor's full working range.
    pub fn for_sensor(sensor: SensorKind, step_cm: f64) -> Result<Self, AppError> {
        let (min_cm, max_cm) = sensor.working_range_cm();
        Self::from_range(min_cm, max_cm, step_cm)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Target distance for step `i`, if in range.
    pub fn get(&self, i: usize) -> Option<f64> {
        (i < self.count).then(|| self.min_cm + i as f64 * self.step_cm)
    }

    /// Iterate the sequence from the start. The plan itself is immutable, so
    /// iteration can be restarted any number of times.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|i| self.min_cm + i as f64 * self.step_cm)
    }
}
