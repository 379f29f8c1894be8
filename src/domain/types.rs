//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during acquisition and fitting
//! - exported to JSON
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Fixed voltage span used for comparison plots and exported model grids.
///
/// All three supported sensors produce meaningful output inside this window,
/// so one span keeps fitted/datasheet curves comparable across parts.
pub const VOLT_PLOT_RANGE: (f64, f64) = (0.3, 3.2);

/// Supported Sharp IR range-finder part codes.
///
/// The enumeration is closed on purpose: an unknown part code is rejected at
/// the CLI boundary by clap, before any file or serial I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SensorKind {
    /// Valid for a range from 3cm to 30cm.
    #[value(name = "GP2D120XJ00F", alias = "gp2d120xj00f")]
    #[serde(rename = "GP2D120XJ00F")]
    Gp2d120xj00f,
    /// Valid for a range from 6cm to 80cm.
    #[value(name = "GP2Y0A21YK", alias = "gp2y0a21yk")]
    #[serde(rename = "GP2Y0A21YK")]
    Gp2y0a21yk,
    /// Valid for a range from 15cm to 150cm.
    #[value(name = "GP2Y0A02YK0F", alias = "gp2y0a02yk0f")]
    #[serde(rename = "GP2Y0A02YK0F")]
    Gp2y0a02yk0f,
}

impl SensorKind {
    /// Manufacturer part code for terminal output and plot titles.
    pub fn part_code(self) -> &'static str {
        match self {
            SensorKind::Gp2d120xj00f => "GP2D120XJ00F",
            SensorKind::Gp2y0a21yk => "GP2Y0A21YK",
            SensorKind::Gp2y0a02yk0f => "GP2Y0A02YK0F",
        }
    }

    /// Working range `(min_cm, max_cm)` over which the sensor output is
    /// meaningful, per the manufacturer datasheet.
    pub fn working_range_cm(self) -> (f64, f64) {
        match self {
            SensorKind::Gp2d120xj00f => (3.0, 30.0),
            SensorKind::Gp2y0a21yk => (6.0, 80.0),
            SensorKind::Gp2y0a02yk0f => (15.0, 150.0),
        }
    }
}

/// A single calibration observation: obstacle distance and averaged sensor
/// output voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub distance_cm: f64,
    pub volts: f64,
}

/// Fitted exponential-sum model parameters.
///
/// `distance_cm(v) = a·e^(b·v) + c·e^(d·v)`
///
/// `b` and `d` are negative for a rangefinder (voltage decays with distance);
/// the fitter guarantees `b <= d` so the fast-decay term comes first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FittedModel {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl FittedModel {
    /// Evaluate the model at the given output voltage.
    pub fn distance_cm(&self, volts: f64) -> f64 {
        self.a * (self.b * volts).exp() + self.c * (self.d * volts).exp()
    }

    /// Parameter vector in `[a, b, c, d]` order (matches terminal output).
    pub fn params(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Fit output: model parameters plus quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: FittedModel,
    pub quality: FitQuality,
}

/// Acquisition run configuration, derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub port: String,
    pub sensor: SensorKind,
    pub step_cm: f64,
    pub samples_per_point: usize,
    /// Voltage reference of the A/D converter on the device.
    pub a_ref: f64,
    pub out: PathBuf,
    /// Deadline for a single request/response round-trip on the serial line.
    pub read_timeout: Duration,
}

/// Fit run configuration, derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub sensor: SensorKind,
    pub data_path: PathBuf,

    pub rate_min: f64,
    pub rate_max: f64,
    pub rate_steps: usize,
    pub rate_min_ratio: f64,
    pub refine_rounds: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_model: Option<PathBuf>,
    pub export_plot: Option<PathBuf>,
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub sensor: SensorKind,
    pub fitted: NaiveDate,
    pub model: FittedModel,
    pub fit_quality: FitQuality,
    pub grid: ModelGrid,
}

/// Precomputed fitted grid for quick downstream plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGrid {
    pub volts: Vec<f64>,
    pub distance_cm: Vec<f64>,
}
