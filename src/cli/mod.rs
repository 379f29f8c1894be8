//! Command-line parsing for the calibration toolkit.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the acquisition/fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::SensorKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ircal", version, about = "Sharp IR range-finder calibration toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect averaged (distance, voltage) samples over the serial link into a CSV file.
    Acquire(AcquireArgs),
    /// Fit the exponential-sum model to a sample file and compare against the datasheet model.
    Fit(FitArgs),
    /// Re-render the comparison plot from a previously exported model JSON.
    Plot(PlotArgs),
}

/// Options for the acquisition run.
#[derive(Debug, Parser, Clone)]
pub struct AcquireArgs {
    /// Serial port name (e.g. /dev/ttyACM0 on Linux, COMx on Windows).
    pub port: String,

    /// Sensor part code (GP2D120XJ00F, GP2Y0A21YK, GP2Y0A02YK0F).
    #[arg(value_enum)]
    pub sensor: SensorKind,

    /// Distance (cm) between two successive measurement positions (1 or 2 is recommended).
    pub step_cm: f64,

    /// Number of measurements per distance (40 is recommended).
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub samples_per_point: u32,

    /// Output dataset file.
    #[arg(long, default_value = "datapoints.csv")]
    pub out: PathBuf,

    /// Voltage reference of the A/D converter on the device.
    #[arg(long, default_value_t = 5.0)]
    pub aref: f64,

    /// Deadline in milliseconds for one request/response round-trip.
    #[arg(long, default_value_t = 2000)]
    pub timeout_ms: u64,
}

/// Options for fitting a collected dataset.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Sensor part code (GP2D120XJ00F, GP2Y0A21YK, GP2Y0A02YK0F).
    #[arg(value_enum)]
    pub sensor: SensorKind,

    /// The file containing the data.
    pub datafile: PathBuf,

    /// Minimum decay magnitude for grid search.
    #[arg(long, default_value_t = 0.05)]
    pub rate_min: f64,

    /// Maximum decay magnitude for grid search.
    #[arg(long, default_value_t = 20.0)]
    pub rate_max: f64,

    /// Grid steps per decay dimension.
    #[arg(long, default_value_t = 40)]
    pub rate_steps: usize,

    /// Minimum ratio between the fast and slow decay magnitudes.
    #[arg(long, default_value_t = 1.5)]
    pub rate_min_ratio: f64,

    /// Local refinement rounds around the best grid candidate.
    #[arg(long, default_value_t = 2)]
    pub refine_rounds: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the fitted model (params + grid) to JSON.
    #[arg(long = "export-model")]
    pub export_model: Option<PathBuf>,

    /// Export the comparison chart to SVG.
    #[arg(long = "export-plot")]
    pub export_plot: Option<PathBuf>,
}

/// Options for plotting a saved model.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Model JSON file produced by `ircal fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
