//! Read/write model JSON files.
//!
//! Model JSON is the "portable" representation of a fitted transfer function:
//! - the four exponential-sum parameters
//! - run metadata (sensor, fit date, quality)
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitResult, ModelFile, ModelGrid, SensorKind, VOLT_PLOT_RANGE};
use crate::error::AppError;

/// Number of grid points stored in the export.
const GRID_POINTS: usize = 101;

/// Write a model JSON file.
pub fn write_model_json(path: &Path, sensor: SensorKind, best: &FitResult) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display()))
    })?;

    let (volts, distance_cm) = build_grid(best, GRID_POINTS);
    let model_file = ModelFile {
        tool: "ircal".to_string(),
        sensor,
        fitted: chrono::Local::now().date_naive(),
        model: best.model,
        fit_quality: best.quality.clone(),
        grid: ModelGrid { volts, distance_cm },
    };

    serde_json::to_writer_pretty(file, &model_file)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display()))
    })?;
    let model: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    Ok(model)
}

fn build_grid(best: &FitResult, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let (v0, v1) = VOLT_PLOT_RANGE;

    let mut volts = Vec::with_capacity(n);
    let mut distance_cm = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let v = v0 + u * (v1 - v0);
        volts.push(v);
        distance_cm.push(best.model.distance_cm(v));
    }

    (volts, distance_cm)
}
