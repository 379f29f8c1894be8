//! Domain types used throughout the toolkit.
//!
//! This module defines:
//!
//! - the closed sensor enumeration (`SensorKind`) with its working ranges
//! - calibration samples (`Sample`)
//! - fit outputs (`FittedModel`, `FitQuality`, `FitResult`)
//! - run configuration (`AcquireConfig`, `FitConfig`)
//! - the model JSON export schema (`ModelFile`)

pub mod types;

pub use types::*;
