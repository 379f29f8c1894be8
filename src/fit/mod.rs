//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate decay-rate grids for the exponential-sum model
//! - evaluate each candidate rate pair (parallel)
//! - refine around the incumbent and return the best fit

pub mod fitter;
pub mod rate_grid;

pub use fitter::*;
pub use rate_grid::*;
