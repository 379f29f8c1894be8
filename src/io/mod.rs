//! Input/output helpers.
//!
//! - sample CSV read/write (`samples`)
//! - model JSON read/write (`model`)

pub mod model;
pub mod samples;

pub use model::*;
pub use samples::*;
