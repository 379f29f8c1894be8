//! `ir-curves` library crate.
//!
//! The binary (`ircal`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or opening serial ports
//! - modules are reusable (e.g., future batch-calibration runners, notebooks)
//! - code stays easy to navigate as the project grows

pub mod acquire;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod serial;
