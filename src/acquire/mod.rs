//! Data acquisition: distance planning and the interactive measurement session.

pub mod plan;
pub mod session;

pub use plan::*;
pub use session::*;
