//! Core trajectory processing for the Rust GPS tracker.
//!
//! Fetched location pings flow through a fixed set of stages (decimation,
//! windowed speed estimation, cumulative progress) and are joined into a
//! [`interface::TrajectoryReport`] for charts and tables.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod time;

pub use prelude::{ProcessingStage, StageInput, StageOutput};
