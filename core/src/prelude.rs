use crate::interface::{LocationPoint, PointProgress, SpeedSample};
use serde::{Deserialize, Serialize};

/// Default minimum spacing between kept points, in metres.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 10.0;

/// Default half-width of the speed estimation window.
pub const DEFAULT_MAX_WINDOW: usize = 2;

/// Shared configuration for each processing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    pub min_distance_m: f64,
    pub max_window: usize,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            max_window: DEFAULT_MAX_WINDOW,
        }
    }
}

/// Input payload for a processing stage.
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub points: Vec<LocationPoint>,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub points: Vec<LocationPoint>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub total_distance_m: Option<f64>,
    pub speeds: Vec<SpeedSample>,
    pub progress: Vec<PointProgress>,
    pub notes: Vec<String>,
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// A step of the trajectory pipeline.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}
