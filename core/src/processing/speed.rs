use crate::interface::{LocationPoint, SpeedSample};
use crate::math::geodesy::haversine_distance;
use crate::prelude::{
    ProcessingStage, StageError, StageInput, StageMetadata, StageOutput, StageResult, TrackConfig,
};
use crate::telemetry::log::LogManager;
use crate::time::elapsed_ms;

const KMH_PER_MPS: f64 = 3.6;

/// Half-width of the speed window for a track of `len` points.
pub fn window_size(len: usize, max_window: usize) -> usize {
    max_window.min(len.saturating_sub(1) / 2)
}

/// Windowed average speed in km/h.
///
/// Point `i` gets the speed between points `i - w` and `i + w`, where `w` is
/// [`window_size`]. The first and last `w` points get no sample. A window
/// whose elapsed time is not positive reads as 0 km/h.
pub fn average_speeds(points: &[LocationPoint], max_window: usize) -> Vec<SpeedSample> {
    if points.len() < 3 {
        return Vec::new();
    }
    let window = window_size(points.len(), max_window);
    if window == 0 {
        return Vec::new();
    }

    (window..points.len() - window)
        .map(|index| {
            let first = &points[index - window];
            let last = &points[index + window];
            let distance_m = haversine_distance(first, last);
            let seconds = elapsed_ms(first.timestamp(), last.timestamp()) as f64 / 1000.0;
            let speed_kmh = if seconds > 0.0 {
                distance_m / seconds * KMH_PER_MPS
            } else {
                0.0
            };
            SpeedSample {
                index,
                speed_kmh,
                date: points[index].timestamp(),
            }
        })
        .collect()
}

/// Attaches windowed speed estimates to the kept points.
pub struct SpeedStage {
    config: Option<TrackConfig>,
    logger: LogManager,
}

impl SpeedStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for SpeedStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for SpeedStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()> {
        if config.max_window == 0 {
            return Err(StageError::InvalidInput(
                "speed window must span at least one neighbour".into(),
            ));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let speeds = average_speeds(&input.points, config.max_window);
        let window = window_size(input.points.len(), config.max_window);
        self.logger.record(&format!(
            "SpeedStage {} samples, window ±{}",
            speeds.len(),
            window
        ));

        let metadata = StageMetadata {
            speeds,
            notes: vec![format!("speed window ±{}", window)],
            ..Default::default()
        };

        Ok(StageOutput {
            points: input.points,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
