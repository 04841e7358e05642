use crate::interface::{LocationPoint, PointProgress};
use crate::math::geodesy::haversine_distance;
use crate::prelude::{
    ProcessingStage, StageError, StageInput, StageMetadata, StageOutput, StageResult, TrackConfig,
};
use crate::telemetry::log::LogManager;
use crate::time::elapsed_ms;

/// Running sums of distance and elapsed time from the first point.
pub fn track_progress(points: &[LocationPoint]) -> Vec<PointProgress> {
    let start = points.first().and_then(LocationPoint::timestamp);
    let mut cumulative_distance_m = 0.0;
    let mut previous: Option<&LocationPoint> = None;

    points
        .iter()
        .map(|current| {
            let timestamp = current.timestamp();
            let (incremental_distance_m, incremental_time_s) = match previous {
                Some(prev) => (
                    haversine_distance(prev, current),
                    elapsed_ms(prev.timestamp(), timestamp) as f64 / 1000.0,
                ),
                None => (0.0, 0.0),
            };
            previous = Some(current);
            cumulative_distance_m += incremental_distance_m;

            PointProgress {
                incremental_distance_m,
                incremental_time_s,
                cumulative_distance_m,
                cumulative_time_ms: elapsed_ms(start, timestamp),
            }
        })
        .collect()
}

/// Distance and time bookkeeping for session tables.
pub struct ProgressStage {
    config: Option<TrackConfig>,
    logger: LogManager,
}

impl ProgressStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for ProgressStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for ProgressStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        if self.config.is_none() {
            return Err(StageError::Internal("stage not initialized".into()));
        }

        let progress = track_progress(&input.points);
        let total = progress.last().copied().unwrap_or_default();
        self.logger.record(&format!(
            "ProgressStage {:.1} m over {} ms",
            total.cumulative_distance_m, total.cumulative_time_ms
        ));

        let metadata = StageMetadata {
            total_distance_m: Some(total.cumulative_distance_m),
            progress,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(lng: f64, date: &str) -> LocationPoint {
        LocationPoint::new(0.0, lng, Some(100.0), date)
    }

    #[test]
    fn accumulates_from_first_timestamp() {
        let points = vec![
            timed(0.0, "2024-05-01T10:00:00Z"),
            timed(0.001, "2024-05-01 10:00:10"),
            timed(0.002, "2024-05-01T10:01:10Z"),
        ];
        let progress = track_progress(&points);

        assert_eq!(progress[0], PointProgress::default());
        assert!((progress[1].incremental_distance_m - 111.195).abs() < 0.01);
        assert_eq!(progress[1].incremental_time_s, 10.0);
        assert_eq!(progress[2].incremental_time_s, 60.0);
        assert!((progress[2].cumulative_distance_m - 222.39).abs() < 0.01);
        assert_eq!(progress[2].cumulative_time_ms, 70_000);
    }

    #[test]
    fn unparseable_dates_contribute_no_time() {
        let points = vec![
            timed(0.0, "2024-05-01T10:00:00Z"),
            timed(0.001, "yesterday"),
            timed(0.002, "2024-05-01T10:00:20Z"),
        ];
        let progress = track_progress(&points);
        assert_eq!(progress[1].incremental_time_s, 0.0);
        assert_eq!(progress[1].cumulative_time_ms, 0);
        assert_eq!(progress[2].incremental_time_s, 0.0);
        assert_eq!(progress[2].cumulative_time_ms, 20_000);
        assert!(progress[2].cumulative_distance_m > 222.0);

        let undated_start = vec![timed(0.0, ""), timed(0.001, "2024-05-01T10:00:20Z")];
        assert_eq!(track_progress(&undated_start)[1].cumulative_time_ms, 0);
    }

    #[test]
    fn stage_exposes_total_distance() {
        let mut stage = ProgressStage::new();
        stage.initialize(&TrackConfig::default()).unwrap();
        let output = stage
            .execute(StageInput {
                points: vec![
                    timed(0.0, "2024-05-01T10:00:00Z"),
                    timed(0.001, "2024-05-01T10:00:10Z"),
                ],
            })
            .unwrap();
        assert_eq!(output.metadata.progress.len(), 2);
        assert!((output.metadata.total_distance_m.unwrap() - 111.195).abs() < 0.01);
        stage.cleanup();

        assert!(stage.execute(StageInput::default()).is_err());
    }
}
