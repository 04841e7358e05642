use crate::interface::LocationPoint;
use crate::math::geodesy::haversine_distance;
use crate::prelude::{
    ProcessingStage, StageError, StageInput, StageMetadata, StageOutput, StageResult, TrackConfig,
};
use crate::telemetry::log::LogManager;

/// Greedy single-pass filter: the first point is always kept, every later
/// point only if it lies at least `min_distance_m` from the last kept one.
pub fn filter_by_distance(points: &[LocationPoint], min_distance_m: f64) -> Vec<LocationPoint> {
    let mut kept: Vec<LocationPoint> = Vec::with_capacity(points.len());
    for point in points {
        let keep = match kept.last() {
            None => true,
            Some(last) => haversine_distance(last, point) >= min_distance_m,
        };
        if keep {
            kept.push(point.clone());
        }
    }
    kept
}

/// Sum of the consecutive leg lengths, in metres.
pub fn total_distance(points: &[LocationPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Drops near-duplicate pings before any per-point analytics run.
pub struct DecimationStage {
    config: Option<TrackConfig>,
    logger: LogManager,
}

impl DecimationStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for DecimationStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DecimationStage {
    fn initialize(&mut self, config: &TrackConfig) -> StageResult<()> {
        if !config.min_distance_m.is_finite() || config.min_distance_m < 0.0 {
            return Err(StageError::InvalidInput(format!(
                "minimum distance must be a non-negative number of metres, got {}",
                config.min_distance_m
            )));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let kept = filter_by_distance(&input.points, config.min_distance_m);
        let distance = total_distance(&kept);
        self.logger.record(&format!(
            "DecimationStage kept {} of {} points ({:.1} m)",
            kept.len(),
            input.points.len(),
            distance
        ));

        let metadata = StageMetadata {
            total_distance_m: Some(distance),
            notes: vec![format!(
                "kept {} of {} points at {} m spacing",
                kept.len(),
                input.points.len(),
                config.min_distance_m
            )],
            ..Default::default()
        };

        Ok(StageOutput {
            points: kept,
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

    /// Points along the equator, `step` degrees of longitude apart.
    fn equator_track(steps: &[f64]) -> Vec<LocationPoint> {
        let mut lng = 0.0;
        let mut points = vec![LocationPoint::new(0.0, lng, None, "2024-05-01T10:00:00Z")];
        for (i, step) in steps.iter().enumerate() {
            lng += step;
            points.push(LocationPoint::new(
                0.0,
                lng,
                None,
                format!("2024-05-01T10:00:{:02}Z", i + 1),
            ));
        }
        points
    }

    #[test]
    fn short_sequences_pass_through() {
        assert!(filter_by_distance(&[], 10.0).is_empty());
        let single = equator_track(&[]);
        assert_eq!(filter_by_distance(&single, 10.0), single);
        assert_eq!(total_distance(&single), 0.0);
        assert_eq!(total_distance(&[]), 0.0);
    }

    #[test]
    fn compares_against_last_kept_point() {
        // ~5.6 m steps: every second step crosses 10 m from the last kept point.
        let points = equator_track(&[0.00005; 6]);
        let kept = filter_by_distance(&points, 10.0);
        let lngs: Vec<f64> = kept.iter().map(|p| p.lng).collect();
        assert_eq!(kept.len(), 4);
        assert_eq!(lngs[0], 0.0);
        assert!((lngs[1] - 0.0001).abs() < 1e-12);
        assert!((lngs[3] - 0.0003).abs() < 1e-12);
    }

    #[test]
    fn output_is_spaced_subsequence_starting_with_first() {
        let points = equator_track(&[0.00002, 0.0003, 0.00001, 0.00009, 0.0002, 0.00004, 0.00007]);
        for threshold in [0.0, 5.0, 10.0, 25.0, 100.0] {
            let kept = filter_by_distance(&points, threshold);
            assert_eq!(kept[0], points[0]);

            let mut cursor = points.iter();
            for point in &kept {
                assert!(cursor.any(|candidate| candidate == point));
            }
            for pair in kept.windows(2) {
                assert!(haversine_distance(&pair[0], &pair[1]) >= threshold);
            }
        }
    }

    #[test]
    fn total_distance_grows_as_threshold_shrinks() {
        let points = equator_track(&[0.00002, 0.0003, 0.00001, 0.00009, 0.0002, 0.00004, 0.00007]);
        let mut previous = f64::INFINITY;
        for threshold in [0.0, 2.0, 5.0, 10.0, 25.0, 100.0] {
            let distance = total_distance(&filter_by_distance(&points, threshold));
            assert!(distance <= previous + 1e-9);
            previous = distance;
        }
    }

    #[test]
    fn stage_reports_distance_of_kept_points() {
        let mut stage = DecimationStage::new();
        stage.initialize(&TrackConfig::default()).unwrap();
        let output = stage
            .execute(StageInput {
                points: equator_track(&[0.001, 0.000001, 0.001]),
            })
            .unwrap();
        assert_eq!(output.points.len(), 3);
        let distance = output.metadata.total_distance_m.unwrap();
        assert!((distance - 222.50).abs() < 0.01);
        stage.cleanup();
    }

    #[test]
    fn stage_rejects_negative_threshold_and_missing_init() {
        let mut stage = DecimationStage::new();
        let config = TrackConfig {
            min_distance_m: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            stage.initialize(&config),
            Err(StageError::InvalidInput(_))
        ));
        assert!(matches!(
            stage.execute(StageInput::default()),
            Err(StageError::Internal(_))
        ));
    }
}
