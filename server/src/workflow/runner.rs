use anyhow::Context;
use log::debug;
use trackcore::interface::{sort_chronologically, LocationPoint, TrajectoryReport};
use trackcore::prelude::{ProcessingStage, StageInput, TrackConfig};
use trackcore::processing::{DecimationStage, ProgressStage, SpeedStage};

/// Chains the core stages into a [`TrajectoryReport`].
#[derive(Clone)]
pub struct Runner {
    config: TrackConfig,
}

impl Runner {
    pub fn new(config: TrackConfig) -> Self {
        Self { config }
    }

    /// Same pipeline with a different decimation threshold.
    pub fn with_min_distance(&self, min_distance_m: f64) -> Self {
        Self {
            config: TrackConfig {
                min_distance_m,
                ..self.config.clone()
            },
        }
    }

    pub fn execute(&self, points: Vec<LocationPoint>) -> anyhow::Result<TrajectoryReport> {
        let raw_count = points.len();
        let mut points = points;
        sort_chronologically(&mut points);

        let mut decimation_stage = DecimationStage::new();
        decimation_stage
            .initialize(&self.config)
            .context("initializing decimation stage")?;
        let mut decimated = decimation_stage
            .execute(StageInput { points })
            .context("executing decimation stage")?;
        decimation_stage.cleanup();
        let mut notes = std::mem::take(&mut decimated.metadata.notes);

        let mut speed_stage = SpeedStage::new();
        speed_stage
            .initialize(&self.config)
            .context("initializing speed stage")?;
        let speed_output = speed_stage
            .execute(StageInput {
                points: decimated.points,
            })
            .context("executing speed stage")?;
        speed_stage.cleanup();
        notes.extend(speed_output.metadata.notes);

        let mut progress_stage = ProgressStage::new();
        progress_stage
            .initialize(&self.config)
            .context("initializing progress stage")?;
        let progress_output = progress_stage
            .execute(StageInput {
                points: speed_output.points,
            })
            .context("executing progress stage")?;
        progress_stage.cleanup();
        notes.extend(progress_output.metadata.notes);
        for note in &notes {
            debug!("trajectory note: {}", note);
        }

        debug!(
            "trajectory: {} raw, {} kept, {:.1} m",
            raw_count,
            progress_output.points.len(),
            progress_output.metadata.total_distance_m.unwrap_or(0.0)
        );

        let mut report = TrajectoryReport::assemble(
            raw_count,
            progress_output.points,
            progress_output.metadata.progress,
            speed_output.metadata.speeds,
        );
        report.notes = notes;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_route, GeneratorConfig};

    fn ping(lng: f64, date: &str) -> LocationPoint {
        LocationPoint::new(0.0, lng, Some(50.0), date)
    }

    #[test]
    fn runner_sorts_decimates_and_reports() {
        // Newest first, as the query endpoint returns them.
        let points = vec![
            ping(0.002, "2024-05-01T10:00:20Z"),
            ping(0.00101, "2024-05-01T10:00:11Z"),
            ping(0.001, "2024-05-01T10:00:10Z"),
            ping(0.0, "2024-05-01T10:00:00Z"),
        ];
        let runner = Runner::new(TrackConfig::default());
        let report = runner.execute(points).unwrap();

        assert_eq!(report.raw_count, 4);
        assert_eq!(report.kept_count, 3);
        assert_eq!(report.points[0].point.lng, 0.0);
        assert_eq!(report.points[2].point.lng, 0.002);
        assert!((report.distance.total_m - 222.39).abs() < 0.01);
        assert_eq!(report.speeds.len(), 1);
        assert!((report.speeds[0].speed_kmh - 40.03).abs() < 0.01);
        assert_eq!(report.points[2].formatted_cumulative_time, "0:00:20");
        assert_eq!(
            report.notes,
            vec![
                "kept 3 of 4 points at 10 m spacing".to_string(),
                "speed window ±1".to_string(),
            ]
        );
    }

    #[test]
    fn threshold_override_keeps_everything_at_zero() {
        let points = vec![
            ping(0.0, "2024-05-01T10:00:00Z"),
            ping(0.00001, "2024-05-01T10:00:01Z"),
            ping(0.00002, "2024-05-01T10:00:02Z"),
        ];
        let runner = Runner::new(TrackConfig::default());
        assert_eq!(runner.execute(points.clone()).unwrap().kept_count, 1);
        assert_eq!(
            runner.with_min_distance(0.0).execute(points).unwrap().kept_count,
            3
        );
    }

    #[test]
    fn invalid_threshold_surfaces_stage_error() {
        let runner = Runner::new(TrackConfig::default()).with_min_distance(f64::NAN);
        let err = runner.execute(Vec::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("initializing decimation stage"));
    }

    #[test]
    fn runner_handles_generated_route() {
        let config = GeneratorConfig {
            points: 40,
            ..Default::default()
        };
        let route = build_route(&config).unwrap();
        let points = route.iter().map(|loc| loc.to_point()).collect();
        let report = Runner::new(TrackConfig::default()).execute(points).unwrap();
        assert_eq!(report.raw_count, 40);
        assert!(report.kept_count > 1);
        assert_eq!(report.speeds.len(), report.kept_count.saturating_sub(4));
    }
}
