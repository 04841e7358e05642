use crate::interface::location::LocationPoint;
use crate::math::stats::StatsHelper;
use crate::time::format_duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Windowed speed estimate for a single kept point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSample {
    pub index: usize,
    pub speed_kmh: f64,
    pub date: Option<DateTime<Utc>>,
}

/// Running distance and time bookkeeping for a single kept point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointProgress {
    pub incremental_distance_m: f64,
    pub incremental_time_s: f64,
    pub cumulative_distance_m: f64,
    pub cumulative_time_ms: i64,
}

/// A kept point joined with its progress and speed, ready for a table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedPoint {
    #[serde(flatten)]
    pub point: LocationPoint,
    pub local_date: Option<DateTime<Utc>>,
    pub incremental_distance: f64,
    pub incremental_time_seconds: f64,
    pub cumulative_distance_km: f64,
    pub cumulative_time_ms: i64,
    pub formatted_cumulative_time: String,
    /// Absent for points too close to either end of the track.
    pub speed_kmh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltitudeSample {
    pub index: usize,
    pub altitude: f64,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceSummary {
    pub total_m: f64,
    pub label: String,
}

impl DistanceSummary {
    pub fn new(total_m: f64) -> Self {
        Self {
            total_m,
            label: format_distance(total_m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSummary {
    pub mean_kmh: f64,
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltitudeSummary {
    pub min_m: f64,
    pub max_m: f64,
}

/// Everything the dashboard renders for one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryReport {
    pub raw_count: usize,
    pub kept_count: usize,
    pub distance: DistanceSummary,
    pub speed: Option<SpeedSummary>,
    pub altitude: Option<AltitudeSummary>,
    pub speeds: Vec<SpeedSample>,
    pub altitudes: Vec<AltitudeSample>,
    pub points: Vec<ProcessedPoint>,
    /// Stage notes, in pipeline order.
    pub notes: Vec<String>,
}

impl TrajectoryReport {
    /// Joins the outputs of the decimation, speed and progress stages.
    ///
    /// `progress` is indexed like `points`; a missing entry reads as zero.
    pub fn assemble(
        raw_count: usize,
        points: Vec<LocationPoint>,
        progress: Vec<PointProgress>,
        speeds: Vec<SpeedSample>,
    ) -> Self {
        let total_m = progress
            .last()
            .map(|p| p.cumulative_distance_m)
            .unwrap_or(0.0);

        let speed_values: Vec<f64> = speeds.iter().map(|s| s.speed_kmh).collect();
        let speed = match (
            StatsHelper::mean(&speed_values),
            StatsHelper::min(&speed_values),
            StatsHelper::max(&speed_values),
        ) {
            (Some(mean_kmh), Some(min_kmh), Some(max_kmh)) => Some(SpeedSummary {
                mean_kmh,
                min_kmh,
                max_kmh,
                count: speed_values.len(),
            }),
            _ => None,
        };

        let altitudes: Vec<AltitudeSample> = points
            .iter()
            .enumerate()
            .map(|(index, point)| AltitudeSample {
                index,
                altitude: point.altitude.unwrap_or(0.0),
                date: point.timestamp(),
            })
            .collect();
        let altitude_values: Vec<f64> = altitudes.iter().map(|a| a.altitude).collect();
        let altitude = StatsHelper::min(&altitude_values)
            .zip(StatsHelper::max(&altitude_values))
            .map(|(min_m, max_m)| AltitudeSummary { min_m, max_m });

        // Speed samples cover a contiguous run of indices.
        let first_speed_index = speeds.first().map(|s| s.index).unwrap_or(0);
        let kept_count = points.len();
        let processed = points
            .into_iter()
            .enumerate()
            .map(|(index, point)| {
                let step = progress.get(index).copied().unwrap_or_default();
                let speed_kmh = index
                    .checked_sub(first_speed_index)
                    .and_then(|offset| speeds.get(offset))
                    .filter(|s| s.index == index)
                    .map(|s| s.speed_kmh);
                ProcessedPoint {
                    local_date: point.timestamp(),
                    point,
                    incremental_distance: step.incremental_distance_m,
                    incremental_time_seconds: step.incremental_time_s,
                    cumulative_distance_km: step.cumulative_distance_m / 1000.0,
                    cumulative_time_ms: step.cumulative_time_ms,
                    formatted_cumulative_time: format_duration(step.cumulative_time_ms),
                    speed_kmh,
                }
            })
            .collect();

        Self {
            raw_count,
            kept_count,
            distance: DistanceSummary::new(total_m),
            speed,
            altitude,
            speeds,
            altitudes,
            points: processed,
            notes: Vec::new(),
        }
    }
}

/// Renders a distance as metres below one kilometre and kilometres above.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.2} m", meters)
    }
}
