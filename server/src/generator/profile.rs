use crate::store::LocationFix;
use anyhow::{ensure, Context};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use trackcore::math::EARTH_RADIUS_M;
use trackcore::time::parse_utc;

/// Configuration for generating a synthetic device route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub device_id: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub heading_deg: f64,
    pub speed_kmh: f64,
    pub interval_s: u32,
    pub points: usize,
    pub jitter_m: f64,
    pub altitude_m: f64,
    pub altitude_drift_m: f64,
    pub seed: u64,
    /// First ping time; defaults to ending the route now.
    pub start: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            device_id: "demo-device".into(),
            start_lat: 38.7223,
            start_lng: -9.1393,
            heading_deg: 45.0,
            speed_kmh: 36.0,
            interval_s: 5,
            points: 120,
            jitter_m: 3.0,
            altitude_m: 80.0,
            altitude_drift_m: 1.5,
            seed: 0,
            start: None,
        }
    }
}

impl GeneratorConfig {
    fn start_time(&self) -> anyhow::Result<DateTime<Utc>> {
        match self.start.as_deref() {
            Some(raw) => parse_utc(raw).with_context(|| format!("unparseable route start {}", raw)),
            None => {
                let span = i64::from(self.interval_s) * self.points.saturating_sub(1) as i64;
                Ok(Utc::now() - Duration::seconds(span))
            }
        }
    }
}

/// Shifts a coordinate by metres north and east on a local flat
/// approximation, good enough for the few metres between pings.
fn offset(lat: f64, lng: f64, north_m: f64, east_m: f64) -> (f64, f64) {
    let d_lat = (north_m / EARTH_RADIUS_M).to_degrees();
    let d_lng = (east_m / (EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees();
    (lat + d_lat, lng + d_lng)
}

pub fn build_route(config: &GeneratorConfig) -> anyhow::Result<Vec<LocationFix>> {
    ensure!(config.points > 0, "route needs at least one point");
    ensure!(
        config.start_lat.abs() < 90.0,
        "route cannot start at a pole"
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let start = config.start_time()?;
    let step_m = config.speed_kmh / 3.6 * f64::from(config.interval_s);
    let heading = config.heading_deg.to_radians();

    let mut fixes = Vec::with_capacity(config.points);
    let (mut lat, mut lng) = (config.start_lat, config.start_lng);
    let mut altitude = config.altitude_m;

    for index in 0..config.points {
        let (jitter_north, jitter_east) = if config.jitter_m > 0.0 {
            (
                rng.gen_range(-config.jitter_m..config.jitter_m),
                rng.gen_range(-config.jitter_m..config.jitter_m),
            )
        } else {
            (0.0, 0.0)
        };
        let (fix_lat, fix_lng) = offset(lat, lng, jitter_north, jitter_east);

        fixes.push(LocationFix {
            timestamp_utc: start + Duration::seconds(i64::from(config.interval_s) * index as i64),
            latitude: fix_lat,
            longitude: fix_lng,
            altitude: Some(altitude),
        });

        (lat, lng) = offset(lat, lng, step_m * heading.cos(), step_m * heading.sin());
        if config.altitude_drift_m > 0.0 {
            altitude += rng.gen_range(-config.altitude_drift_m..config.altitude_drift_m);
        }
    }

    Ok(fixes)
}
