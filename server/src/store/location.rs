use chrono::{DateTime, SecondsFormat, Utc};
use trackcore::interface::LocationPoint;

/// A position reported by a device.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub timestamp_utc: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

impl LocationFix {
    pub fn to_point(&self) -> LocationPoint {
        LocationPoint::new(
            self.latitude,
            self.longitude,
            self.altitude,
            format_utc(&self.timestamp_utc),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub id: String,
    pub device_id: String,
    pub fix: LocationFix,
}

impl LocationRow {
    pub fn to_point(&self) -> LocationPoint {
        self.fix.to_point()
    }
}

/// ISO 8601 with millisecond precision and a `Z` suffix.
pub fn format_utc(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
