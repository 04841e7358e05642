use crate::time::parse_utc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single location ping as returned by the query endpoint.
///
/// `date` is kept verbatim so that a malformed timestamp degrades to zero
/// elapsed time during processing instead of failing the whole track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
}

impl LocationPoint {
    pub fn new(lat: f64, lng: f64, altitude: Option<f64>, date: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            altitude,
            date: date.into(),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_utc(&self.date)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Orders points oldest first.
///
/// The sort is stable; points whose timestamp cannot be parsed sort ahead of
/// every dated point and keep their relative order.
pub fn sort_chronologically(points: &mut [LocationPoint]) {
    points.sort_by_cached_key(LocationPoint::timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_dashboard_shape() {
        let point: LocationPoint =
            serde_json::from_str(r#"{"lat":1.5,"lng":2.5,"altitude":null,"date":null}"#).unwrap();
        assert_eq!(point.altitude, None);
        assert_eq!(point.date, "");
        assert!(point.timestamp().is_none());
    }

    #[test]
    fn sort_puts_oldest_first_and_undated_ahead() {
        let mut points = vec![
            LocationPoint::new(0.0, 0.2, None, "2024-05-01T10:00:20Z"),
            LocationPoint::new(0.0, 0.0, None, "garbage"),
            LocationPoint::new(0.0, 0.1, None, "2024-05-01 10:00:10"),
        ];
        sort_chronologically(&mut points);
        let lngs: Vec<f64> = points.iter().map(|p| p.lng).collect();
        assert_eq!(lngs, vec![0.0, 0.1, 0.2]);
    }
}
