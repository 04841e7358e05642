use crate::store::{format_utc, LocationRow};
use serde::{Deserialize, Serialize};

/// Batch of pings pushed by a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub locations: Vec<IngestLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestLocation {
    pub timestamp_utc: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
}

/// Session boundary pushed by a device; a missing timestamp means now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub timestamp_utc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub device_id: Option<String>,
    pub min_distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub device_id: String,
    pub lat: f64,
    pub lng: f64,
    pub altitude: Option<f64>,
    pub date: String,
}

impl From<&LocationRow> for LocationRecord {
    fn from(row: &LocationRow) -> Self {
        Self {
            id: row.id.clone(),
            device_id: row.device_id.clone(),
            lat: row.fix.latitude,
            lng: row.fix.longitude,
            altitude: row.fix.altitude,
            date: format_utc(&row.fix.timestamp_utc),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub inserted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStarted {
    pub inserted: usize,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionEnded {
    pub updated: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
