use chrono::{DateTime, Utc};

/// Session type stamped on sessions opened by a device.
pub const DEVICE_SESSION_TYPE: &str = "P";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: String,
    pub device_id: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: Option<DateTime<Utc>>,
    pub session_type: String,
}

impl SessionRow {
    pub fn open(id: String, device_id: &str, start_utc: DateTime<Utc>) -> Self {
        Self {
            id,
            device_id: device_id.to_string(),
            start_utc,
            end_utc: None,
            session_type: DEVICE_SESSION_TYPE.to_string(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_utc.is_none()
    }
}
