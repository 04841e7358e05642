//! In-memory location and session tables.
//!
//! Rows live behind `RwLock`s shared through an `Arc<TrackStore>`; no lock is
//! held across an await point since every operation is synchronous.

pub mod filter;
pub mod location;
pub mod session;

pub use filter::LocationFilter;
pub use location::{format_utc, LocationFix, LocationRow};
pub use session::SessionRow;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::sync::RwLock;

/// Opaque 32-hex-digit row id.
fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[derive(Default)]
pub struct TrackStore {
    locations: RwLock<Vec<LocationRow>>,
    sessions: RwLock<Vec<SessionRow>>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_locations(
        &self,
        device_id: &str,
        fixes: Vec<LocationFix>,
    ) -> anyhow::Result<usize> {
        let mut table = self
            .locations
            .write()
            .map_err(|_| anyhow!("location table lock poisoned"))?;
        let inserted = fixes.len();
        table.extend(fixes.into_iter().map(|fix| LocationRow {
            id: new_id(),
            device_id: device_id.to_string(),
            fix,
        }));
        Ok(inserted)
    }

    /// Matching rows, newest first.
    pub fn query_locations(&self, filter: &LocationFilter) -> anyhow::Result<Vec<LocationRow>> {
        let table = self
            .locations
            .read()
            .map_err(|_| anyhow!("location table lock poisoned"))?;
        let mut rows: Vec<LocationRow> = table
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        rows.sort_by_key(|row| Reverse(row.fix.timestamp_utc));
        Ok(rows)
    }

    pub fn start_session(
        &self,
        device_id: &str,
        start_utc: DateTime<Utc>,
    ) -> anyhow::Result<SessionRow> {
        let mut table = self
            .sessions
            .write()
            .map_err(|_| anyhow!("session table lock poisoned"))?;
        let session = SessionRow::open(new_id(), device_id, start_utc);
        table.push(session.clone());
        Ok(session)
    }

    /// Closes the device's most recently started open session.
    ///
    /// Returns the number of rows closed; zero when nothing was open.
    pub fn end_session(&self, device_id: &str, end_utc: DateTime<Utc>) -> anyhow::Result<usize> {
        let mut table = self
            .sessions
            .write()
            .map_err(|_| anyhow!("session table lock poisoned"))?;
        let latest_open = table
            .iter()
            .filter(|s| s.device_id == device_id && s.is_open())
            .map(|s| s.start_utc)
            .max();
        let Some(latest_start) = latest_open else {
            return Ok(0);
        };

        let mut updated = 0;
        for session in table
            .iter_mut()
            .filter(|s| s.device_id == device_id && s.is_open() && s.start_utc == latest_start)
        {
            session.end_utc = Some(end_utc);
            updated += 1;
        }
        Ok(updated)
    }

    pub fn session(&self, id: &str) -> anyhow::Result<Option<SessionRow>> {
        let table = self
            .sessions
            .read()
            .map_err(|_| anyhow!("session table lock poisoned"))?;
        Ok(table.iter().find(|s| s.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackcore::time::parse_utc;

    fn at(value: &str) -> DateTime<Utc> {
        parse_utc(value).unwrap()
    }

    fn fix(date: &str, lng: f64) -> LocationFix {
        LocationFix {
            timestamp_utc: at(date),
            latitude: 0.0,
            longitude: lng,
            altitude: None,
        }
    }

    #[test]
    fn query_filters_by_device_and_window_newest_first() {
        let store = TrackStore::new();
        store
            .insert_locations(
                "alpha",
                vec![
                    fix("2024-05-01T09:59:59Z", 0.0),
                    fix("2024-05-01T10:00:00Z", 0.1),
                    fix("2024-05-01T10:30:00Z", 0.2),
                    fix("2024-05-01T11:00:00Z", 0.3),
                ],
            )
            .unwrap();
        store
            .insert_locations("beta", vec![fix("2024-05-01T10:15:00Z", 9.0)])
            .unwrap();

        let filter = LocationFilter {
            device_id: Some("alpha".into()),
            start: Some(at("2024-05-01T10:00:00Z")),
            end: Some(at("2024-05-01T11:00:00Z")),
        };
        let rows = store.query_locations(&filter).unwrap();
        let lngs: Vec<f64> = rows.iter().map(|r| r.fix.longitude).collect();
        assert_eq!(lngs, vec![0.3, 0.2, 0.1]);
        assert!(rows.iter().all(|r| r.id.len() == 32));

        let everything = store.query_locations(&LocationFilter::default()).unwrap();
        assert_eq!(everything.len(), 5);
    }

    #[test]
    fn end_session_closes_latest_open_only() {
        let store = TrackStore::new();
        let first = store.start_session("alpha", at("2024-05-01T08:00:00Z")).unwrap();
        let second = store.start_session("alpha", at("2024-05-01T09:00:00Z")).unwrap();
        store.start_session("beta", at("2024-05-01T09:30:00Z")).unwrap();

        assert_eq!(store.end_session("alpha", at("2024-05-01T10:00:00Z")).unwrap(), 1);
        assert!(store.session(&second.id).unwrap().unwrap().end_utc.is_some());
        assert!(store.session(&first.id).unwrap().unwrap().is_open());

        assert_eq!(store.end_session("alpha", at("2024-05-01T10:05:00Z")).unwrap(), 1);
        assert_eq!(store.end_session("alpha", at("2024-05-01T10:10:00Z")).unwrap(), 0);
        assert_eq!(store.end_session("gamma", at("2024-05-01T10:10:00Z")).unwrap(), 0);
    }

    #[test]
    fn started_session_is_retrievable() {
        let store = TrackStore::new();
        let session = store.start_session("alpha", at("2024-05-01T08:00:00Z")).unwrap();
        let loaded = store.session(&session.id).unwrap().unwrap();
        assert_eq!(loaded.session_type, "P");
        assert_eq!(loaded.device_id, "alpha");
        assert!(store.session("missing").unwrap().is_none());
    }
}
