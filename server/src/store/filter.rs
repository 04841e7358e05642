use super::location::LocationRow;
use chrono::{DateTime, Utc};
use trackcore::time::parse_utc;

#[derive(Debug, thiserror::Error)]
#[error("unparseable {side} bound {value:?}")]
pub struct BoundError {
    side: &'static str,
    value: String,
}

/// Row selection for location queries. Both bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFilter {
    pub device_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl LocationFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// A date-only bound covers the whole day: the start expands to
    /// `T00:00:00` and the end to `T23:59:59`. Empty values are ignored.
    pub fn from_params(
        device_id: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, BoundError> {
        Ok(Self {
            device_id: non_empty(device_id).map(str::to_string),
            start: non_empty(start)
                .map(|raw| parse_bound(raw, "start", "T00:00:00"))
                .transpose()?,
            end: non_empty(end)
                .map(|raw| parse_bound(raw, "end", "T23:59:59"))
                .transpose()?,
        })
    }

    pub fn matches(&self, row: &LocationRow) -> bool {
        if let Some(device_id) = &self.device_id {
            if &row.device_id != device_id {
                return false;
            }
        }
        let timestamp = row.fix.timestamp_utc;
        self.start.map_or(true, |start| timestamp >= start)
            && self.end.map_or(true, |end| timestamp <= end)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(raw: &str, side: &'static str, day_time: &str) -> Result<DateTime<Utc>, BoundError> {
    let expanded = if raw.contains('T') {
        raw.to_string()
    } else {
        format!("{}{}", raw, day_time)
    };
    parse_utc(&expanded).ok_or_else(|| BoundError {
        side,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_bounds_cover_whole_day() {
        let filter = LocationFilter::from_params(None, Some("2024-05-01"), Some("2024-05-01")).unwrap();
        assert_eq!(filter.start, parse_utc("2024-05-01T00:00:00Z"));
        assert_eq!(filter.end, parse_utc("2024-05-01T23:59:59Z"));
        assert_eq!(filter.device_id, None);
    }

    #[test]
    fn datetime_bounds_are_taken_verbatim() {
        let filter =
            LocationFilter::from_params(Some("alpha"), Some("2024-05-01T08:15:00"), None).unwrap();
        assert_eq!(filter.start, parse_utc("2024-05-01T08:15:00Z"));
        assert_eq!(filter.end, None);
        assert_eq!(filter.device_id.as_deref(), Some("alpha"));
    }

    #[test]
    fn blank_params_are_ignored() {
        let filter = LocationFilter::from_params(Some(""), Some("  "), None).unwrap();
        assert_eq!(filter, LocationFilter::default());
    }

    #[test]
    fn garbage_bound_names_its_side() {
        let err = LocationFilter::from_params(None, None, Some("soon")).unwrap_err();
        assert_eq!(err.to_string(), "unparseable end bound \"soon\"");
    }
}
