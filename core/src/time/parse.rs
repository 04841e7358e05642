use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::borrow::Cow;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Lenient UTC timestamp parsing for values coming out of the database or a
/// device.
///
/// `"2024-05-01 10:00:00"`, `"2024-05-01T10:00:00"` and
/// `"2024-05-01T10:00:00Z"` all denote the same instant: a space stands in
/// for the `T` separator and a missing offset means UTC. Explicit offsets are
/// honoured. Anything else yields `None`.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains('T') {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(trimmed.replacen(' ', "T", 1))
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = normalized.trim_end_matches(|c| c == 'Z' || c == 'z');
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(value: &str) -> i64 {
        parse_utc(value).unwrap().timestamp_millis()
    }

    #[test]
    fn database_and_iso_forms_agree() {
        let expected = instant("2024-05-01T10:00:00Z");
        assert_eq!(instant("2024-05-01 10:00:00"), expected);
        assert_eq!(instant("2024-05-01T10:00:00"), expected);
        assert_eq!(instant("  2024-05-01T10:00:00.000Z "), expected);
        assert_eq!(instant("2024-05-01T12:00:00+02:00"), expected);
    }

    #[test]
    fn keeps_fractional_seconds() {
        assert_eq!(
            instant("2024-05-01T10:00:00.250") - instant("2024-05-01T10:00:00"),
            250
        );
    }

    #[test]
    fn negative_offsets_and_short_forms() {
        assert_eq!(
            instant("2024-05-01T05:00:00-05:00"),
            instant("2024-05-01T10:00:00Z")
        );
        assert_eq!(instant("2024-05-01T10:00"), instant("2024-05-01T10:00:00Z"));
        assert_eq!(instant("2024-05-01"), instant("2024-05-01T00:00:00Z"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_utc("").is_none());
        assert!(parse_utc("   ").is_none());
        assert!(parse_utc("not a date").is_none());
        assert!(parse_utc("2024-13-45T99:00:00Z").is_none());
    }
}
