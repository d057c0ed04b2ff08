//! Timestamp parsing for web API payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use econdata_core::{DataError, Result};

/// Parses a timestamp sent by the web API.
///
/// Offsets are honoured when present; timestamps without one are UTC.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| DataError::Parse(format!("Invalid timestamp {value:?}: {e}")))
}

/// Parses an optional timestamp. Absent values are not parsed.
pub(crate) fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

/// Parses a list of timestamps.
pub(crate) fn parse_timestamps(values: &[String]) -> Result<Vec<DateTime<Utc>>> {
    values.iter().map(|v| parse_timestamp(v)).collect()
}

/// Formats a timestamp the way the web API expects it in query parameters.
pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-03-01T12:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T14:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T12:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T12:00:00.000").unwrap(), expected);
        assert!(matches!(parse_timestamp("yesterday"), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_optional_absent() {
        assert_eq!(parse_optional_timestamp(None).unwrap(), None);
        assert!(parse_optional_timestamp(Some("2024-03-01T12:00:00Z")).unwrap().is_some());
    }

    #[test]
    fn test_format() {
        let timestamp = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&timestamp), "2030-01-01T00:00:00Z");
    }
}
