//! Start and end points of a date range.
//!
//! A [`StartOrEndPoint`] is either an absolute date, an offset relative to where the
//! series have data, or one of the two sentinels meaning "where any/all series have
//! data". Its textual rendering doubles as the wire format and as an equality key, so
//! every constructor produces a canonical value and [`FromStr`] parses the rendering back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DataError, Result};

/// Which series a relative point is anchored on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarDateMode {
    /// The first/last date where any of the series has data.
    #[default]
    DataInAnySeries,
    /// The first/last date where all of the series have data.
    DataInAllSeries,
}

impl CalendarDateMode {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DataInAnySeries => "DATA_IN_ANY_SERIES",
            Self::DataInAllSeries => "DATA_IN_ALL_SERIES",
        }
    }
}

impl fmt::Display for CalendarDateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarDateMode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DATA_IN_ANY_SERIES" => Ok(Self::DataInAnySeries),
            "DATA_IN_ALL_SERIES" => Ok(Self::DataInAllSeries),
            _ => Err(DataError::InvalidParameter(format!(
                "Unknown calendar date mode: {s}"
            ))),
        }
    }
}

/// Unit of a relative offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeUnit {
    /// Observations of the series itself.
    Observations,
    /// Calendar days.
    Days,
    /// Weeks.
    Weeks,
    /// Months.
    Months,
    /// Quarters.
    Quarters,
    /// Years.
    Years,
}

impl RelativeUnit {
    /// Suffix appended to the offset when rendering.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Observations => "",
            Self::Days => "d",
            Self::Weeks => "w",
            Self::Months => "m",
            Self::Quarters => "q",
            Self::Years => "y",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" => Some(Self::Observations),
            "d" => Some(Self::Days),
            "w" => Some(Self::Weeks),
            "m" => Some(Self::Months),
            "q" => Some(Self::Quarters),
            "y" => Some(Self::Years),
            _ => None,
        }
    }
}

/// A point in time bounding a date range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StartOrEndPoint {
    /// An absolute date.
    Absolute {
        /// The date, `YYYY-MM-DD` or RFC 3339.
        value: String,
        /// Calendar date mode.
        mode: CalendarDateMode,
    },
    /// An offset relative to where the series have data.
    Relative {
        /// Signed number of units.
        offset: i64,
        /// Unit of the offset.
        unit: RelativeUnit,
        /// Calendar date mode.
        mode: CalendarDateMode,
    },
    /// The first/last date where any or all series have data.
    Sentinel {
        /// Calendar date mode.
        mode: CalendarDateMode,
    },
}

impl StartOrEndPoint {
    /// Creates a point from a value string.
    ///
    /// An empty value gives a sentinel, a relative expression such as `-1` or `-3y` gives
    /// a relative point, and a date gives an absolute point. A missing `mode` means
    /// [`CalendarDateMode::DataInAnySeries`].
    ///
    /// A number without a unit suffix always counts observations, whatever its size:
    /// `"2020"` is 2020 observations from the reference point, not the year 2020. Pass
    /// a full date such as `"2020-01-01"`, or use [`StartOrEndPoint::from_date`], for a
    /// calendar date.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if the value is neither.
    pub fn new(value: impl Into<String>, mode: Option<CalendarDateMode>) -> Result<Self> {
        let value = value.into();
        let mode = mode.unwrap_or_default();

        if value.is_empty() {
            return Ok(Self::Sentinel { mode });
        }

        if let Some((offset, unit)) = parse_relative(&value) {
            return Ok(Self::Relative { offset, unit, mode });
        }

        if is_absolute_date(&value) {
            return Ok(Self::Absolute { value, mode });
        }

        Err(DataError::InvalidParameter(format!(
            "Not a date or relative offset: {value:?}"
        )))
    }

    /// Creates an absolute point from a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate, mode: CalendarDateMode) -> Self {
        Self::Absolute {
            value: date.format("%Y-%m-%d").to_string(),
            mode,
        }
    }

    const fn relative(offset: i64, unit: RelativeUnit) -> Self {
        Self::Relative {
            offset,
            unit,
            mode: CalendarDateMode::DataInAnySeries,
        }
    }

    /// A point `n` observations from where any series has data.
    #[must_use]
    pub const fn relative_to_observations(n: i64) -> Self {
        Self::relative(n, RelativeUnit::Observations)
    }

    /// A point `n` days from where any series has data.
    #[must_use]
    pub const fn relative_to_days(n: i64) -> Self {
        Self::relative(n, RelativeUnit::Days)
    }

    /// A point `n` weeks from where any series has data.
    #[must_use]
    pub const fn relative_to_weeks(n: i64) -> Self {
        Self::relative(n, RelativeUnit::Weeks)
    }

    /// A point `n` months from where any series has data.
    #[must_use]
    pub const fn relative_to_months(n: i64) -> Self {
        Self::relative(n, RelativeUnit::Months)
    }

    /// A point `n` quarters from where any series has data.
    #[must_use]
    pub const fn relative_to_quarters(n: i64) -> Self {
        Self::relative(n, RelativeUnit::Quarters)
    }

    /// A point `n` years from where any series has data.
    #[must_use]
    pub const fn relative_to_years(n: i64) -> Self {
        Self::relative(n, RelativeUnit::Years)
    }

    /// The first/last date where any series has data.
    #[must_use]
    pub const fn data_in_any_series() -> Self {
        Self::Sentinel {
            mode: CalendarDateMode::DataInAnySeries,
        }
    }

    /// The first/last date where all series have data.
    #[must_use]
    pub const fn data_in_all_series() -> Self {
        Self::Sentinel {
            mode: CalendarDateMode::DataInAllSeries,
        }
    }

    /// Returns the same point with another calendar date mode.
    #[must_use]
    pub fn with_mode(self, mode: CalendarDateMode) -> Self {
        match self {
            Self::Absolute { value, .. } => Self::Absolute { value, mode },
            Self::Relative { offset, unit, .. } => Self::Relative { offset, unit, mode },
            Self::Sentinel { .. } => Self::Sentinel { mode },
        }
    }

    /// Calendar date mode of this point.
    #[must_use]
    pub const fn mode(&self) -> CalendarDateMode {
        match self {
            Self::Absolute { mode, .. } | Self::Relative { mode, .. } | Self::Sentinel { mode } => {
                *mode
            }
        }
    }

    /// The absolute date string, empty for relative points and sentinels.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Absolute { value, .. } => value,
            _ => "",
        }
    }

    /// The offset; zero for sentinels, `None` for absolute points.
    #[must_use]
    pub const fn offset(&self) -> Option<i64> {
        match self {
            Self::Absolute { .. } => None,
            Self::Relative { offset, .. } => Some(*offset),
            Self::Sentinel { .. } => Some(0),
        }
    }

    /// The unit of a relative point.
    #[must_use]
    pub const fn unit(&self) -> Option<RelativeUnit> {
        match self {
            Self::Relative { unit, .. } => Some(*unit),
            _ => None,
        }
    }

    /// The rendering without the mode, as sent in request bodies.
    #[must_use]
    pub fn wire_value(&self) -> String {
        match self {
            Self::Absolute { value, .. } => value.clone(),
            Self::Relative { offset, unit, .. } => format!("{offset}{}", unit.suffix()),
            Self::Sentinel { .. } => String::new(),
        }
    }
}

fn parse_relative(value: &str) -> Option<(i64, RelativeUnit)> {
    let split = value
        .char_indices()
        .last()
        .filter(|(_, c)| c.is_ascii_alphabetic())
        .map_or(value.len(), |(i, _)| i);
    let (number, suffix) = value.split_at(split);

    let digits = number.strip_prefix(['-', '+']).unwrap_or(number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some((number.parse().ok()?, RelativeUnit::from_suffix(suffix)?))
}

fn is_absolute_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

impl fmt::Display for StartOrEndPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mode:{}", self.wire_value(), self.mode())
    }
}

impl FromStr for StartOrEndPoint {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let (value, mode) = s.rsplit_once(" mode:").ok_or_else(|| {
            DataError::Parse(format!("Missing calendar date mode in {s:?}"))
        })?;
        Self::new(value, Some(mode.parse()?))
    }
}

impl Serialize for StartOrEndPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StartOrEndPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_rendering() {
        let cases = [
            (StartOrEndPoint::relative_to_observations(-1), "-1 mode:DATA_IN_ANY_SERIES"),
            (StartOrEndPoint::relative_to_days(-1), "-1d mode:DATA_IN_ANY_SERIES"),
            (StartOrEndPoint::relative_to_weeks(-1), "-1w mode:DATA_IN_ANY_SERIES"),
            (StartOrEndPoint::relative_to_months(-1), "-1m mode:DATA_IN_ANY_SERIES"),
            (StartOrEndPoint::relative_to_quarters(-1), "-1q mode:DATA_IN_ANY_SERIES"),
            (StartOrEndPoint::relative_to_years(-1), "-1y mode:DATA_IN_ANY_SERIES"),
            (StartOrEndPoint::relative_to_years(5), "5y mode:DATA_IN_ANY_SERIES"),
        ];

        for (point, expected) in cases {
            assert_eq!(point.to_string(), expected);
            assert_eq!(expected.parse::<StartOrEndPoint>().unwrap(), point);
        }
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(
            StartOrEndPoint::data_in_all_series().to_string(),
            " mode:DATA_IN_ALL_SERIES"
        );
        assert_eq!(
            StartOrEndPoint::data_in_any_series().to_string(),
            " mode:DATA_IN_ANY_SERIES"
        );
        assert_eq!(StartOrEndPoint::data_in_any_series().offset(), Some(0));
        assert_eq!(StartOrEndPoint::data_in_any_series().unit(), None);
        assert_eq!(
            " mode:DATA_IN_ALL_SERIES".parse::<StartOrEndPoint>().unwrap(),
            StartOrEndPoint::data_in_all_series()
        );
    }

    #[test]
    fn test_general_constructor_canonicalizes() {
        assert_eq!(
            StartOrEndPoint::new("-1", None).unwrap(),
            StartOrEndPoint::relative_to_observations(-1)
        );
        assert_eq!(
            StartOrEndPoint::new("", Some(CalendarDateMode::DataInAllSeries)).unwrap(),
            StartOrEndPoint::data_in_all_series()
        );

        let absolute = StartOrEndPoint::new("2020-03-31", None).unwrap();
        assert_eq!(absolute.value(), "2020-03-31");
        assert_eq!(absolute.offset(), None);
        assert_eq!(absolute.to_string(), "2020-03-31 mode:DATA_IN_ANY_SERIES");
    }

    #[test]
    fn test_bare_number_counts_observations() {
        let point = StartOrEndPoint::new("2020", None).unwrap();
        assert_eq!(point, StartOrEndPoint::relative_to_observations(2020));
        assert_eq!(point.unit(), Some(RelativeUnit::Observations));
        assert_eq!(point.wire_value(), "2020");

        let year = StartOrEndPoint::new("2020-01-01", None).unwrap();
        assert_eq!(year.offset(), None);
        assert_eq!(year.value(), "2020-01-01");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(StartOrEndPoint::new("yesterday", None).is_err());
        assert!(StartOrEndPoint::new("-1x", None).is_err());
        assert!(StartOrEndPoint::new("-", None).is_err());
        assert!("-1y".parse::<StartOrEndPoint>().is_err());
        assert!("-1y mode:SOMETIMES".parse::<StartOrEndPoint>().is_err());
    }

    #[test]
    fn test_equality_includes_mode() {
        let any = StartOrEndPoint::relative_to_months(-6);
        let all = any.clone().with_mode(CalendarDateMode::DataInAllSeries);

        assert_ne!(any, all);
        assert_eq!(all.to_string(), "-6m mode:DATA_IN_ALL_SERIES");
        assert_ne!(
            StartOrEndPoint::relative_to_observations(0),
            StartOrEndPoint::data_in_any_series()
        );
    }

    #[test]
    fn test_serde_uses_rendering() {
        let point = StartOrEndPoint::from_date(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            CalendarDateMode::DataInAllSeries,
        );
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, "\"2024-01-01 mode:DATA_IN_ALL_SERIES\"");

        let back: StartOrEndPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }
}
