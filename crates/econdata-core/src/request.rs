//! Unified series requests.

use serde::{Deserialize, Serialize};

use crate::{
    error::{DataError, Result},
    frequency::{
        CalendarMergeMode, SeriesFrequency, SeriesMissingValueMethod, SeriesPartialPeriodsMethod,
        SeriesToHigherFrequencyMethod, SeriesToLowerFrequencyMethod, SeriesWeekdays,
    },
    point::{CalendarDateMode, StartOrEndPoint},
};

/// A series in a unified series request, with its conversion settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    /// Name of the series.
    pub name: String,
    /// How missing values are filled.
    pub missing_value_method: SeriesMissingValueMethod,
    /// How the series is converted to a lower frequency.
    pub to_lower_frequency_method: SeriesToLowerFrequencyMethod,
    /// How the series is converted to a higher frequency.
    pub to_higher_frequency_method: SeriesToHigherFrequencyMethod,
    /// How partial periods are handled.
    pub partial_periods_method: SeriesPartialPeriodsMethod,
}

impl SeriesEntry {
    /// Creates an entry with automatic conversion settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            missing_value_method: SeriesMissingValueMethod::default(),
            to_lower_frequency_method: SeriesToLowerFrequencyMethod::default(),
            to_higher_frequency_method: SeriesToHigherFrequencyMethod::default(),
            partial_periods_method: SeriesPartialPeriodsMethod::default(),
        }
    }

    /// Sets the missing value method.
    #[must_use]
    pub const fn with_missing_value_method(mut self, method: SeriesMissingValueMethod) -> Self {
        self.missing_value_method = method;
        self
    }

    /// Sets the lower-frequency conversion method.
    #[must_use]
    pub const fn with_to_lower_frequency_method(
        mut self,
        method: SeriesToLowerFrequencyMethod,
    ) -> Self {
        self.to_lower_frequency_method = method;
        self
    }

    /// Sets the higher-frequency conversion method.
    #[must_use]
    pub const fn with_to_higher_frequency_method(
        mut self,
        method: SeriesToHigherFrequencyMethod,
    ) -> Self {
        self.to_higher_frequency_method = method;
        self
    }

    /// Sets the partial periods method.
    #[must_use]
    pub const fn with_partial_periods_method(mut self, method: SeriesPartialPeriodsMethod) -> Self {
        self.partial_periods_method = method;
        self
    }
}

impl From<&str> for SeriesEntry {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SeriesEntry {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A request for several series converted to a common frequency and calendar.
///
/// On the wire each point is sent as its value (`startPoint`, `endPoint`) next to its
/// calendar date mode (`startPointMode`, `endPointMode`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "UnifiedSeriesBody", try_from = "UnifiedSeriesBody")]
pub struct UnifiedSeriesRequest {
    /// Target frequency.
    pub frequency: SeriesFrequency,
    /// Weekdays of daily output.
    pub weekdays: SeriesWeekdays,
    /// Start of the output range.
    pub start_point: Option<StartOrEndPoint>,
    /// End of the output range.
    pub end_point: Option<StartOrEndPoint>,
    /// Common currency, if the series should be converted.
    pub currency: Option<String>,
    /// How calendars are merged.
    pub calendar_merge_mode: CalendarMergeMode,
    /// The series, in output order.
    pub series_entries: Vec<SeriesEntry>,
}

impl UnifiedSeriesRequest {
    /// Creates a request with default conversion settings.
    #[must_use]
    pub fn new<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<SeriesEntry>,
    {
        Self {
            frequency: SeriesFrequency::default(),
            weekdays: SeriesWeekdays::default(),
            start_point: None,
            end_point: None,
            currency: None,
            calendar_merge_mode: CalendarMergeMode::default(),
            series_entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the target frequency.
    #[must_use]
    pub const fn with_frequency(mut self, frequency: SeriesFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the weekdays of daily output.
    #[must_use]
    pub const fn with_weekdays(mut self, weekdays: SeriesWeekdays) -> Self {
        self.weekdays = weekdays;
        self
    }

    /// Sets the start of the output range.
    #[must_use]
    pub fn with_start_point(mut self, point: StartOrEndPoint) -> Self {
        self.start_point = Some(point);
        self
    }

    /// Sets the end of the output range.
    #[must_use]
    pub fn with_end_point(mut self, point: StartOrEndPoint) -> Self {
        self.end_point = Some(point);
        self
    }

    /// Converts all series to a currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the calendar merge mode.
    #[must_use]
    pub const fn with_calendar_merge_mode(mut self, mode: CalendarMergeMode) -> Self {
        self.calendar_merge_mode = mode;
        self
    }

    /// Names of the requested series, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.series_entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Checks the request before it is sent.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if there are no series or a name is empty.
    pub fn validate(&self) -> Result<()> {
        if self.series_entries.is_empty() {
            return Err(DataError::InvalidParameter(
                "A unified series request needs at least one series".to_string(),
            ));
        }
        if self.series_entries.iter().any(|e| e.name.is_empty()) {
            return Err(DataError::InvalidParameter(
                "Series names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request body as the web API expects it.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnifiedSeriesBody {
    frequency: SeriesFrequency,
    day_mask: SeriesWeekdays,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_point_mode: Option<CalendarDateMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_point_mode: Option<CalendarDateMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    calendar_merge_mode: CalendarMergeMode,
    series_entries: Vec<SeriesEntry>,
}

fn split_point(point: Option<&StartOrEndPoint>) -> (Option<String>, Option<CalendarDateMode>) {
    point.map_or((None, None), |p| (Some(p.wire_value()), Some(p.mode())))
}

fn join_point(
    value: Option<String>,
    mode: Option<CalendarDateMode>,
) -> Result<Option<StartOrEndPoint>> {
    match (value, mode) {
        (None, None) => Ok(None),
        (value, mode) => StartOrEndPoint::new(value.unwrap_or_default(), mode).map(Some),
    }
}

impl From<UnifiedSeriesRequest> for UnifiedSeriesBody {
    fn from(request: UnifiedSeriesRequest) -> Self {
        let (start_point, start_point_mode) = split_point(request.start_point.as_ref());
        let (end_point, end_point_mode) = split_point(request.end_point.as_ref());
        Self {
            frequency: request.frequency,
            day_mask: request.weekdays,
            start_point,
            start_point_mode,
            end_point,
            end_point_mode,
            currency: request.currency,
            calendar_merge_mode: request.calendar_merge_mode,
            series_entries: request.series_entries,
        }
    }
}

impl TryFrom<UnifiedSeriesBody> for UnifiedSeriesRequest {
    type Error = DataError;

    fn try_from(body: UnifiedSeriesBody) -> Result<Self> {
        Ok(Self {
            frequency: body.frequency,
            weekdays: body.day_mask,
            start_point: join_point(body.start_point, body.start_point_mode)?,
            end_point: join_point(body.end_point, body.end_point_mode)?,
            currency: body.currency,
            calendar_merge_mode: body.calendar_merge_mode,
            series_entries: body.series_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = UnifiedSeriesRequest::new(["usgdp", "uscpi"])
            .with_frequency(SeriesFrequency::Annual)
            .with_start_point(StartOrEndPoint::relative_to_years(-10))
            .with_currency("USD");

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["frequency"], "annual");
        assert_eq!(value["dayMask"], 62);
        assert_eq!(value["startPoint"], "-10y");
        assert_eq!(value["startPointMode"], "DATA_IN_ANY_SERIES");
        assert!(value.get("endPoint").is_none());
        assert!(value.get("endPointMode").is_none());
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["seriesEntries"][1]["name"], "uscpi");
        assert_eq!(value["seriesEntries"][0]["missingValueMethod"], "auto");
    }

    #[test]
    fn test_points_sent_without_mode_suffix() {
        let request = UnifiedSeriesRequest::new(["usgdp"])
            .with_start_point(StartOrEndPoint::from_date(
                chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                CalendarDateMode::DataInAnySeries,
            ))
            .with_end_point(StartOrEndPoint::data_in_all_series());

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["startPoint"], "2020-01-01");
        assert_eq!(value["startPointMode"], "DATA_IN_ANY_SERIES");
        assert_eq!(value["endPoint"], "");
        assert_eq!(value["endPointMode"], "DATA_IN_ALL_SERIES");
        assert!(!value.to_string().contains("mode:"));

        let back: UnifiedSeriesRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_invalid_point_rejected_on_read() {
        let value = serde_json::json!({
            "frequency": "annual",
            "dayMask": 62,
            "startPoint": "soon",
            "calendarMergeMode": "availableInAny",
            "seriesEntries": [],
        });
        assert!(serde_json::from_value::<UnifiedSeriesRequest>(value).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(UnifiedSeriesRequest::new(["usgdp"]).validate().is_ok());
        assert!(UnifiedSeriesRequest::new(Vec::<String>::new()).validate().is_err());
        assert!(UnifiedSeriesRequest::new([""]).validate().is_err());
    }

    #[test]
    fn test_entry_settings() {
        let entry = SeriesEntry::new("sepop")
            .with_to_lower_frequency_method(SeriesToLowerFrequencyMethod::Average)
            .with_missing_value_method(SeriesMissingValueMethod::Previous);
        assert_eq!(entry.to_lower_frequency_method, SeriesToLowerFrequencyMethod::Average);
        assert_eq!(entry.missing_value_method, SeriesMissingValueMethod::Previous);
        assert_eq!(entry.partial_periods_method, SeriesPartialPeriodsMethod::Auto);
    }
}
