//! In-house series upload.
//!
//! [`InHouseSeries`] collects the parameters of an upload and validates them into an
//! [`UploadSeriesRequest`]. All checks run locally so that nothing reaches a backend
//! unless the request is well formed.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{DataError, Result},
    frequency::{SeriesFrequency, SeriesWeekdays},
    metadata::Metadata,
};

/// A point in time given to an upload, with or without a UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadTimestamp {
    /// A timestamp with a known offset.
    Zoned(DateTime<FixedOffset>),
    /// A wall-clock timestamp without an offset.
    Naive(NaiveDateTime),
}

impl From<DateTime<FixedOffset>> for UploadTimestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Zoned(value)
    }
}

impl From<DateTime<chrono::Utc>> for UploadTimestamp {
    fn from(value: DateTime<chrono::Utc>) -> Self {
        Self::Zoned(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for UploadTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl UploadTimestamp {
    /// Attaches the local offset to a naive timestamp.
    fn to_zoned_local(self) -> Result<DateTime<FixedOffset>> {
        match self {
            Self::Zoned(value) => Ok(value),
            Self::Naive(value) => {
                let offset = Local
                    .offset_from_local_datetime(&value)
                    .earliest()
                    .ok_or_else(|| {
                        DataError::InvalidParameter(format!(
                            "{value} does not exist in the local time zone"
                        ))
                    })?
                    .fix();
                offset
                    .from_local_datetime(&value)
                    .single()
                    .ok_or_else(|| DataError::InvalidParameter(format!("Invalid date {value}")))
            }
        }
    }
}

/// The validated body of an in-house series upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSeriesRequest {
    /// One flag per value, true for forecasts.
    pub forecast_flags: Option<Vec<bool>>,
    /// Series metadata, including the derived attributes.
    pub metadata: Metadata,
    /// Observations; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
    /// Explicit observation dates, when no start date is given.
    pub dates: Option<Vec<DateTime<FixedOffset>>>,
}

impl UploadSeriesRequest {
    /// Name of the series to upload.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata
            .get("PrimName")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Builder for an in-house series upload.
#[derive(Clone, Debug)]
pub struct InHouseSeries {
    name: String,
    description: String,
    region: String,
    category: String,
    frequency: SeriesFrequency,
    values: Vec<Option<f64>>,
    start_date: Option<UploadTimestamp>,
    dates: Option<Vec<UploadTimestamp>>,
    day_mask: SeriesWeekdays,
    metadata: Metadata,
    forecast_flags: Option<Vec<bool>>,
}

impl InHouseSeries {
    /// Starts an upload of `values`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        region: impl Into<String>,
        category: impl Into<String>,
        frequency: SeriesFrequency,
        values: Vec<Option<f64>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            region: region.into(),
            category: category.into(),
            frequency,
            values,
            start_date: None,
            dates: None,
            day_mask: SeriesWeekdays::default(),
            metadata: Metadata::new(),
            forecast_flags: None,
        }
    }

    /// Sets the date of the first observation. Must carry an offset.
    #[must_use]
    pub fn start_date(mut self, start: impl Into<UploadTimestamp>) -> Self {
        self.start_date = Some(start.into());
        self
    }

    /// Sets one date per observation. Naive dates take the local offset.
    #[must_use]
    pub fn dates<I, T>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<UploadTimestamp>,
    {
        self.dates = Some(dates.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the weekdays of a daily series.
    #[must_use]
    pub const fn with_day_mask(mut self, day_mask: SeriesWeekdays) -> Self {
        self.day_mask = day_mask;
        self
    }

    /// Adds a metadata attribute.
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    /// Sets one forecast flag per observation.
    #[must_use]
    pub fn with_forecast_flags(mut self, flags: Vec<bool>) -> Self {
        self.forecast_flags = Some(flags);
        self
    }

    /// Validates the parameters and builds the request body.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if a derived attribute conflicts with the
    /// caller's metadata, the start date has no offset, neither or both of start date and
    /// dates are given, the frequency is relative, or a per-observation list does not
    /// match the number of values.
    pub fn build(self) -> Result<UploadSeriesRequest> {
        if self.name.is_empty() {
            return Err(DataError::InvalidParameter(
                "Series name must not be empty".to_string(),
            ));
        }

        let frequency = self.frequency.metadata_name().ok_or_else(|| {
            DataError::InvalidParameter(format!(
                "{:?} is not a frequency a series can be stored with",
                self.frequency
            ))
        })?;

        let mut metadata = self.metadata;
        set_metadata(&mut metadata, "PrimName", Value::from(self.name))?;
        set_metadata(&mut metadata, "Description", Value::from(self.description))?;
        set_metadata(&mut metadata, "Region", Value::from(self.region))?;
        set_metadata(&mut metadata, "IHCategory", Value::from(self.category))?;
        set_metadata(&mut metadata, "Frequency", Value::from(frequency))?;
        set_metadata(&mut metadata, "DayMask", Value::from(self.day_mask.mask()))?;

        let dates = match (self.start_date, self.dates) {
            (Some(UploadTimestamp::Zoned(start)), None) => {
                set_metadata(&mut metadata, "StartDate", Value::from(start.to_rfc3339()))?;
                None
            }
            (Some(UploadTimestamp::Naive(_)), None) => {
                return Err(DataError::InvalidParameter(
                    "start_date must have a time zone".to_string(),
                ));
            }
            (None, Some(dates)) => {
                if dates.len() != self.values.len() {
                    return Err(DataError::InvalidParameter(format!(
                        "Got {} dates for {} values",
                        dates.len(),
                        self.values.len()
                    )));
                }
                let zoned = dates
                    .into_iter()
                    .map(UploadTimestamp::to_zoned_local)
                    .collect::<Result<Vec<_>>>()?;
                Some(zoned)
            }
            (None, None) => {
                return Err(DataError::InvalidParameter(
                    "Either a start date or dates are required".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(DataError::InvalidParameter(
                    "Give either a start date or dates, not both".to_string(),
                ));
            }
        };

        if let Some(flags) = &self.forecast_flags {
            if flags.len() != self.values.len() {
                return Err(DataError::InvalidParameter(format!(
                    "Got {} forecast flags for {} values",
                    flags.len(),
                    self.values.len()
                )));
            }
        }

        Ok(UploadSeriesRequest {
            forecast_flags: self.forecast_flags,
            metadata,
            values: self.values,
            dates,
        })
    }
}

fn set_metadata(metadata: &mut Metadata, name: &str, value: Value) -> Result<()> {
    match metadata.get(name) {
        Some(existing) if *existing != value => Err(DataError::InvalidParameter(format!(
            "{name} in metadata does not match {name}"
        ))),
        Some(_) => Ok(()),
        None => {
            metadata.insert(name.to_string(), value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn monthly(values: Vec<Option<f64>>) -> InHouseSeries {
        InHouseSeries::new(
            "ih:mb:priv:s1",
            "My forecast",
            "us",
            "Forecasts",
            SeriesFrequency::Monthly,
            values,
        )
    }

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_derived_metadata() {
        let request = monthly(vec![Some(1.0), None, Some(3.0)])
            .start_date(start())
            .build()
            .unwrap();

        assert_eq!(request.name(), "ih:mb:priv:s1");
        assert_eq!(request.metadata["Description"], "My forecast");
        assert_eq!(request.metadata["IHCategory"], "Forecasts");
        assert_eq!(request.metadata["Frequency"], "monthly");
        assert_eq!(request.metadata["DayMask"], 62);
        assert_eq!(request.metadata["StartDate"], "2024-01-01T00:00:00+01:00");
        assert!(request.dates.is_none());

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["values"], serde_json::json!([1.0, null, 3.0]));
        assert!(body["forecastFlags"].is_null());
    }

    #[test]
    fn test_naive_start_date_rejected() {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let result = monthly(vec![Some(1.0)]).start_date(naive).build();
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));
    }

    #[test]
    fn test_metadata_conflict_rejected() {
        let result = monthly(vec![Some(1.0)])
            .with_metadata("Region", "se")
            .start_date(start())
            .build();
        assert!(matches!(result, Err(DataError::InvalidParameter(_))));

        let agreeing = monthly(vec![Some(1.0)])
            .with_metadata("Region", "us")
            .start_date(start())
            .build();
        assert!(agreeing.is_ok());
    }

    #[test]
    fn test_start_or_dates_required() {
        assert!(monthly(vec![Some(1.0)]).build().is_err());

        let both = monthly(vec![Some(1.0)])
            .start_date(start())
            .dates([start()])
            .build();
        assert!(both.is_err());
    }

    #[test]
    fn test_dates_take_offsets() {
        let naive = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dates = vec![UploadTimestamp::from(start()), UploadTimestamp::from(naive)];

        let request = monthly(vec![Some(1.0), Some(2.0)]).dates(dates).build().unwrap();
        let dates = request.dates.unwrap();

        assert_eq!(dates[0], start());
        assert_eq!(dates[1].naive_local(), naive);
    }

    #[test]
    fn test_length_checks() {
        let dates = monthly(vec![Some(1.0), Some(2.0)]).dates([Utc::now()]).build();
        assert!(dates.is_err());

        let flags = monthly(vec![Some(1.0)])
            .start_date(start())
            .with_forecast_flags(vec![true, false])
            .build();
        assert!(flags.is_err());
    }

    #[test]
    fn test_relative_frequency_rejected() {
        let result = InHouseSeries::new("s", "d", "us", "c", SeriesFrequency::Highest, vec![])
            .start_date(start())
            .build();
        assert!(result.is_err());
    }
}
