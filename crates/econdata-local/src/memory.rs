//! In-memory local database.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, TimeDelta, Utc};
use econdata_core::{
    CalendarDateMode, CalendarMergeMode, DataError, Metadata, Result, SearchFilter,
    SeriesFrequency, SeriesMissingValueMethod, SeriesWeekdays, StartOrEndPoint,
    UnifiedSeriesRequest, UploadSeriesRequest, fill_metadata,
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::native::{
    LocalDatabase, NativeEntity, NativeMetadataInformation, NativeMetadataValue,
    NativeRevisionInfo, NativeSearchResult, NativeSeries, NativeUnifiedSeries, NativeVintage,
};

const NOT_FOUND: &str = "Not found";
const NOT_A_SERIES: &str = "Not a time series";
const TIME_SERIES: &str = "TimeSeries";

/// Observations published at one point in time.
#[derive(Debug, Clone)]
struct StoredVintage {
    time_stamp: Option<DateTime<Utc>>,
    values: Vec<f64>,
    dates: Vec<DateTime<Utc>>,
}

/// An entity and, for series, its vintages ordered oldest first.
#[derive(Debug, Clone)]
struct StoredEntity {
    name: String,
    title: String,
    metadata: Metadata,
    vintages: Vec<StoredVintage>,
}

impl StoredEntity {
    fn native(&self) -> NativeEntity {
        NativeEntity::new(&self.name, &self.title, Arc::new(self.metadata.clone()))
    }

    fn native_series(&self, vintage: &StoredVintage) -> NativeSeries {
        NativeSeries {
            entity: self.native(),
            values: vintage.values.clone(),
            dates: vintage.dates.clone(),
        }
    }

    fn current(&self) -> Option<&StoredVintage> {
        self.vintages.last()
    }

    fn vintage_time_stamps(&self) -> Vec<DateTime<Utc>> {
        self.vintages.iter().filter_map(|v| v.time_stamp).collect()
    }

    fn is_discontinued(&self) -> bool {
        matches!(self.metadata.get("Discontinued"), Some(Value::Bool(true)))
    }
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| DataError::Backend("Database lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| DataError::Backend("Database lock poisoned".to_string()))
}

fn check_lengths(values: &[f64], dates: &[DateTime<Utc>]) -> Result<()> {
    if values.len() != dates.len() {
        return Err(DataError::InvalidParameter(format!(
            "Got {} dates for {} values",
            dates.len(),
            values.len()
        )));
    }
    Ok(())
}

/// A local database held in memory, for tests and offline development.
///
/// Names are case-insensitive. Data is lost when the database is dropped.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    entities: RwLock<HashMap<String, StoredEntity>>,
    attributes: RwLock<HashMap<String, NativeMetadataInformation>>,
    values: RwLock<HashMap<String, Vec<NativeMetadataValue>>>,
    search_limit: Option<usize>,
}

impl InMemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of search results. Searches matching more are truncated.
    #[must_use]
    pub const fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = Some(limit);
        self
    }

    /// Stores an entity without observations, replacing any entity of the same name.
    ///
    /// # Errors
    /// Returns [`DataError::Backend`] if the database lock is poisoned.
    pub fn insert_entity(
        &self,
        name: impl Into<String>,
        title: impl Into<String>,
        mut metadata: Metadata,
    ) -> Result<()> {
        let name = name.into();
        metadata
            .entry("PrimName")
            .or_insert_with(|| Value::String(name.clone()));
        let entity = StoredEntity {
            name,
            title: title.into(),
            metadata,
            vintages: Vec::new(),
        };
        write(&self.entities)?.insert(key(&entity.name), entity);
        Ok(())
    }

    /// Stores a series without revision history, replacing any entity of the same name.
    ///
    /// `NaN` marks a missing value.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] if `values` and `dates` differ in length.
    pub fn insert_series(
        &self,
        name: impl Into<String>,
        title: impl Into<String>,
        mut metadata: Metadata,
        values: Vec<f64>,
        dates: Vec<DateTime<Utc>>,
    ) -> Result<()> {
        check_lengths(&values, &dates)?;
        let name = name.into();
        metadata
            .entry("PrimName")
            .or_insert_with(|| Value::String(name.clone()));
        metadata
            .entry("EntityType")
            .or_insert_with(|| Value::String(TIME_SERIES.to_string()));
        let entity = StoredEntity {
            name,
            title: title.into(),
            metadata,
            vintages: vec![StoredVintage {
                time_stamp: None,
                values,
                dates,
            }],
        };
        write(&self.entities)?.insert(key(&entity.name), entity);
        Ok(())
    }

    /// Adds a vintage published at `time_stamp` to a stored series.
    ///
    /// # Errors
    /// Returns [`DataError::Backend`] if no series of that name is stored and
    /// [`DataError::InvalidParameter`] if `values` and `dates` differ in length.
    pub fn insert_vintage(
        &self,
        name: &str,
        time_stamp: DateTime<Utc>,
        values: Vec<f64>,
        dates: Vec<DateTime<Utc>>,
    ) -> Result<()> {
        check_lengths(&values, &dates)?;
        let mut entities = write(&self.entities)?;
        let entity = entities
            .get_mut(&key(name))
            .ok_or_else(|| DataError::Backend(format!("{name}: {NOT_FOUND}")))?;
        entity.vintages.push(StoredVintage {
            time_stamp: Some(time_stamp),
            values,
            dates,
        });
        entity.vintages.sort_by_key(|v| v.time_stamp);
        Ok(())
    }

    /// Stores the description of a metadata attribute.
    ///
    /// # Errors
    /// Returns [`DataError::Backend`] if the database lock is poisoned.
    pub fn insert_attribute(&self, information: NativeMetadataInformation) -> Result<()> {
        write(&self.attributes)?.insert(key(&information.name), information);
        Ok(())
    }

    /// Stores the allowed values of a metadata attribute.
    ///
    /// # Errors
    /// Returns [`DataError::Backend`] if the database lock is poisoned.
    pub fn insert_attribute_values(
        &self,
        name: &str,
        values: Vec<NativeMetadataValue>,
    ) -> Result<()> {
        write(&self.values)?.insert(key(name), values);
        Ok(())
    }

    fn with_entities<T>(
        &self,
        names: &[String],
        found: impl Fn(&StoredEntity) -> T,
        missing: impl Fn(&str) -> T,
    ) -> Result<Vec<T>> {
        let entities = read(&self.entities)?;
        Ok(names
            .iter()
            .map(|name| match entities.get(&key(name)) {
                Some(entity) => found(entity),
                None => missing(name.as_str()),
            })
            .collect())
    }
}

impl LocalDatabase for InMemoryDatabase {
    #[instrument(skip(self, names), fields(count = names.len()))]
    fn fetch_entities(&self, names: &[String]) -> Result<Vec<NativeEntity>> {
        self.with_entities(names, StoredEntity::native, |name| {
            NativeEntity::failed(name, NOT_FOUND)
        })
    }

    #[instrument(skip(self, names), fields(count = names.len()))]
    fn fetch_series(&self, names: &[String]) -> Result<Vec<NativeSeries>> {
        self.with_entities(
            names,
            |entity| match entity.current() {
                Some(vintage) => entity.native_series(vintage),
                None => NativeSeries::failed(&entity.name, NOT_A_SERIES),
            },
            |name| NativeSeries::failed(name, NOT_FOUND),
        )
    }

    #[instrument(skip(self, names), fields(count = names.len()))]
    fn fetch_revision_info(&self, names: &[String]) -> Result<Vec<NativeRevisionInfo>> {
        let failed = |name: &str, message: &str| NativeRevisionInfo {
            name: name.to_string(),
            is_error: true,
            error_message: message.to_string(),
            ..Default::default()
        };
        self.with_entities(
            names,
            |entity| {
                if entity.vintages.is_empty() {
                    return failed(entity.name.as_str(), NOT_A_SERIES);
                }
                let stamps = entity.vintage_time_stamps();
                NativeRevisionInfo {
                    name: entity.name.clone(),
                    is_error: false,
                    error_message: String::new(),
                    stores_revisions: !stamps.is_empty(),
                    has_revisions: stamps.len() > 1,
                    time_stamp_of_last_revision: stamps.last().copied(),
                    vintage_time_stamps: stamps,
                }
            },
            |name| failed(name, NOT_FOUND),
        )
    }

    #[instrument(skip(self, names), fields(count = names.len(), time = %time))]
    fn fetch_vintage_series(
        &self,
        time: DateTime<Utc>,
        names: &[String],
    ) -> Result<Vec<NativeVintage>> {
        self.with_entities(
            names,
            |entity| {
                if entity.vintages.is_empty() {
                    return NativeVintage {
                        series: NativeSeries::failed(&entity.name, NOT_A_SERIES),
                        vintage_time_stamp: None,
                    };
                }
                let vintage = entity
                    .vintages
                    .iter()
                    .rev()
                    .find(|v| v.time_stamp.is_none_or(|t| t <= time));
                match vintage {
                    Some(vintage) => NativeVintage {
                        series: entity.native_series(vintage),
                        vintage_time_stamp: vintage.time_stamp,
                    },
                    None => NativeVintage {
                        series: NativeSeries::failed(
                            &entity.name,
                            format!("No vintage at {}", time.to_rfc3339()),
                        ),
                        vintage_time_stamp: None,
                    },
                }
            },
            |name| NativeVintage {
                series: NativeSeries::failed(name, NOT_FOUND),
                vintage_time_stamp: None,
            },
        )
    }

    #[instrument(skip(self))]
    fn fetch_all_vintage_series(&self, name: &str) -> Result<Vec<NativeVintage>> {
        let entities = read(&self.entities)?;
        let entity = entities
            .get(&key(name))
            .ok_or_else(|| DataError::Backend(format!("{name}: {NOT_FOUND}")))?;
        Ok(entity
            .vintages
            .iter()
            .map(|vintage| NativeVintage {
                series: entity.native_series(vintage),
                vintage_time_stamp: vintage.time_stamp,
            })
            .collect())
    }

    #[instrument(skip(self, names), fields(count = names.len()))]
    fn attribute_information(&self, names: &[String]) -> Result<Vec<NativeMetadataInformation>> {
        let attributes = read(&self.attributes)?;
        names
            .iter()
            .map(|name| {
                attributes
                    .get(&key(name))
                    .cloned()
                    .ok_or_else(|| DataError::Backend(format!("Unknown attribute {name}")))
            })
            .collect()
    }

    #[instrument(skip(self))]
    fn list_attribute_values(&self, name: &str) -> Result<Vec<NativeMetadataValue>> {
        read(&self.values)?
            .get(&key(name))
            .cloned()
            .ok_or_else(|| DataError::Backend(format!("The values of {name} cannot be listed")))
    }

    #[instrument(skip(self, request), fields(count = request.series_entries.len()))]
    fn fetch_unified_series(&self, request: &UnifiedSeriesRequest) -> Result<NativeUnifiedSeries> {
        if request.frequency != SeriesFrequency::Highest {
            return Err(DataError::NotSupported(
                "Frequency conversion in the in-memory database".to_string(),
            ));
        }
        if request.currency.is_some() {
            return Err(DataError::NotSupported(
                "Currency conversion in the in-memory database".to_string(),
            ));
        }

        let names = request
            .series_entries
            .iter()
            .map(|e| e.name.clone())
            .collect::<Vec<_>>();
        let series = self.fetch_series(&names)?;
        let available = series
            .iter()
            .filter(|s| !s.entity.is_error)
            .collect::<Vec<_>>();

        let mut calendar = merge_calendars(&available, request.calendar_merge_mode);
        if let Some(point) = &request.start_point {
            let start = match point {
                StartOrEndPoint::Sentinel {
                    mode: CalendarDateMode::DataInAllSeries,
                } => available.iter().filter_map(|s| s.dates.first()).max().copied(),
                _ => bound(point)?,
            };
            if let Some(start) = start {
                calendar.retain(|d| *d >= start);
            }
        }
        if let Some(point) = &request.end_point {
            let end = match point {
                StartOrEndPoint::Sentinel {
                    mode: CalendarDateMode::DataInAllSeries,
                } => available.iter().filter_map(|s| s.dates.last()).min().copied(),
                _ => bound(point)?,
            };
            if let Some(end) = end {
                calendar.retain(|d| *d <= end);
            }
        }
        let dates = calendar.into_iter().collect::<Vec<_>>();

        let series = series
            .into_iter()
            .zip(&request.series_entries)
            .map(|(series, entry)| {
                if series.entity.is_error {
                    return series;
                }
                let observations = series
                    .dates
                    .iter()
                    .copied()
                    .zip(series.values.iter().copied())
                    .collect::<BTreeMap<_, _>>();
                let mut values = dates
                    .iter()
                    .map(|d| observations.get(d).copied().unwrap_or(f64::NAN))
                    .collect::<Vec<_>>();
                fill_missing(&mut values, entry.missing_value_method);
                NativeSeries {
                    entity: series.entity,
                    values,
                    dates: dates.clone(),
                }
            })
            .collect();

        debug!(dates = dates.len(), "Unified series");
        Ok(NativeUnifiedSeries { dates, series })
    }

    #[instrument(skip(self, filters), fields(count = filters.len()))]
    fn search(
        &self,
        filters: &[SearchFilter],
        include_discontinued: bool,
    ) -> Result<NativeSearchResult> {
        let entities = read(&self.entities)?;
        let mut matches = entities
            .values()
            .filter(|e| include_discontinued || !e.is_discontinued())
            .filter(|e| {
                let metadata = fill_metadata(&e.metadata, &e.title);
                filters.iter().all(|f| f.matches(&metadata))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| a.name.cmp(&b.name));

        let is_truncated = self.search_limit.is_some_and(|limit| matches.len() > limit);
        if let Some(limit) = self.search_limit {
            matches.truncate(limit);
        }

        debug!(count = matches.len(), truncated = is_truncated, "Search completed");
        Ok(NativeSearchResult {
            entities: matches.into_iter().map(StoredEntity::native).collect(),
            is_truncated,
        })
    }

    #[instrument(skip(self, request), fields(name = request.name()))]
    fn upload_series(&self, request: &UploadSeriesRequest) -> Result<()> {
        let name = request.name();
        if name.is_empty() {
            return Err(DataError::InvalidParameter(
                "Series name must not be empty".to_string(),
            ));
        }

        let dates = match &request.dates {
            Some(dates) => dates.iter().map(|d| d.with_timezone(&Utc)).collect(),
            None => generate_dates(&request.metadata, request.values.len())?,
        };
        let values = request
            .values
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        let title = request
            .metadata
            .get("Description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        self.insert_series(name, title, request.metadata.clone(), values, dates)?;
        debug!("Stored in-house series");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete_series(&self, name: &str) -> Result<()> {
        write(&self.entities)?
            .remove(&key(name))
            .map(|_| ())
            .ok_or_else(|| DataError::Backend(format!("{name}: {NOT_FOUND}")))
    }
}

fn merge_calendars(series: &[&NativeSeries], mode: CalendarMergeMode) -> BTreeSet<DateTime<Utc>> {
    let mut sets = series
        .iter()
        .map(|s| s.dates.iter().copied().collect::<BTreeSet<_>>());
    match mode {
        CalendarMergeMode::AvailableInAll => {
            let first = sets.next().unwrap_or_default();
            sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
        }
        _ => sets.flatten().collect(),
    }
}

/// The date of an absolute point. Sentinels on any series do not narrow the calendar.
fn bound(point: &StartOrEndPoint) -> Result<Option<DateTime<Utc>>> {
    match point {
        StartOrEndPoint::Absolute { value, .. } => parse_date(value).map(Some),
        StartOrEndPoint::Sentinel { .. } => Ok(None),
        StartOrEndPoint::Relative { .. } => Err(DataError::NotSupported(
            "Relative start and end points in the in-memory database".to_string(),
        )),
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .ok_or_else(|| DataError::InvalidParameter(format!("Invalid date {value}")))
}

fn fill_missing(values: &mut [f64], method: SeriesMissingValueMethod) {
    match method {
        SeriesMissingValueMethod::None | SeriesMissingValueMethod::Auto => {}
        SeriesMissingValueMethod::Zero => {
            for value in values.iter_mut().filter(|v| v.is_nan()) {
                *value = 0.0;
            }
        }
        SeriesMissingValueMethod::Previous => {
            let mut last = f64::NAN;
            for value in values.iter_mut() {
                if value.is_nan() {
                    *value = last;
                } else {
                    last = *value;
                }
            }
        }
        SeriesMissingValueMethod::Linear => {
            let known = (0..values.len())
                .filter(|i| !values[*i].is_nan())
                .collect::<Vec<_>>();
            for pair in known.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let (from, to) = (values[a], values[b]);
                for i in a + 1..b {
                    let t = (i - a) as f64 / (b - a) as f64;
                    values[i] = from + (to - from) * t;
                }
            }
        }
    }
}

/// Observation dates of an upload given as a start date, from its frequency and day mask.
fn generate_dates(metadata: &Metadata, count: usize) -> Result<Vec<DateTime<Utc>>> {
    let start = metadata
        .get("StartDate")
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::InvalidParameter("Missing StartDate".to_string()))?;
    let start = DateTime::parse_from_rfc3339(start)
        .map_err(|e| DataError::InvalidParameter(format!("Invalid StartDate {start}: {e}")))?;
    let frequency = metadata
        .get("Frequency")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let day_mask = metadata
        .get("DayMask")
        .and_then(Value::as_u64)
        .and_then(|m| u8::try_from(m).ok())
        .unwrap_or(SeriesWeekdays::default().mask());

    let dates = match date_step(frequency)? {
        DateStep::Days => {
            let mut dates = Vec::with_capacity(count);
            let mut date = start;
            for _ in 0..count {
                dates.push(date.with_timezone(&Utc));
                date = next_weekday(date, day_mask);
            }
            dates
        }
        step => (0..count)
            .map(|i| nth_date(start, step, i).map(|d| d.with_timezone(&Utc)))
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(dates)
}

/// Distance between two observations of a frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateStep {
    Months(u32),
    Weeks,
    Days,
}

fn date_step(frequency: &str) -> Result<DateStep> {
    match frequency {
        "annual" => Ok(DateStep::Months(12)),
        "semiannual" => Ok(DateStep::Months(6)),
        "quarterly" | "quarterlyfull" => Ok(DateStep::Months(3)),
        "bimonthly" => Ok(DateStep::Months(2)),
        "monthly" => Ok(DateStep::Months(1)),
        "weekly" => Ok(DateStep::Weeks),
        "daily" => Ok(DateStep::Days),
        other => Err(DataError::InvalidParameter(format!(
            "Unknown frequency {other:?}"
        ))),
    }
}

/// The `index`-th date counted from `start`, so month ends are kept (Jan 31, Feb 29, Mar 31).
fn nth_date(
    start: DateTime<FixedOffset>,
    step: DateStep,
    index: usize,
) -> Result<DateTime<FixedOffset>> {
    let out_of_range = || DataError::InvalidParameter(format!("Date out of range after {start}"));
    let index = u32::try_from(index).map_err(|_| out_of_range())?;
    match step {
        DateStep::Months(months) => months
            .checked_mul(index)
            .and_then(|m| start.checked_add_months(Months::new(m))),
        DateStep::Weeks => TimeDelta::try_weeks(i64::from(index))
            .and_then(|delta| start.checked_add_signed(delta)),
        DateStep::Days => TimeDelta::try_days(i64::from(index))
            .and_then(|delta| start.checked_add_signed(delta)),
    }
    .ok_or_else(out_of_range)
}

fn next_weekday(date: DateTime<FixedOffset>, day_mask: u8) -> DateTime<FixedOffset> {
    let mut next = date + TimeDelta::days(1);
    // A mask without days would never match.
    if day_mask & 0x7f != 0 {
        while day_mask & (1 << next.weekday().num_days_from_sunday()) == 0 {
            next += TimeDelta::days(1);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use econdata_core::{InHouseSeries, SeriesEntry};
    use serde_json::json;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn metadata(value: Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn database() -> InMemoryDatabase {
        let db = InMemoryDatabase::new();
        db.insert_series(
            "usgdp",
            "United States, GDP",
            metadata(json!({"Region": "us", "MoveBase": "pp100"})),
            vec![1.0, 2.0, 3.0],
            vec![day(2020, 1, 1), day(2021, 1, 1), day(2022, 1, 1)],
        )
        .unwrap();
        db.insert_series(
            "segdp",
            "Sweden, GDP",
            metadata(json!({"Region": "se", "MoveBase": "pp100"})),
            vec![10.0, 20.0],
            vec![day(2021, 1, 1), day(2022, 1, 1)],
        )
        .unwrap();
        db.insert_series(
            "uscpi",
            "United States, CPI",
            metadata(json!({"Region": "us", "Discontinued": true})),
            vec![5.0],
            vec![day(2022, 1, 1)],
        )
        .unwrap();
        db.insert_entity("us", "United States", metadata(json!({"EntityType": "Region"})))
            .unwrap();
        db
    }

    #[test]
    fn test_unknown_names_are_error_entities() {
        let db = database();
        let entities = db.fetch_entities(&names(&["USGDP", "nope"])).unwrap();

        assert_eq!(entities.len(), 2);
        assert!(entities[0].error().is_none());
        assert_eq!(entities[0].title, "United States, GDP");
        assert_eq!(entities[1].error(), Some(NOT_FOUND));
    }

    #[test]
    fn test_entity_without_observations_is_not_a_series() {
        let series = database().fetch_series(&names(&["us"])).unwrap();
        assert_eq!(series[0].entity.error(), Some(NOT_A_SERIES));
    }

    #[test]
    fn test_vintages() {
        let db = InMemoryDatabase::new();
        db.insert_entity("gdp", "GDP", Metadata::new()).unwrap();
        db.insert_vintage("gdp", day(2021, 6, 1), vec![1.0], vec![day(2021, 1, 1)])
            .unwrap();
        db.insert_vintage("gdp", day(2020, 6, 1), vec![0.5], vec![day(2020, 1, 1)])
            .unwrap();

        let info = db.fetch_revision_info(&names(&["gdp"])).unwrap();
        assert!(info[0].has_revisions);
        assert_eq!(info[0].vintage_time_stamps, vec![day(2020, 6, 1), day(2021, 6, 1)]);
        assert_eq!(info[0].time_stamp_of_last_revision, Some(day(2021, 6, 1)));

        let at = db.fetch_vintage_series(day(2021, 1, 1), &names(&["gdp"])).unwrap();
        assert_eq!(at[0].vintage_time_stamp, Some(day(2020, 6, 1)));
        assert_eq!(at[0].series.values, vec![0.5]);

        let before = db.fetch_vintage_series(day(2019, 1, 1), &names(&["gdp"])).unwrap();
        assert!(before[0].series.entity.error().is_some());

        assert_eq!(db.fetch_all_vintage_series("gdp").unwrap().len(), 2);
        assert!(db.fetch_all_vintage_series("nope").is_err());
    }

    #[test]
    fn test_search() {
        let db = database();
        let filter = SearchFilter::new().with_must_have_value("MoveBase", "pp100");

        let result = db.search(&[filter.clone()], false).unwrap();
        let found = result.entities.iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
        assert_eq!(found, vec!["segdp", "usgdp"]);
        assert!(!result.is_truncated);

        let text = SearchFilter::new().with_text("united states");
        assert_eq!(db.search(&[text.clone()], false).unwrap().entities.len(), 2);
        assert_eq!(db.search(&[text], true).unwrap().entities.len(), 3);

        let limited = InMemoryDatabase::new().with_search_limit(1);
        limited
            .insert_series("a", "A", Metadata::new(), vec![], vec![])
            .unwrap();
        limited
            .insert_series("b", "B", Metadata::new(), vec![], vec![])
            .unwrap();
        let result = limited.search(&[], false).unwrap();
        assert_eq!(result.entities.len(), 1);
        assert!(result.is_truncated);
    }

    #[test]
    fn test_unified_series_calendar() {
        let db = database();
        let request = UnifiedSeriesRequest::new(["usgdp", "nope", "segdp"]);

        let unified = db.fetch_unified_series(&request).unwrap();
        assert_eq!(unified.dates.len(), 3);
        assert_eq!(unified.series.len(), 3);
        assert!(unified.series[1].entity.error().is_some());
        assert!(unified.series[2].values[0].is_nan());

        let request = UnifiedSeriesRequest::new(["usgdp", "segdp"])
            .with_calendar_merge_mode(CalendarMergeMode::AvailableInAll)
            .with_end_point(StartOrEndPoint::new("2021-06-30", None).unwrap());
        let unified = db.fetch_unified_series(&request).unwrap();
        assert_eq!(unified.dates, vec![day(2021, 1, 1)]);
        assert_eq!(unified.series[1].values, vec![10.0]);
    }

    #[test]
    fn test_unified_series_fill_and_bounds() {
        let db = database();
        let request = UnifiedSeriesRequest::new([
            SeriesEntry::new("segdp").with_missing_value_method(SeriesMissingValueMethod::Zero),
            SeriesEntry::new("usgdp"),
        ]);
        let unified = db.fetch_unified_series(&request).unwrap();
        assert_eq!(unified.series[0].values, vec![0.0, 10.0, 20.0]);

        let request = UnifiedSeriesRequest::new(["usgdp", "segdp"])
            .with_start_point(StartOrEndPoint::data_in_all_series());
        let unified = db.fetch_unified_series(&request).unwrap();
        assert_eq!(unified.dates, vec![day(2021, 1, 1), day(2022, 1, 1)]);

        let relative = UnifiedSeriesRequest::new(["usgdp"])
            .with_start_point(StartOrEndPoint::relative_to_years(-1));
        assert!(matches!(
            db.fetch_unified_series(&relative),
            Err(DataError::NotSupported(_))
        ));
        let annual = UnifiedSeriesRequest::new(["usgdp"]).with_frequency(SeriesFrequency::Annual);
        assert!(matches!(
            db.fetch_unified_series(&annual),
            Err(DataError::NotSupported(_))
        ));
    }

    #[test]
    fn test_fill_missing_linear() {
        let mut values = vec![f64::NAN, 1.0, f64::NAN, f64::NAN, 4.0, f64::NAN];
        fill_missing(&mut values, SeriesMissingValueMethod::Linear);
        assert!(values[0].is_nan());
        assert_eq!(&values[1..5], &[1.0, 2.0, 3.0, 4.0]);
        assert!(values[5].is_nan());

        let mut values = vec![1.0, f64::NAN, 3.0];
        fill_missing(&mut values, SeriesMissingValueMethod::Previous);
        assert_eq!(values, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_upload_and_delete() {
        let db = InMemoryDatabase::new();
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap();
        let request = InHouseSeries::new(
            "ih:mb:priv:s1",
            "Test series",
            "us",
            "Tests",
            SeriesFrequency::Monthly,
            vec![Some(1.0), None, Some(3.0)],
        )
        .start_date(start)
        .build()
        .unwrap();

        db.upload_series(&request).unwrap();

        let series = db.fetch_series(&names(&["ih:mb:priv:s1"])).unwrap();
        assert_eq!(series[0].entity.title, "Test series");
        assert_eq!(series[0].dates, vec![day(2024, 1, 1), day(2024, 2, 1), day(2024, 3, 1)]);
        assert!(series[0].values[1].is_nan());

        db.delete_series("ih:mb:priv:s1").unwrap();
        assert!(db.delete_series("ih:mb:priv:s1").is_err());
    }

    #[test]
    fn test_daily_dates_follow_mask() {
        // 2024-01-05 is a Friday.
        let friday = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 5, 0, 0, 0)
            .unwrap();
        let next = next_weekday(friday, SeriesWeekdays::MondayToFriday.mask());
        assert_eq!(next.day(), 8);
        let next = next_weekday(friday, SeriesWeekdays::FullWeek.mask());
        assert_eq!(next.day(), 6);
    }

    #[test]
    fn test_monthly_dates_keep_month_end() {
        let metadata = metadata(json!({
            "StartDate": "2024-01-31T00:00:00+00:00",
            "Frequency": "monthly",
        }));

        let dates = generate_dates(&metadata, 4).unwrap();

        assert_eq!(
            dates,
            vec![day(2024, 1, 31), day(2024, 2, 29), day(2024, 3, 31), day(2024, 4, 30)]
        );
    }

    #[test]
    fn test_weekly_and_quarterly_dates_count_from_start() {
        let weekly = metadata(json!({
            "StartDate": "2024-01-05T00:00:00+00:00",
            "Frequency": "weekly",
        }));
        assert_eq!(
            generate_dates(&weekly, 3).unwrap(),
            vec![day(2024, 1, 5), day(2024, 1, 12), day(2024, 1, 19)]
        );

        let quarterly = metadata(json!({
            "StartDate": "2023-11-30T00:00:00+00:00",
            "Frequency": "quarterly",
        }));
        assert_eq!(
            generate_dates(&quarterly, 3).unwrap(),
            vec![day(2023, 11, 30), day(2024, 2, 29), day(2024, 5, 30)]
        );

        let unknown = metadata(json!({
            "StartDate": "2024-01-05T00:00:00+00:00",
            "Frequency": "hourly",
        }));
        assert!(matches!(
            generate_dates(&unknown, 1),
            Err(DataError::InvalidParameter(_))
        ));
    }
}
