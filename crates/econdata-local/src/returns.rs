//! Local adapters.
//!
//! Shape differences of the local database are handled here: `NaN` becomes a missing
//! value, empty comments become `None`, the first revision is taken from the vintage list
//! and metadata containers are normalized.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use econdata_core::{
    ApiReturn, DataError, Entity, GetEntitiesError, MetadataAttributeInformation,
    MetadataValueInformationItem, MetadataValuesReturn, Result, RevisionInfo, Series,
    TableOptions, UnifiedSerie, UnifiedSeries, UnifiedSeriesRequest, UnifiedSeriesReturn,
    VintageSeries, fill_metadata, unified_frame,
};
use polars::prelude::DataFrame;
use tracing::{debug, instrument};

use crate::native::{
    LocalDatabase, NativeEntity, NativeMetadataInformation, NativeMetadataValue,
    NativeRevisionInfo, NativeSeries, NativeUnifiedSeries, NativeVintage,
};

fn check_len<T>(entries: Vec<T>, names: &[String]) -> Result<Vec<T>> {
    if entries.len() != names.len() {
        return Err(DataError::Backend(format!(
            "Expected {} results, got {}",
            names.len(),
            entries.len()
        )));
    }
    Ok(entries)
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn optional_value(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// Converts a native entity.
pub fn convert_entity(name: &str, entity: &NativeEntity) -> Entity {
    match entity.error() {
        Some(error) => Entity::failed(name, error),
        None => Entity::new(name, fill_metadata(entity.metadata.as_ref(), &entity.title)),
    }
}

/// Converts a native series.
pub fn convert_series(name: &str, series: &NativeSeries) -> Series {
    if let Some(error) = series.entity.error() {
        return Series::failed(name, error);
    }
    Series {
        name: name.to_string(),
        error_message: String::new(),
        metadata: fill_metadata(series.entity.metadata.as_ref(), &series.entity.title),
        values: series.values.iter().copied().map(optional_value).collect(),
        dates: series.dates.clone(),
    }
}

/// Converts a native vintage.
pub fn convert_vintage(name: &str, vintage: &NativeVintage) -> VintageSeries {
    VintageSeries {
        series: convert_series(name, &vintage.series),
        vintage_time_stamp: vintage
            .series
            .entity
            .error()
            .is_none()
            .then_some(vintage.vintage_time_stamp)
            .flatten(),
    }
}

/// Converts native revision information.
pub fn convert_revision_info(name: &str, info: &NativeRevisionInfo) -> RevisionInfo {
    if let Some(error) = info.error() {
        return RevisionInfo::failed(name, error);
    }
    RevisionInfo {
        name: name.to_string(),
        error_message: String::new(),
        stores_revisions: info.stores_revisions,
        has_revisions: info.has_revisions,
        time_stamp_of_first_revision: info.vintage_time_stamps.first().copied(),
        time_stamp_of_last_revision: info.time_stamp_of_last_revision,
        vintage_time_stamps: info.vintage_time_stamps.clone(),
    }
}

/// Converts a native attribute description.
pub fn convert_attribute_information(
    info: &NativeMetadataInformation,
) -> MetadataAttributeInformation {
    MetadataAttributeInformation {
        name: info.name.clone(),
        description: info.description.clone(),
        comment: non_empty(&info.comment),
        value_type: info.value_type,
        uses_value_list: info.uses_value_list,
        can_list_values: info.can_list_values,
        can_have_multiple_values: info.can_have_multiple_values,
        is_database_entity: info.is_database_entity,
    }
}

/// Converts a native attribute value.
pub fn convert_value_information(
    attribute_name: &str,
    value: &NativeMetadataValue,
) -> MetadataValueInformationItem {
    MetadataValueInformationItem {
        attribute_name: attribute_name.to_string(),
        value: value.value.clone(),
        description: value.description.clone(),
        comment: non_empty(&value.comment),
    }
}

/// Converts the series of a native unified result.
pub fn convert_unified_series(names: &[&str], unified: &NativeUnifiedSeries) -> Vec<UnifiedSerie> {
    names
        .iter()
        .zip(&unified.series)
        .map(|(name, series)| match series.entity.error() {
            Some(error) => UnifiedSerie::failed(*name, error),
            None => UnifiedSerie {
                name: (*name).to_string(),
                error_message: String::new(),
                metadata: fill_metadata(series.entity.metadata.as_ref(), &series.entity.title),
                values: series.values.iter().copied().map(optional_value).collect(),
            },
        })
        .collect()
}

/// Entities fetched from the local database.
#[derive(Debug)]
pub struct LocalEntitiesReturn<'a> {
    database: &'a dyn LocalDatabase,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> LocalEntitiesReturn<'a> {
    /// Creates an adapter for `names`. Nothing is read until it is awaited.
    #[must_use]
    pub fn new(database: &'a dyn LocalDatabase, names: Vec<String>, raise_error: bool) -> Self {
        Self {
            database,
            names,
            raise_error,
        }
    }

    /// Fetches the native entities, failing on entity errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub fn raw(&self) -> Result<Vec<NativeEntity>> {
        let entities = check_len(self.database.fetch_entities(&self.names)?, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names.iter().zip(&entities).map(|(n, e)| (n.as_str(), e.error())),
        )?;
        Ok(entities)
    }
}

#[async_trait]
impl ApiReturn for LocalEntitiesReturn<'_> {
    type Record = Entity;

    async fn records(&self) -> Result<Vec<Entity>> {
        let entities = self.raw()?;
        Ok(self
            .names
            .iter()
            .zip(&entities)
            .map(|(name, entity)| convert_entity(name, entity))
            .collect())
    }
}

/// Series fetched from the local database.
#[derive(Debug)]
pub struct LocalSeriesReturn<'a> {
    database: &'a dyn LocalDatabase,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> LocalSeriesReturn<'a> {
    /// Creates an adapter for `names`.
    #[must_use]
    pub fn new(database: &'a dyn LocalDatabase, names: Vec<String>, raise_error: bool) -> Self {
        Self {
            database,
            names,
            raise_error,
        }
    }

    /// Fetches the native series, failing on series errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub fn raw(&self) -> Result<Vec<NativeSeries>> {
        let series = check_len(self.database.fetch_series(&self.names)?, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&series)
                .map(|(n, s)| (n.as_str(), s.entity.error())),
        )?;
        Ok(series)
    }
}

#[async_trait]
impl ApiReturn for LocalSeriesReturn<'_> {
    type Record = Series;

    async fn records(&self) -> Result<Vec<Series>> {
        let series = self.raw()?;
        Ok(self
            .names
            .iter()
            .zip(&series)
            .map(|(name, s)| convert_series(name, s))
            .collect())
    }
}

/// Revision information fetched from the local database.
#[derive(Debug)]
pub struct LocalRevisionInfoReturn<'a> {
    database: &'a dyn LocalDatabase,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> LocalRevisionInfoReturn<'a> {
    /// Creates an adapter for the revision info of `names`.
    #[must_use]
    pub fn new(database: &'a dyn LocalDatabase, names: Vec<String>, raise_error: bool) -> Self {
        Self {
            database,
            names,
            raise_error,
        }
    }

    /// Fetches the native revision information, failing on series errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub fn raw(&self) -> Result<Vec<NativeRevisionInfo>> {
        let infos = check_len(self.database.fetch_revision_info(&self.names)?, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&infos)
                .map(|(n, i)| (n.as_str(), i.error())),
        )?;
        Ok(infos)
    }
}

#[async_trait]
impl ApiReturn for LocalRevisionInfoReturn<'_> {
    type Record = RevisionInfo;

    async fn records(&self) -> Result<Vec<RevisionInfo>> {
        let infos = self.raw()?;
        Ok(self
            .names
            .iter()
            .zip(&infos)
            .map(|(name, info)| convert_revision_info(name, info))
            .collect())
    }
}

/// Series as they were known at a point in time, fetched from the local database.
#[derive(Debug)]
pub struct LocalVintageSeriesReturn<'a> {
    database: &'a dyn LocalDatabase,
    time: DateTime<Utc>,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> LocalVintageSeriesReturn<'a> {
    /// Creates an adapter for `names` as they were at `time`.
    #[must_use]
    pub fn new(
        database: &'a dyn LocalDatabase,
        time: DateTime<Utc>,
        names: Vec<String>,
        raise_error: bool,
    ) -> Self {
        Self {
            database,
            time,
            names,
            raise_error,
        }
    }

    /// Fetches the native vintages, failing on series errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len(), time = %self.time))]
    pub fn raw(&self) -> Result<Vec<NativeVintage>> {
        let vintages = check_len(
            self.database.fetch_vintage_series(self.time, &self.names)?,
            &self.names,
        )?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&vintages)
                .map(|(n, v)| (n.as_str(), v.series.entity.error())),
        )?;
        Ok(vintages)
    }
}

#[async_trait]
impl ApiReturn for LocalVintageSeriesReturn<'_> {
    type Record = VintageSeries;

    async fn records(&self) -> Result<Vec<VintageSeries>> {
        let vintages = self.raw()?;
        Ok(self
            .names
            .iter()
            .zip(&vintages)
            .map(|(name, v)| convert_vintage(name, v))
            .collect())
    }
}

/// Every vintage of one series, fetched from the local database.
#[derive(Debug)]
pub struct LocalAllVintageSeriesReturn<'a> {
    database: &'a dyn LocalDatabase,
    name: String,
    if_modified_since: Option<DateTime<Utc>>,
}

impl<'a> LocalAllVintageSeriesReturn<'a> {
    /// Creates an adapter for every vintage of `name`, optionally only if changed since a time.
    #[must_use]
    pub fn new(
        database: &'a dyn LocalDatabase,
        name: String,
        if_modified_since: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            database,
            name,
            if_modified_since,
        }
    }

    /// Fetches the native vintages. Empty unless a vintage is newer than
    /// `if_modified_since`.
    #[instrument(skip(self), fields(name = %self.name))]
    pub fn raw(&self) -> Result<Vec<NativeVintage>> {
        let vintages = self.database.fetch_all_vintage_series(&self.name)?;
        if let Some(since) = self.if_modified_since {
            let modified = vintages
                .iter()
                .any(|v| v.vintage_time_stamp.is_some_and(|t| t > since));
            if !modified {
                debug!("Series not modified");
                return Ok(Vec::new());
            }
        }
        Ok(vintages)
    }
}

#[async_trait]
impl ApiReturn for LocalAllVintageSeriesReturn<'_> {
    type Record = VintageSeries;

    async fn records(&self) -> Result<Vec<VintageSeries>> {
        let vintages = self.raw()?;
        Ok(vintages
            .iter()
            .map(|v| convert_vintage(&self.name, v))
            .collect())
    }
}

/// Metadata attribute descriptions fetched from the local database.
#[derive(Debug)]
pub struct LocalAttributeInformationReturn<'a> {
    database: &'a dyn LocalDatabase,
    names: Vec<String>,
}

impl<'a> LocalAttributeInformationReturn<'a> {
    /// Creates an adapter for the attributes `names`.
    #[must_use]
    pub fn new(database: &'a dyn LocalDatabase, names: Vec<String>) -> Self {
        Self { database, names }
    }

    /// Fetches the native descriptions.
    pub fn raw(&self) -> Result<Vec<NativeMetadataInformation>> {
        self.database.attribute_information(&self.names)
    }
}

#[async_trait]
impl ApiReturn for LocalAttributeInformationReturn<'_> {
    type Record = MetadataAttributeInformation;

    async fn records(&self) -> Result<Vec<MetadataAttributeInformation>> {
        Ok(self.raw()?.iter().map(convert_attribute_information).collect())
    }
}

/// The values of a metadata attribute, fetched from the local database.
#[derive(Debug)]
pub struct LocalListValuesReturn<'a> {
    database: &'a dyn LocalDatabase,
    name: String,
}

impl<'a> LocalListValuesReturn<'a> {
    /// Creates an adapter listing the values of attribute `name`.
    #[must_use]
    pub fn new(database: &'a dyn LocalDatabase, name: String) -> Self {
        Self { database, name }
    }

    /// Fetches the native values.
    pub fn raw(&self) -> Result<Vec<NativeMetadataValue>> {
        self.database.list_attribute_values(&self.name)
    }
}

#[async_trait]
impl ApiReturn for LocalListValuesReturn<'_> {
    type Record = MetadataValueInformationItem;

    async fn records(&self) -> Result<Vec<MetadataValueInformationItem>> {
        Ok(self
            .raw()?
            .iter()
            .map(|v| convert_value_information(&self.name, v))
            .collect())
    }
}

impl MetadataValuesReturn for LocalListValuesReturn<'_> {
    fn attribute_name(&self) -> &str {
        &self.name
    }
}

/// A unified series request answered by the local database.
#[derive(Debug)]
pub struct LocalUnifiedSeriesReturn<'a> {
    database: &'a dyn LocalDatabase,
    request: UnifiedSeriesRequest,
    raise_error: bool,
}

impl<'a> LocalUnifiedSeriesReturn<'a> {
    /// Creates an adapter for `request`. The request is validated when it is read.
    #[must_use]
    pub fn new(
        database: &'a dyn LocalDatabase,
        request: UnifiedSeriesRequest,
        raise_error: bool,
    ) -> Self {
        Self {
            database,
            request,
            raise_error,
        }
    }

    /// Validates the request, runs it and fails on series errors if asked to.
    #[instrument(skip(self), fields(count = self.request.series_entries.len()))]
    pub fn raw(&self) -> Result<NativeUnifiedSeries> {
        self.request.validate()?;
        let unified = self.database.fetch_unified_series(&self.request)?;
        if unified.series.len() != self.request.series_entries.len() {
            return Err(DataError::Backend(format!(
                "Expected {} series, got {}",
                self.request.series_entries.len(),
                unified.series.len()
            )));
        }
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.request
                .names()
                .into_iter()
                .zip(&unified.series)
                .map(|(n, s)| (n, s.entity.error())),
        )?;
        Ok(unified)
    }
}

#[async_trait]
impl ApiReturn for LocalUnifiedSeriesReturn<'_> {
    type Record = UnifiedSerie;

    async fn records(&self) -> Result<Vec<UnifiedSerie>> {
        let unified = self.raw()?;
        Ok(convert_unified_series(&self.request.names(), &unified))
    }

    async fn table_with(&self, options: &TableOptions) -> Result<DataFrame> {
        let unified = self.unified().await?;
        unified_frame(&unified, options)
    }
}

#[async_trait]
impl UnifiedSeriesReturn for LocalUnifiedSeriesReturn<'_> {
    async fn unified(&self) -> Result<UnifiedSeries> {
        let unified = self.raw()?;
        Ok(UnifiedSeries {
            dates: unified.dates.clone(),
            series: convert_unified_series(&self.request.names(), &unified),
        })
    }
}
