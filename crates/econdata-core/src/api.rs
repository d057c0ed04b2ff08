//! The backend-independent api surface.
//!
//! This module defines the traits both backends implement:
//!
//! - [`ApiReturn`] - Lazily fetched batch result with object, mapping and table views
//! - [`MetadataValuesReturn`] - Result of listing the values of a metadata attribute
//! - [`UnifiedSeriesReturn`] - Result of a unified series request
//! - [`DataApi`] - Entry point of a backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    entity_error::GetEntitiesError,
    error::Result,
    frame::{TableOptions, ToMapping, frame_from_mappings},
    metadata::Metadata,
    request::UnifiedSeriesRequest,
    search::SearchFilter,
    types::{
        Entity, MetadataAttributeInformation, MetadataValueInformation,
        MetadataValueInformationItem, RevisionInfo, SearchResult, Series, UnifiedSerie,
        UnifiedSeries, VintageSeries,
    },
    upload::UploadSeriesRequest,
};

/// A batch result fetched on demand.
///
/// Nothing is fetched until one of the views is awaited, and every view fetches and
/// converts again. Records come back in the order the names were requested, with
/// failing names represented by error records unless the adapter was asked to raise.
#[async_trait]
pub trait ApiReturn: Send + Sync + Debug {
    /// The canonical record type.
    type Record: ToMapping + Send + Sync + 'static;

    /// Fetches and converts the records.
    async fn records(&self) -> Result<Vec<Self::Record>>;

    /// Fetches the records as flat mappings with uniform keys.
    async fn mapping(&self) -> Result<Vec<Metadata>> {
        let records = self.records().await?;
        Ok(records.iter().map(ToMapping::to_mapping).collect())
    }

    /// Fetches the records as a frame with one row per record.
    async fn table(&self) -> Result<DataFrame> {
        self.table_with(&TableOptions::default()).await
    }

    /// Fetches the records as a frame shaped by `options`.
    async fn table_with(&self, options: &TableOptions) -> Result<DataFrame> {
        let mapping = self.mapping().await?;
        frame_from_mappings(&mapping, options)
    }
}

/// A boxed batch result borrowing its backend.
pub type BoxedReturn<'a, R> = Box<dyn ApiReturn<Record = R> + 'a>;

/// The values of one metadata attribute.
#[async_trait]
pub trait MetadataValuesReturn: ApiReturn<Record = MetadataValueInformationItem> {
    /// Name of the attribute.
    fn attribute_name(&self) -> &str;

    /// Fetches the values as an indexable list.
    async fn information(&self) -> Result<MetadataValueInformation> {
        let items = self.records().await?;
        Ok(MetadataValueInformation::new(self.attribute_name(), items))
    }
}

/// Several series converted to a common calendar.
///
/// Implementations build a wide table: a `date` column and one column per series.
#[async_trait]
pub trait UnifiedSeriesReturn: ApiReturn<Record = UnifiedSerie> {
    /// Fetches the series together with their common calendar.
    async fn unified(&self) -> Result<UnifiedSeries>;
}

/// A data backend.
///
/// Adapter constructors only capture their arguments; the backend is called when a
/// view of the returned adapter is awaited.
#[async_trait]
pub trait DataApi: Send + Sync + Debug {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Entities by name.
    fn get_entities<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Entity>;

    /// Series by name.
    fn get_series<'a>(&'a self, names: &[&str], raise_error: bool) -> BoxedReturn<'a, Series>;

    /// Revision information by series name.
    fn get_revision_info<'a>(
        &'a self,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, RevisionInfo>;

    /// Series as they were known at `time`.
    fn get_vintage_series<'a>(
        &'a self,
        time: DateTime<Utc>,
        names: &[&str],
        raise_error: bool,
    ) -> BoxedReturn<'a, VintageSeries>;

    /// Every vintage of a series.
    ///
    /// With `if_modified_since` set, the result is empty unless the series changed after it.
    fn get_all_vintage_series<'a>(
        &'a self,
        name: &str,
        if_modified_since: Option<DateTime<Utc>>,
    ) -> BoxedReturn<'a, VintageSeries>;

    /// Descriptions of metadata attributes.
    fn get_attribute_information<'a>(
        &'a self,
        names: &[&str],
    ) -> BoxedReturn<'a, MetadataAttributeInformation>;

    /// The values a metadata attribute can take.
    fn list_values<'a>(&'a self, name: &str) -> Box<dyn MetadataValuesReturn + 'a>;

    /// Several series converted to a common frequency and calendar.
    fn get_unified_series<'a>(
        &'a self,
        request: UnifiedSeriesRequest,
        raise_error: bool,
    ) -> Box<dyn UnifiedSeriesReturn + 'a>;

    /// Searches for entities matching every filter.
    async fn entity_search_multi_filter(
        &self,
        filters: &[SearchFilter],
        include_discontinued: bool,
    ) -> Result<SearchResult>;

    /// Uploads an in-house series.
    async fn upload_series(&self, request: UploadSeriesRequest) -> Result<()>;

    /// Deletes an in-house series.
    async fn delete_series(&self, name: &str) -> Result<()>;

    /// Fetches a single entity, failing if it cannot be retrieved.
    async fn get_one_entity(&self, name: &str) -> Result<Entity> {
        let records = self.get_entities(&[name], true).records().await?;
        single(name, records, Entity::is_error, |e| e.error_message.clone())
    }

    /// Fetches a single series, failing if it cannot be retrieved.
    async fn get_one_series(&self, name: &str) -> Result<Series> {
        let records = self.get_series(&[name], true).records().await?;
        single(name, records, Series::is_error, |s| s.error_message.clone())
    }

    /// Searches for entities by free text.
    async fn entity_search(&self, text: &str) -> Result<SearchResult> {
        let filter = SearchFilter::new().with_text(text);
        self.entity_search_multi_filter(&[filter], false).await
    }
}

fn single<T>(
    name: &str,
    records: Vec<T>,
    is_error: impl Fn(&T) -> bool,
    message: impl Fn(&T) -> String,
) -> Result<T> {
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| GetEntitiesError::single(name, "no record returned"))?;
    if is_error(&record) {
        return Err(GetEntitiesError::single(name, message(&record)).into());
    }
    Ok(record)
}
