//! The local database collaborator and its native payloads.
//!
//! Native payloads follow the desktop application's object model: errors are flagged on
//! the entity, missing values are `NaN`, empty comments mean "no comment" and metadata
//! is a [`MetadataContainer`] rather than a map.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use econdata_core::{
    MetadataAttributeType, MetadataContainer, Result, SearchFilter, UnifiedSeriesRequest,
    UploadSeriesRequest,
};
use serde_json::Value;

/// Shared metadata container of a native entity.
pub type NativeMetadata = Arc<dyn MetadataContainer + Send + Sync>;

/// An entity as returned by the local database.
#[derive(Clone)]
pub struct NativeEntity {
    /// Name of the entity.
    pub name: String,
    /// Display title.
    pub title: String,
    /// True if the entity could not be retrieved.
    pub is_error: bool,
    /// Error text when `is_error` is set.
    pub error_message: String,
    /// Metadata attributes.
    pub metadata: NativeMetadata,
}

impl fmt::Debug for NativeEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEntity")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("is_error", &self.is_error)
            .field("error_message", &self.error_message)
            .field("metadata", &self.metadata.list_names())
            .finish()
    }
}

impl NativeEntity {
    /// Creates an entity.
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>, metadata: NativeMetadata) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            is_error: false,
            error_message: String::new(),
            metadata,
        }
    }

    /// Creates the entity of a name that could not be retrieved.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            is_error: true,
            error_message: error_message.into(),
            metadata: Arc::new(econdata_core::Metadata::new()),
        }
    }

    /// The error text, if the entity could not be retrieved.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match (self.is_error, self.error_message.as_str()) {
            (false, _) => None,
            (true, "") => Some("Unknown error"),
            (true, message) => Some(message),
        }
    }
}

/// A series as returned by the local database.
#[derive(Clone, Debug)]
pub struct NativeSeries {
    /// The series entity.
    pub entity: NativeEntity,
    /// Observations; `NaN` marks a missing value.
    pub values: Vec<f64>,
    /// Observation dates.
    pub dates: Vec<DateTime<Utc>>,
}

impl NativeSeries {
    /// Creates the series of a name that could not be retrieved.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            entity: NativeEntity::failed(name, error_message),
            values: Vec::new(),
            dates: Vec::new(),
        }
    }
}

/// A vintage of a series.
#[derive(Clone, Debug)]
pub struct NativeVintage {
    /// The series data of this vintage.
    pub series: NativeSeries,
    /// When this vintage was published.
    pub vintage_time_stamp: Option<DateTime<Utc>>,
}

/// Revision information of a series.
///
/// The local database does not report the first revision; it is the first vintage.
#[derive(Clone, Debug, Default)]
pub struct NativeRevisionInfo {
    /// Name of the series.
    pub name: String,
    /// True if the series could not be retrieved.
    pub is_error: bool,
    /// Error text when `is_error` is set.
    pub error_message: String,
    /// True if a history of revisions is recorded.
    pub stores_revisions: bool,
    /// True if the series has been revised.
    pub has_revisions: bool,
    /// Time of the last recorded revision.
    pub time_stamp_of_last_revision: Option<DateTime<Utc>>,
    /// Times at which a new vintage was published.
    pub vintage_time_stamps: Vec<DateTime<Utc>>,
}

impl NativeRevisionInfo {
    /// The error text, if the series could not be retrieved.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match (self.is_error, self.error_message.as_str()) {
            (false, _) => None,
            (true, "") => Some("Unknown error"),
            (true, message) => Some(message),
        }
    }
}

/// Description of a metadata attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeMetadataInformation {
    /// Attribute name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Longer explanation, empty if there is none.
    pub comment: String,
    /// Type of the attribute's values.
    pub value_type: MetadataAttributeType,
    /// True if values come from a fixed list.
    pub uses_value_list: bool,
    /// True if the value list can be enumerated.
    pub can_list_values: bool,
    /// True if an entity can have several values.
    pub can_have_multiple_values: bool,
    /// True if values are names of other entities.
    pub is_database_entity: bool,
}

/// One allowed value of a metadata attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeMetadataValue {
    /// The value.
    pub value: Value,
    /// Description of the value.
    pub description: String,
    /// Comment on the value, empty if there is none.
    pub comment: String,
}

/// Several series on a common calendar.
#[derive(Clone, Debug, Default)]
pub struct NativeUnifiedSeries {
    /// The common calendar.
    pub dates: Vec<DateTime<Utc>>,
    /// The series, in request order. Values are aligned with `dates`.
    pub series: Vec<NativeSeries>,
}

/// Entities matching a search.
#[derive(Clone, Debug, Default)]
pub struct NativeSearchResult {
    /// Matching entities.
    pub entities: Vec<NativeEntity>,
    /// True if more entities matched than were returned.
    pub is_truncated: bool,
}

/// The in-process database of the desktop application.
///
/// Batch methods return one entry per requested name, in request order, flagging names
/// that could not be retrieved rather than failing.
pub trait LocalDatabase: Send + Sync + fmt::Debug {
    /// Fetches entities.
    fn fetch_entities(&self, names: &[String]) -> Result<Vec<NativeEntity>>;

    /// Fetches series.
    fn fetch_series(&self, names: &[String]) -> Result<Vec<NativeSeries>>;

    /// Fetches revision information.
    fn fetch_revision_info(&self, names: &[String]) -> Result<Vec<NativeRevisionInfo>>;

    /// Fetches the vintages in effect at `time`.
    fn fetch_vintage_series(
        &self,
        time: DateTime<Utc>,
        names: &[String],
    ) -> Result<Vec<NativeVintage>>;

    /// Fetches every vintage of a series, oldest first.
    fn fetch_all_vintage_series(&self, name: &str) -> Result<Vec<NativeVintage>>;

    /// Describes metadata attributes.
    fn attribute_information(&self, names: &[String]) -> Result<Vec<NativeMetadataInformation>>;

    /// Lists the values of a metadata attribute.
    fn list_attribute_values(&self, name: &str) -> Result<Vec<NativeMetadataValue>>;

    /// Converts several series to a common calendar.
    fn fetch_unified_series(&self, request: &UnifiedSeriesRequest) -> Result<NativeUnifiedSeries>;

    /// Searches for entities matching every filter.
    fn search(&self, filters: &[SearchFilter], include_discontinued: bool)
    -> Result<NativeSearchResult>;

    /// Stores an in-house series.
    fn upload_series(&self, request: &UploadSeriesRequest) -> Result<()>;

    /// Deletes an in-house series.
    fn delete_series(&self, name: &str) -> Result<()>;
}
