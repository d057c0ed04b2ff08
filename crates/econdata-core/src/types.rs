//! Canonical record types shared by both backends.
//!
//! This module defines the records every adapter produces:
//!
//! - [`Entity`] - A named entity and its metadata
//! - [`Series`] - A time series with values and dates
//! - [`VintageSeries`] - A series as it was known at a point in time
//! - [`RevisionInfo`] - Whether and when a series has been revised
//! - [`MetadataAttributeInformation`] - Description of a metadata attribute
//! - [`MetadataValueInformation`] - The allowed values of a metadata attribute
//! - [`UnifiedSeries`] - Several series on a common calendar
//! - [`SearchResult`] - Entities matching a search

use std::ops::Index;
use std::slice::SliceIndex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataError, Result};
use crate::metadata::{FULL_DESCRIPTION, Metadata};

fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> &'a str {
    metadata.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// A named entity (time series, security, region, ...) and its metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Name the entity was requested by.
    pub name: String,
    /// Error reported for the entity, empty on success.
    pub error_message: String,
    /// Normalized metadata.
    pub metadata: Metadata,
}

impl Entity {
    /// Creates an entity record.
    #[must_use]
    pub fn new(name: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            error_message: String::new(),
            metadata,
        }
    }

    /// Creates the record of an entity that could not be retrieved.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
            metadata: Metadata::new(),
        }
    }

    /// Returns true if the entity could not be retrieved.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    /// The full description.
    #[must_use]
    pub fn title(&self) -> &str {
        metadata_str(&self.metadata, FULL_DESCRIPTION)
    }

    /// The primary name, which may differ from the requested name.
    #[must_use]
    pub fn primary_name(&self) -> &str {
        metadata_str(&self.metadata, "PrimName")
    }

    /// The entity type, for example `TimeSeries`.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        metadata_str(&self.metadata, "EntityType")
    }
}

/// A time series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Name the series was requested by.
    pub name: String,
    /// Error reported for the series, empty on success.
    pub error_message: String,
    /// Normalized metadata.
    pub metadata: Metadata,
    /// Observations; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
    /// Start of the period of each observation.
    pub dates: Vec<DateTime<Utc>>,
}

impl Series {
    /// Creates the record of a series that could not be retrieved.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
            ..Default::default()
        }
    }

    /// Returns true if the series could not be retrieved.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    /// The full description.
    #[must_use]
    pub fn title(&self) -> &str {
        metadata_str(&self.metadata, FULL_DESCRIPTION)
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(date, value)` pairs.
    pub fn observations(&self) -> impl Iterator<Item = (DateTime<Utc>, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// A series as it was known at a point in time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VintageSeries {
    /// The series data of this vintage.
    #[serde(flatten)]
    pub series: Series,
    /// When this vintage was published.
    pub vintage_time_stamp: Option<DateTime<Utc>>,
}

impl VintageSeries {
    /// Creates the record of a vintage that could not be retrieved.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            series: Series::failed(name, error_message),
            vintage_time_stamp: None,
        }
    }

    /// Returns true if the vintage could not be retrieved.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.series.is_error()
    }
}

/// Whether a series stores revisions and when they happened.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionInfo {
    /// Name the series was requested by.
    pub name: String,
    /// Error reported for the series, empty on success.
    pub error_message: String,
    /// True if a history of revisions is recorded.
    pub stores_revisions: bool,
    /// True if the series has been revised.
    pub has_revisions: bool,
    /// Time of the first recorded revision.
    pub time_stamp_of_first_revision: Option<DateTime<Utc>>,
    /// Time of the last recorded revision.
    pub time_stamp_of_last_revision: Option<DateTime<Utc>>,
    /// Times at which a new vintage was published.
    pub vintage_time_stamps: Vec<DateTime<Utc>>,
}

impl RevisionInfo {
    /// Creates the record of a series whose revision info could not be retrieved.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
            ..Default::default()
        }
    }

    /// Returns true if the revision info could not be retrieved.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}

/// Value type of a metadata attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataAttributeType {
    /// Text.
    String,
    /// Integer.
    Int,
    /// Floating point number.
    Double,
    /// Calendar date.
    Date,
    /// Boolean.
    Bool,
    /// Date and time.
    TimeStamp,
}

impl TryFrom<i64> for MetadataAttributeType {
    type Error = DataError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::String),
            2 => Ok(Self::Int),
            3 => Ok(Self::Double),
            4 => Ok(Self::Date),
            5 => Ok(Self::Bool),
            6 => Ok(Self::TimeStamp),
            _ => Err(DataError::Parse(format!(
                "Unknown metadata attribute type: {code}"
            ))),
        }
    }
}

/// Description of a metadata attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttributeInformation {
    /// Attribute name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Longer explanation.
    pub comment: Option<String>,
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

impl std::fmt::Display for MetadataAttributeInformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// One allowed value of a metadata attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataValueInformationItem {
    /// Name of the attribute this value belongs to.
    pub attribute_name: String,
    /// The value.
    pub value: Value,
    /// Description of the value.
    pub description: String,
    /// Comment on the value.
    pub comment: Option<String>,
}

/// The allowed values of one metadata attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataValueInformation {
    attribute_name: String,
    items: Vec<MetadataValueInformationItem>,
}

impl MetadataValueInformation {
    /// Creates the value list of an attribute.
    #[must_use]
    pub fn new(attribute_name: impl Into<String>, items: Vec<MetadataValueInformationItem>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            items,
        }
    }

    /// Name of the attribute.
    #[must_use]
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MetadataValueInformationItem> {
        self.items.get(index)
    }

    /// Iterates over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, MetadataValueInformationItem> {
        self.items.iter()
    }

    /// Consumes the list and returns the values.
    #[must_use]
    pub fn into_inner(self) -> Vec<MetadataValueInformationItem> {
        self.items
    }
}

impl<I: SliceIndex<[MetadataValueInformationItem]>> Index<I> for MetadataValueInformation {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a MetadataValueInformation {
    type Item = &'a MetadataValueInformationItem;
    type IntoIter = std::slice::Iter<'a, MetadataValueInformationItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for MetadataValueInformation {
    type Item = MetadataValueInformationItem;
    type IntoIter = std::vec::IntoIter<MetadataValueInformationItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// One series of a unified series result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSerie {
    /// Name the series was requested by.
    pub name: String,
    /// Error reported for the series, empty on success.
    pub error_message: String,
    /// Normalized metadata.
    pub metadata: Metadata,
    /// Observations on the common calendar.
    pub values: Vec<Option<f64>>,
}

impl UnifiedSerie {
    /// Creates the record of a series that could not be converted.
    #[must_use]
    pub fn failed(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
            ..Default::default()
        }
    }

    /// Returns true if the series could not be converted.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}

/// Several series converted to a common frequency and calendar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSeries {
    /// The common calendar.
    pub dates: Vec<DateTime<Utc>>,
    /// The series, in request order.
    pub series: Vec<UnifiedSerie>,
}

/// Entities matching a search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matching entities.
    pub entities: Vec<Entity>,
    /// True if more entities matched than were returned.
    pub is_truncated: bool,
}

impl SearchResult {
    /// Number of entities returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn item(value: &str) -> MetadataValueInformationItem {
        MetadataValueInformationItem {
            attribute_name: "RateType".to_string(),
            value: json!(value),
            description: format!("{value} rates"),
            comment: None,
        }
    }

    #[test]
    fn test_entity_accessors() {
        let metadata = json!({
            "PrimName": "usgdp",
            "FullDescription": "United States, GDP",
            "EntityType": "TimeSeries",
        });
        let entity = Entity::new("usgdp", metadata.as_object().cloned().unwrap());

        assert!(!entity.is_error());
        assert_eq!(entity.title(), "United States, GDP");
        assert_eq!(entity.primary_name(), "usgdp");
        assert_eq!(entity.entity_type(), "TimeSeries");

        let failed = Entity::failed("nope", "Not found");
        assert!(failed.is_error());
        assert_eq!(failed.title(), "");
    }

    #[test]
    fn test_metadata_value_information_indexing() {
        let info = MetadataValueInformation::new("RateType", vec![item("mole"), item("pole"), item("zole")]);

        assert_eq!(info.len(), 3);
        assert_eq!(info[1].value, json!("pole"));
        assert_eq!(info[1..].len(), 2);
        assert_eq!(info[..2][0].value, json!("mole"));
        assert!(info.get(3).is_none());
        assert_eq!(info.iter().count(), 3);
        assert_eq!((&info).into_iter().filter(|i| i.value == "zole").count(), 1);
    }

    #[test]
    fn test_attribute_type_codes() {
        assert_eq!(MetadataAttributeType::try_from(1).unwrap(), MetadataAttributeType::String);
        assert_eq!(MetadataAttributeType::try_from(6).unwrap(), MetadataAttributeType::TimeStamp);
        assert!(MetadataAttributeType::try_from(0).is_err());
    }

    #[test]
    fn test_series_observations() {
        let dates = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        ];
        let series = Series {
            name: "x".to_string(),
            values: vec![Some(1.0), None],
            dates: dates.clone(),
            ..Default::default()
        };

        let observations: Vec<_> = series.observations().collect();
        assert_eq!(observations, vec![(dates[0], Some(1.0)), (dates[1], None)]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_vintage_flattens_series() {
        let vintage = VintageSeries::failed("usgdp", "Not found");
        let value = serde_json::to_value(&vintage).unwrap();

        assert_eq!(value["name"], "usgdp");
        assert_eq!(value["error_message"], "Not found");
        assert!(value["vintage_time_stamp"].is_null());
    }
}
