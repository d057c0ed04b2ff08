//! Conversion of canonical records into mappings and polars frames.
//!
//! Every record type converts into a flat key/value mapping through [`ToMapping`]. Entity
//! and series metadata is flattened under the `MetaData.` namespace so that all records
//! of one type share the same keys. [`frame_from_mappings`] turns a list of mappings into
//! a [`DataFrame`] with one row per record.

use polars::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::{
    error::{DataError, Result},
    metadata::{Metadata, copy_metadata_namespaced},
    types::{
        Entity, MetadataAttributeInformation, MetadataValueInformationItem, RevisionInfo, Series,
        UnifiedSerie, UnifiedSeries, VintageSeries,
    },
};

/// Conversion of a record into a flat mapping.
pub trait ToMapping {
    /// Returns the record as a key/value mapping.
    fn to_mapping(&self) -> Metadata;
}

fn serialize_to_map<T: Serialize>(record: &T) -> Metadata {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Metadata::new(),
    }
}

fn namespaced<T: Serialize>(record: &T, metadata: &Metadata, title: &str) -> Metadata {
    let mut map = serialize_to_map(record);
    map.shift_remove("metadata");
    copy_metadata_namespaced(metadata, title, &mut map);
    map
}

impl ToMapping for Entity {
    fn to_mapping(&self) -> Metadata {
        namespaced(self, &self.metadata, self.title())
    }
}

impl ToMapping for Series {
    fn to_mapping(&self) -> Metadata {
        namespaced(self, &self.metadata, self.title())
    }
}

impl ToMapping for VintageSeries {
    fn to_mapping(&self) -> Metadata {
        namespaced(self, &self.series.metadata, self.series.title())
    }
}

impl ToMapping for UnifiedSerie {
    fn to_mapping(&self) -> Metadata {
        let title = self
            .metadata
            .get(crate::metadata::FULL_DESCRIPTION)
            .and_then(Value::as_str)
            .unwrap_or_default();
        namespaced(self, &self.metadata, title)
    }
}

impl ToMapping for RevisionInfo {
    fn to_mapping(&self) -> Metadata {
        serialize_to_map(self)
    }
}

impl ToMapping for MetadataAttributeInformation {
    fn to_mapping(&self) -> Metadata {
        serialize_to_map(self)
    }
}

impl ToMapping for MetadataValueInformationItem {
    fn to_mapping(&self) -> Metadata {
        serialize_to_map(self)
    }
}

/// Options for building a table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Columns to keep, in output order. All columns if `None`.
    pub columns: Option<Vec<String>>,
}

impl TableOptions {
    /// Creates options that keep every column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only the given columns.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

enum ColumnKind {
    Bool,
    Int,
    Float,
    Text,
}

fn infer_kind<'a>(values: impl Iterator<Item = &'a Value> + Clone) -> ColumnKind {
    let mut present = values.filter(|v| !v.is_null()).peekable();
    if present.peek().is_none() {
        return ColumnKind::Text;
    }
    if present.clone().all(Value::is_boolean) {
        ColumnKind::Bool
    } else if present.clone().all(|v| v.is_i64()) {
        ColumnKind::Int
    } else if present.all(Value::is_number) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn build_column(name: &str, values: &[Option<&Value>]) -> Column {
    let present = values.iter().flatten().copied();
    match infer_kind(present) {
        ColumnKind::Bool => {
            let data: Vec<Option<bool>> =
                values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Column::new(name.into(), data)
        }
        ColumnKind::Int => {
            let data: Vec<Option<i64>> = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Column::new(name.into(), data)
        }
        ColumnKind::Float => {
            let data: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Column::new(name.into(), data)
        }
        ColumnKind::Text => {
            let data: Vec<Option<String>> = values.iter().map(|v| v.and_then(text_of)).collect();
            Column::new(name.into(), data)
        }
    }
}

/// Builds a frame with one row per mapping.
///
/// Columns are the union of all keys in first-seen order. A key missing from a mapping
/// becomes a null cell. Column types are inferred from the values: all booleans, all
/// integers, all numbers, otherwise text with structured values rendered as JSON.
///
/// # Errors
/// Returns [`DataError::Parse`] if the frame cannot be assembled or a requested column
/// does not exist.
pub fn frame_from_mappings(mappings: &[Metadata], options: &TableOptions) -> Result<DataFrame> {
    if mappings.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut keys: Vec<&str> = Vec::new();
    for mapping in mappings {
        for key in mapping.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let columns: Vec<Column> = keys
        .iter()
        .map(|key| {
            let values: Vec<Option<&Value>> = mappings.iter().map(|m| m.get(*key)).collect();
            build_column(key, &values)
        })
        .collect();

    let df = DataFrame::new(columns).map_err(|e| DataError::Parse(e.to_string()))?;
    trace!(rows = df.height(), columns = df.width(), "Built frame from mappings");

    match &options.columns {
        Some(selected) => df
            .select(selected.iter().map(String::as_str))
            .map_err(|e| DataError::Parse(e.to_string())),
        None => Ok(df),
    }
}

/// Builds the wide frame of a unified series result.
///
/// The frame has a `date` column followed by one `f64` column per series that could be
/// converted, named after the series.
///
/// # Errors
/// Returns [`DataError::Parse`] if a series does not have one value per date.
pub fn unified_frame(unified: &UnifiedSeries, options: &TableOptions) -> Result<DataFrame> {
    let timestamps: Vec<i64> = unified.dates.iter().map(|d| d.timestamp_millis()).collect();
    let date_col = Column::new("date".into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(|e| DataError::Parse(e.to_string()))?;

    let mut columns = vec![date_col];
    for serie in unified.series.iter().filter(|s| !s.is_error()) {
        if serie.values.len() != unified.dates.len() {
            return Err(DataError::Parse(format!(
                "Series {} has {} values for {} dates",
                serie.name,
                serie.values.len(),
                unified.dates.len()
            )));
        }
        columns.push(Column::new(serie.name.as_str().into(), serie.values.clone()));
    }

    let df = DataFrame::new(columns).map_err(|e| DataError::Parse(e.to_string()))?;
    trace!(rows = df.height(), series = df.width() - 1, "Built unified frame");

    match &options.columns {
        Some(selected) => df
            .select(selected.iter().map(String::as_str))
            .map_err(|e| DataError::Parse(e.to_string())),
        None => Ok(df),
    }
}
