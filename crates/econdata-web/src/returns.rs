//! Web adapters.
//!
//! Each adapter captures a request and calls the session when one of its views is
//! awaited. `raw()` returns the decoded payload after the error gate; the `convert_*`
//! functions turn payload entries into canonical records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use econdata_core::{
    ApiReturn, DataError, Entity, GetEntitiesError, MetadataAttributeInformation,
    MetadataAttributeType, MetadataValueInformationItem, MetadataValuesReturn, Result,
    RevisionInfo, Series, TableOptions, UnifiedSerie, UnifiedSeries, UnifiedSeriesRequest,
    UnifiedSeriesReturn, VintageSeries, fill_metadata, unified_frame,
};
use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    responses::{
        EntityResponse, MetadataAttributeInformationResponse, MetadataValueInformationResponse,
        SeriesResponse, SeriesWithRevisionsInfoResponse, UnifiedSeriesResponse,
    },
    session::Session,
    time::{format_timestamp, parse_optional_timestamp, parse_timestamps},
};

pub(crate) const FETCH_ENTITIES: &str = "v1/series/fetchentities";
pub(crate) const FETCH_SERIES: &str = "v1/series/fetchseries";
pub(crate) const GET_REVISION_INFO: &str = "v1/series/getrevisioninfo";
pub(crate) const FETCH_VINTAGE_SERIES: &str = "v1/series/fetchvintageseries";
pub(crate) const FETCH_ALL_VINTAGE_SERIES: &str = "v1/series/fetchallvintageseries";
pub(crate) const FETCH_UNIFIED_SERIES: &str = "v1/series/fetchunifiedseries";
pub(crate) const GET_ATTRIBUTE_INFORMATION: &str = "v1/metadata/getattributeinformation";
pub(crate) const LIST_ATTRIBUTE_VALUES: &str = "v1/metadata/listattributevalues";

/// Metadata attribute holding the publication time of a vintage.
const REVISION_TIME_STAMP: &str = "RevisionTimeStamp";

fn name_params(names: &[String]) -> Vec<(&'static str, String)> {
    names.iter().map(|n| ("n", n.clone())).collect()
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn decode_batch<T: DeserializeOwned>(value: Value, names: &[String]) -> Result<Vec<T>> {
    let entries: Vec<T> = decode(value)?;
    if entries.len() != names.len() {
        return Err(DataError::Parse(format!(
            "Expected {} results, got {}",
            names.len(),
            entries.len()
        )));
    }
    Ok(entries)
}

fn error_of(error_text: &Option<String>) -> Option<&str> {
    error_text.as_deref().filter(|t| !t.is_empty())
}

/// Converts a fetched entity.
pub fn convert_entity(name: &str, response: &EntityResponse) -> Entity {
    match error_of(&response.error_text) {
        Some(error) => Entity::failed(name, error),
        None => Entity::new(name, fill_metadata(&response.metadata, "")),
    }
}

/// Converts a fetched series.
///
/// # Errors
/// Returns [`DataError::Parse`] if a date cannot be parsed.
pub fn convert_series(name: &str, response: &SeriesResponse) -> Result<Series> {
    if let Some(error) = error_of(&response.error_text) {
        return Ok(Series::failed(name, error));
    }
    Ok(Series {
        name: name.to_string(),
        error_message: String::new(),
        metadata: fill_metadata(&response.metadata, ""),
        values: response.values.clone(),
        dates: parse_timestamps(&response.dates)?,
    })
}

/// Converts a fetched vintage. The vintage time comes from the `RevisionTimeStamp`
/// metadata attribute.
///
/// # Errors
/// Returns [`DataError::Parse`] if a date cannot be parsed.
pub fn convert_vintage(name: &str, response: &SeriesResponse) -> Result<VintageSeries> {
    if let Some(error) = error_of(&response.error_text) {
        return Ok(VintageSeries::failed(name, error));
    }
    let vintage_time_stamp = parse_optional_timestamp(
        response
            .metadata
            .get(REVISION_TIME_STAMP)
            .and_then(Value::as_str),
    )?;
    Ok(VintageSeries {
        series: convert_series(name, response)?,
        vintage_time_stamp,
    })
}

/// Converts fetched revision information.
///
/// # Errors
/// Returns [`DataError::Parse`] if a timestamp cannot be parsed.
pub fn convert_revision_info(
    name: &str,
    response: &SeriesWithRevisionsInfoResponse,
) -> Result<RevisionInfo> {
    if let Some(error) = error_of(&response.error_text) {
        return Ok(RevisionInfo::failed(name, error));
    }
    Ok(RevisionInfo {
        name: name.to_string(),
        error_message: String::new(),
        stores_revisions: response.stores_revisions,
        has_revisions: response.has_revisions,
        time_stamp_of_first_revision: parse_optional_timestamp(
            response.time_stamp_of_first_revision.as_deref(),
        )?,
        time_stamp_of_last_revision: parse_optional_timestamp(
            response.time_stamp_of_last_revision.as_deref(),
        )?,
        vintage_time_stamps: parse_timestamps(&response.vintage_time_stamps)?,
    })
}

/// Converts a fetched attribute description.
///
/// # Errors
/// Returns [`DataError::Parse`] if the value type code is unknown.
pub fn convert_attribute_information(
    response: &MetadataAttributeInformationResponse,
) -> Result<MetadataAttributeInformation> {
    Ok(MetadataAttributeInformation {
        name: response.name.clone(),
        description: response.description.clone(),
        comment: response.comment.clone().filter(|c| !c.is_empty()),
        value_type: MetadataAttributeType::try_from(response.value_type)?,
        uses_value_list: response.uses_value_list,
        can_list_values: response.can_list_values,
        can_have_multiple_values: response.can_have_multiple_values,
        is_database_entity: response.is_database_entity,
    })
}

/// Converts a fetched attribute value.
pub fn convert_value_information(
    attribute_name: &str,
    response: &MetadataValueInformationResponse,
) -> MetadataValueInformationItem {
    MetadataValueInformationItem {
        attribute_name: attribute_name.to_string(),
        value: response.value.clone(),
        description: response.description.clone(),
        comment: response.comment.clone().filter(|c| !c.is_empty()),
    }
}

/// Converts the series of a unified series response.
pub fn convert_unified_series(
    names: &[String],
    response: &UnifiedSeriesResponse,
) -> Vec<UnifiedSerie> {
    names
        .iter()
        .zip(&response.series)
        .map(|(name, serie)| match error_of(&serie.error_text) {
            Some(error) => UnifiedSerie::failed(name.as_str(), error),
            None => UnifiedSerie {
                name: name.clone(),
                error_message: String::new(),
                metadata: fill_metadata(&serie.metadata, ""),
                values: serie.values.clone(),
            },
        })
        .collect()
}

/// Entities fetched from the web API.
#[derive(Debug)]
pub struct WebEntitiesReturn<'a> {
    session: &'a dyn Session,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> WebEntitiesReturn<'a> {
    /// Creates an adapter for `names`. Nothing is read until it is awaited.
    #[must_use]
    pub fn new(session: &'a dyn Session, names: Vec<String>, raise_error: bool) -> Self {
        Self {
            session,
            names,
            raise_error,
        }
    }

    /// Fetches the payload, failing on entity errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub async fn raw(&self) -> Result<Vec<EntityResponse>> {
        let value = self
            .session
            .get_or_raise(FETCH_ENTITIES, &name_params(&self.names))
            .await?;
        let entries: Vec<EntityResponse> = decode_batch(value, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&entries)
                .map(|(n, e)| (n.as_str(), e.error_text.as_deref())),
        )?;
        Ok(entries)
    }
}

#[async_trait]
impl ApiReturn for WebEntitiesReturn<'_> {
    type Record = Entity;

    async fn records(&self) -> Result<Vec<Entity>> {
        let entries = self.raw().await?;
        Ok(self
            .names
            .iter()
            .zip(&entries)
            .map(|(name, entry)| convert_entity(name, entry))
            .collect())
    }
}

/// Series fetched from the web API.
#[derive(Debug)]
pub struct WebSeriesReturn<'a> {
    session: &'a dyn Session,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> WebSeriesReturn<'a> {
    /// Creates an adapter for `names`.
    #[must_use]
    pub fn new(session: &'a dyn Session, names: Vec<String>, raise_error: bool) -> Self {
        Self {
            session,
            names,
            raise_error,
        }
    }

    /// Fetches the payload, failing on series errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub async fn raw(&self) -> Result<Vec<SeriesResponse>> {
        let value = self
            .session
            .get_or_raise(FETCH_SERIES, &name_params(&self.names))
            .await?;
        let entries: Vec<SeriesResponse> = decode_batch(value, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&entries)
                .map(|(n, e)| (n.as_str(), e.error_text.as_deref())),
        )?;
        Ok(entries)
    }
}

#[async_trait]
impl ApiReturn for WebSeriesReturn<'_> {
    type Record = Series;

    async fn records(&self) -> Result<Vec<Series>> {
        let entries = self.raw().await?;
        self.names
            .iter()
            .zip(&entries)
            .map(|(name, entry)| convert_series(name, entry))
            .collect()
    }
}

/// Revision information fetched from the web API.
#[derive(Debug)]
pub struct WebRevisionInfoReturn<'a> {
    session: &'a dyn Session,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> WebRevisionInfoReturn<'a> {
    /// Creates an adapter for the revision info of `names`.
    #[must_use]
    pub fn new(session: &'a dyn Session, names: Vec<String>, raise_error: bool) -> Self {
        Self {
            session,
            names,
            raise_error,
        }
    }

    /// Fetches the payload, failing on series errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub async fn raw(&self) -> Result<Vec<SeriesWithRevisionsInfoResponse>> {
        let value = self
            .session
            .get_or_raise(GET_REVISION_INFO, &name_params(&self.names))
            .await?;
        let entries: Vec<SeriesWithRevisionsInfoResponse> = decode_batch(value, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&entries)
                .map(|(n, e)| (n.as_str(), e.error_text.as_deref())),
        )?;
        Ok(entries)
    }
}

#[async_trait]
impl ApiReturn for WebRevisionInfoReturn<'_> {
    type Record = RevisionInfo;

    async fn records(&self) -> Result<Vec<RevisionInfo>> {
        let entries = self.raw().await?;
        self.names
            .iter()
            .zip(&entries)
            .map(|(name, entry)| convert_revision_info(name, entry))
            .collect()
    }
}

/// Series as they were known at a point in time, fetched from the web API.
#[derive(Debug)]
pub struct WebVintageSeriesReturn<'a> {
    session: &'a dyn Session,
    time: DateTime<Utc>,
    names: Vec<String>,
    raise_error: bool,
}

impl<'a> WebVintageSeriesReturn<'a> {
    /// Creates an adapter for `names` as they were at `time`.
    #[must_use]
    pub fn new(
        session: &'a dyn Session,
        time: DateTime<Utc>,
        names: Vec<String>,
        raise_error: bool,
    ) -> Self {
        Self {
            session,
            time,
            names,
            raise_error,
        }
    }

    /// Fetches the payload, failing on series errors if asked to.
    #[instrument(skip(self), fields(count = self.names.len(), time = %self.time))]
    pub async fn raw(&self) -> Result<Vec<SeriesResponse>> {
        let mut params = vec![("t", format_timestamp(&self.time))];
        params.extend(name_params(&self.names));
        let value = self
            .session
            .get_or_raise(FETCH_VINTAGE_SERIES, &params)
            .await?;
        let entries: Vec<SeriesResponse> = decode_batch(value, &self.names)?;
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.names
                .iter()
                .zip(&entries)
                .map(|(n, e)| (n.as_str(), e.error_text.as_deref())),
        )?;
        Ok(entries)
    }
}

#[async_trait]
impl ApiReturn for WebVintageSeriesReturn<'_> {
    type Record = VintageSeries;

    async fn records(&self) -> Result<Vec<VintageSeries>> {
        let entries = self.raw().await?;
        self.names
            .iter()
            .zip(&entries)
            .map(|(name, entry)| convert_vintage(name, entry))
            .collect()
    }
}

/// Every vintage of one series, fetched from the web API.
#[derive(Debug)]
pub struct WebAllVintageSeriesReturn<'a> {
    session: &'a dyn Session,
    name: String,
    if_modified_since: Option<DateTime<Utc>>,
}

impl<'a> WebAllVintageSeriesReturn<'a> {
    /// Creates an adapter for every vintage of `name`, optionally only if changed since a time.
    #[must_use]
    pub fn new(
        session: &'a dyn Session,
        name: String,
        if_modified_since: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            session,
            name,
            if_modified_since,
        }
    }

    /// Fetches the payload. Empty when the series is unchanged since `if_modified_since`.
    #[instrument(skip(self), fields(name = %self.name))]
    pub async fn raw(&self) -> Result<Vec<SeriesResponse>> {
        let mut params = vec![("n", self.name.clone())];
        if let Some(since) = &self.if_modified_since {
            params.push(("ifModifiedSince", format_timestamp(since)));
        }
        let value = self
            .session
            .get_or_raise(FETCH_ALL_VINTAGE_SERIES, &params)
            .await?;
        if value.is_null() {
            debug!("Series not modified");
            return Ok(Vec::new());
        }
        decode(value)
    }
}

#[async_trait]
impl ApiReturn for WebAllVintageSeriesReturn<'_> {
    type Record = VintageSeries;

    async fn records(&self) -> Result<Vec<VintageSeries>> {
        let entries = self.raw().await?;
        entries
            .iter()
            .map(|entry| convert_vintage(&self.name, entry))
            .collect()
    }
}

/// Metadata attribute descriptions fetched from the web API.
#[derive(Debug)]
pub struct WebAttributeInformationReturn<'a> {
    session: &'a dyn Session,
    names: Vec<String>,
}

impl<'a> WebAttributeInformationReturn<'a> {
    /// Creates an adapter for the attributes `names`.
    #[must_use]
    pub fn new(session: &'a dyn Session, names: Vec<String>) -> Self {
        Self { session, names }
    }

    /// Fetches the payload.
    #[instrument(skip(self), fields(count = self.names.len()))]
    pub async fn raw(&self) -> Result<Vec<MetadataAttributeInformationResponse>> {
        let value = self
            .session
            .get_or_raise(GET_ATTRIBUTE_INFORMATION, &name_params(&self.names))
            .await?;
        decode(value)
    }
}

#[async_trait]
impl ApiReturn for WebAttributeInformationReturn<'_> {
    type Record = MetadataAttributeInformation;

    async fn records(&self) -> Result<Vec<MetadataAttributeInformation>> {
        let entries = self.raw().await?;
        entries.iter().map(convert_attribute_information).collect()
    }
}

/// The values of a metadata attribute, fetched from the web API.
#[derive(Debug)]
pub struct WebListValuesReturn<'a> {
    session: &'a dyn Session,
    name: String,
}

impl<'a> WebListValuesReturn<'a> {
    /// Creates an adapter listing the values of attribute `name`.
    #[must_use]
    pub fn new(session: &'a dyn Session, name: String) -> Self {
        Self { session, name }
    }

    /// Fetches the payload.
    #[instrument(skip(self), fields(name = %self.name))]
    pub async fn raw(&self) -> Result<Vec<MetadataValueInformationResponse>> {
        let value = self
            .session
            .get_or_raise(LIST_ATTRIBUTE_VALUES, &[("n", self.name.clone())])
            .await?;
        decode(value)
    }
}

#[async_trait]
impl ApiReturn for WebListValuesReturn<'_> {
    type Record = MetadataValueInformationItem;

    async fn records(&self) -> Result<Vec<MetadataValueInformationItem>> {
        let entries = self.raw().await?;
        Ok(entries
            .iter()
            .map(|entry| convert_value_information(&self.name, entry))
            .collect())
    }
}

impl MetadataValuesReturn for WebListValuesReturn<'_> {
    fn attribute_name(&self) -> &str {
        &self.name
    }
}

/// A unified series request sent to the web API.
#[derive(Debug)]
pub struct WebUnifiedSeriesReturn<'a> {
    session: &'a dyn Session,
    request: UnifiedSeriesRequest,
    raise_error: bool,
}

impl<'a> WebUnifiedSeriesReturn<'a> {
    /// Creates an adapter for `request`. The request is validated when it is read.
    #[must_use]
    pub fn new(
        session: &'a dyn Session,
        request: UnifiedSeriesRequest,
        raise_error: bool,
    ) -> Self {
        Self {
            session,
            request,
            raise_error,
        }
    }

    fn names(&self) -> Vec<String> {
        self.request.names().into_iter().map(String::from).collect()
    }

    /// Validates the request, sends it and fails on series errors if asked to.
    #[instrument(skip(self), fields(count = self.request.series_entries.len()))]
    pub async fn raw(&self) -> Result<UnifiedSeriesResponse> {
        self.request.validate()?;
        let body = serde_json::to_value(&self.request)?;
        let value = self.session.post_or_raise(FETCH_UNIFIED_SERIES, &body).await?;
        let response: UnifiedSeriesResponse = decode(value)?;
        if response.series.len() != self.request.series_entries.len() {
            return Err(DataError::Parse(format!(
                "Expected {} series, got {}",
                self.request.series_entries.len(),
                response.series.len()
            )));
        }
        GetEntitiesError::raise_if_any(
            self.raise_error,
            self.request
                .names()
                .into_iter()
                .zip(&response.series)
                .map(|(n, s)| (n, s.error_text.as_deref())),
        )?;
        Ok(response)
    }
}

#[async_trait]
impl ApiReturn for WebUnifiedSeriesReturn<'_> {
    type Record = UnifiedSerie;

    async fn records(&self) -> Result<Vec<UnifiedSerie>> {
        let response = self.raw().await?;
        Ok(convert_unified_series(&self.names(), &response))
    }

    async fn table_with(&self, options: &TableOptions) -> Result<DataFrame> {
        let unified = self.unified().await?;
        unified_frame(&unified, options)
    }
}

#[async_trait]
impl UnifiedSeriesReturn for WebUnifiedSeriesReturn<'_> {
    async fn unified(&self) -> Result<UnifiedSeries> {
        let response = self.raw().await?;
        Ok(UnifiedSeries {
            dates: parse_timestamps(&response.dates)?,
            series: convert_unified_series(&self.names(), &response),
        })
    }
}

#[cfg(test)]
mod tests {
    use econdata_core::StartOrEndPoint;
    use serde_json::json;

    use super::*;
    use crate::testing::FakeSession;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn series_batch() -> Value {
        json!([
            {
                "metadata": {"PrimName": "x", "FullDescription": "Series X", "Region": ["us"]},
                "values": [1.0, null],
                "dates": ["2024-01-01T00:00:00", "2024-02-01T00:00:00"],
            },
            {"errorText": "Not found"},
            {
                "metadata": {"PrimName": "z"},
                "values": [3.0],
                "dates": ["2024-01-01T00:00:00Z"],
            },
        ])
    }

    #[tokio::test]
    async fn test_series_order_preserved() {
        let session = FakeSession::new().with_get(FETCH_SERIES, series_batch());
        let adapter = WebSeriesReturn::new(&session, names(&["x", "y_invalid", "z"]), false);

        let records = adapter.records().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "x");
        assert_eq!(records[0].values, vec![Some(1.0), None]);
        assert_eq!(records[0].metadata["Region"], "us");
        assert!(records[1].is_error());
        assert_eq!(records[1].name, "y_invalid");
        assert_eq!(records[1].error_message, "Not found");
        assert!(records[1].values.is_empty());
        assert_eq!(records[2].name, "z");
        assert_eq!(records[2].title(), "");

        assert_eq!(session.last_query(FETCH_SERIES), "n=x&n=y_invalid&n=z");
    }

    #[tokio::test]
    async fn test_series_raise_error() {
        let session = FakeSession::new().with_get(FETCH_SERIES, series_batch());
        let adapter = WebSeriesReturn::new(&session, names(&["x", "y_invalid", "z"]), true);

        let error = adapter.records().await.unwrap_err();

        match error {
            DataError::Entities(error) => {
                assert_eq!(error.entities().len(), 1);
                assert_eq!(error.entities()[0].name(), "y_invalid");
                assert_eq!(
                    error.message(),
                    "failed to retrieve:\n\ty_invalid error_message: Not found"
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mapping_keys_uniform() {
        let session = FakeSession::new().with_get(
            FETCH_ENTITIES,
            json!([{"metadata": {"FullDescription": "X"}}, {"errorText": "Not found"}]),
        );
        let adapter = WebEntitiesReturn::new(&session, names(&["x", "y"]), false);

        let mapping = adapter.mapping().await.unwrap();
        let first: Vec<_> = mapping[0].keys().collect();
        let second: Vec<_> = mapping[1].keys().collect();
        assert_eq!(first, second);
        assert_eq!(mapping[0]["MetaData.FullDescription"], "X");
    }

    #[tokio::test]
    async fn test_revision_info() {
        let session = FakeSession::new().with_get(
            GET_REVISION_INFO,
            json!([
                {
                    "storesRevisions": true,
                    "hasRevisions": true,
                    "timeStampOfFirstRevision": "2020-01-01T00:00:00Z",
                    "timeStampOfLastRevision": null,
                    "vintageTimeStamps": ["2020-01-01T00:00:00Z", "2021-06-01T12:30:00"],
                },
                {"errorText": "Not found"},
            ]),
        );
        let adapter = WebRevisionInfoReturn::new(&session, names(&["usgdp", "nope"]), false);

        let records = adapter.records().await.unwrap();

        assert!(records[0].stores_revisions);
        assert!(records[0].time_stamp_of_first_revision.is_some());
        assert!(records[0].time_stamp_of_last_revision.is_none());
        assert_eq!(records[0].vintage_time_stamps.len(), 2);
        assert_eq!(records[1], RevisionInfo::failed("nope", "Not found"));

        let table = adapter.table().await.unwrap();
        assert_eq!(table.height(), 2);
    }

    #[tokio::test]
    async fn test_malformed_timestamp_is_parse_error() {
        let session = FakeSession::new().with_get(
            GET_REVISION_INFO,
            json!([{"timeStampOfFirstRevision": "not a date", "vintageTimeStamps": []}]),
        );
        let adapter = WebRevisionInfoReturn::new(&session, names(&["usgdp"]), false);
        assert!(matches!(adapter.records().await, Err(DataError::Parse(_))));
    }

    #[tokio::test]
    async fn test_vintage_time_stamp_from_metadata() {
        let session = FakeSession::new().with_get(
            FETCH_VINTAGE_SERIES,
            json!([{
                "metadata": {"RevisionTimeStamp": "2022-05-01T00:00:00Z"},
                "values": [1.5],
                "dates": ["2022-01-01T00:00:00Z"],
            }]),
        );
        let time = "2022-06-01T00:00:00Z".parse().unwrap();
        let adapter = WebVintageSeriesReturn::new(&session, time, names(&["usgdp"]), false);

        let records = adapter.records().await.unwrap();

        assert_eq!(
            records[0].vintage_time_stamp,
            Some("2022-05-01T00:00:00Z".parse().unwrap())
        );
        assert_eq!(
            session.last_query(FETCH_VINTAGE_SERIES),
            "t=2022-06-01T00:00:00Z&n=usgdp"
        );
    }

    #[tokio::test]
    async fn test_all_vintages_not_modified() {
        let session = FakeSession::new().with_get(FETCH_ALL_VINTAGE_SERIES, Value::Null);
        let since = "2999-01-01T00:00:00Z".parse().unwrap();
        let adapter = WebAllVintageSeriesReturn::new(&session, "usgdp".to_string(), Some(since));

        assert!(adapter.records().await.unwrap().is_empty());
        assert_eq!(
            session.last_query(FETCH_ALL_VINTAGE_SERIES),
            "n=usgdp&ifModifiedSince=2999-01-01T00:00:00Z"
        );
    }

    #[tokio::test]
    async fn test_attribute_information() {
        let session = FakeSession::new().with_get(
            GET_ATTRIBUTE_INFORMATION,
            json!([{
                "name": "Region",
                "description": "Region",
                "comment": "",
                "valueType": 1,
                "usesValueList": true,
                "canListValues": true,
                "canHaveMultipleValues": true,
                "isDatabaseEntity": false,
            }]),
        );
        let adapter = WebAttributeInformationReturn::new(&session, names(&["Region"]));

        let records = adapter.records().await.unwrap();

        assert_eq!(records[0].value_type, MetadataAttributeType::String);
        assert!(records[0].comment.is_none());
        assert!(records[0].uses_value_list);
    }

    #[tokio::test]
    async fn test_list_values() {
        let session = FakeSession::new().with_get(
            LIST_ATTRIBUTE_VALUES,
            json!([
                {"value": "mole", "description": "Mole"},
                {"value": "pole", "description": "Pole", "comment": "North"},
            ]),
        );
        let adapter = WebListValuesReturn::new(&session, "RateType".to_string());

        let information = adapter.information().await.unwrap();

        assert_eq!(information.attribute_name(), "RateType");
        assert_eq!(information.len(), 2);
        assert_eq!(information[1].comment.as_deref(), Some("North"));
        assert_eq!(information[..1][0].value, "mole");
    }

    #[tokio::test]
    async fn test_unified_series() {
        let session = FakeSession::new().with_post(
            FETCH_UNIFIED_SERIES,
            json!({
                "dates": ["2020-01-01T00:00:00", "2021-01-01T00:00:00"],
                "series": [
                    {"metadata": {"PrimName": "usgdp"}, "values": [1.0, 2.0]},
                    {"errorText": "Not found"},
                ],
            }),
        );
        let request = UnifiedSeriesRequest::new(["usgdp", "nope"])
            .with_start_point(StartOrEndPoint::relative_to_years(-10))
            .with_end_point(StartOrEndPoint::data_in_all_series());
        let adapter = WebUnifiedSeriesReturn::new(&session, request, false);

        let unified = adapter.unified().await.unwrap();
        assert_eq!(unified.dates.len(), 2);
        assert!(unified.series[1].is_error());

        let table = adapter.table().await.unwrap();
        assert_eq!(table.get_column_names_str(), &["date", "usgdp"]);

        let body = session.last_body(FETCH_UNIFIED_SERIES);
        assert_eq!(body["seriesEntries"][0]["name"], "usgdp");
        assert_eq!(body["startPoint"], "-10y");
        assert_eq!(body["startPointMode"], "DATA_IN_ANY_SERIES");
        assert_eq!(body["endPoint"], "");
        assert_eq!(body["endPointMode"], "DATA_IN_ALL_SERIES");
    }

    #[tokio::test]
    async fn test_unified_series_validated_before_call() {
        let session = FakeSession::new();
        let request = UnifiedSeriesRequest::new(Vec::<String>::new());
        let adapter = WebUnifiedSeriesReturn::new(&session, request, false);

        assert!(matches!(adapter.raw().await, Err(DataError::InvalidParameter(_))));
        assert_eq!(session.call_count(), 0);
    }

    #[tokio::test]
    async fn test_length_mismatch_is_parse_error() {
        let session = FakeSession::new().with_get(FETCH_ENTITIES, json!([{"metadata": {}}]));
        let adapter = WebEntitiesReturn::new(&session, names(&["a", "b"]), false);
        assert!(matches!(adapter.raw().await, Err(DataError::Parse(_))));
    }
}
