//! JSON payloads of the web API.
//!
//! These mirror the wire format; conversion into the canonical records lives in
//! [`crate::returns`].

use econdata_core::{Metadata, SearchFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of fetching an entity.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    /// Error text; absent when the entity was found.
    #[serde(default)]
    pub error_text: Option<String>,
    /// Entity metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Result of fetching a series or one vintage of a series.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    /// Error text; absent when the series was found.
    #[serde(default)]
    pub error_text: Option<String>,
    /// Series metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Observations; `null` marks a missing value.
    #[serde(default)]
    pub values: Vec<Option<f64>>,
    /// Observation dates.
    #[serde(default)]
    pub dates: Vec<String>,
}

/// Revision information of a series.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesWithRevisionsInfoResponse {
    /// Error text; absent when the series was found.
    #[serde(default)]
    pub error_text: Option<String>,
    /// True if a history of revisions is recorded.
    #[serde(default)]
    pub stores_revisions: bool,
    /// True if the series has been revised.
    #[serde(default)]
    pub has_revisions: bool,
    /// Time of the first recorded revision.
    #[serde(default)]
    pub time_stamp_of_first_revision: Option<String>,
    /// Time of the last recorded revision.
    #[serde(default)]
    pub time_stamp_of_last_revision: Option<String>,
    /// Times at which a new vintage was published.
    #[serde(default)]
    pub vintage_time_stamps: Vec<String>,
}

/// Description of a metadata attribute.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataAttributeInformationResponse {
    /// Attribute name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Longer explanation.
    #[serde(default)]
    pub comment: Option<String>,
    /// Numeric value type code.
    pub value_type: i64,
    /// True if values come from a fixed list.
    #[serde(default)]
    pub uses_value_list: bool,
    /// True if the value list can be enumerated.
    #[serde(default)]
    pub can_list_values: bool,
    /// True if an entity can have several values.
    #[serde(default)]
    pub can_have_multiple_values: bool,
    /// True if values are names of other entities.
    #[serde(default)]
    pub is_database_entity: bool,
}

/// One allowed value of a metadata attribute.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataValueInformationResponse {
    /// The value.
    #[serde(default)]
    pub value: Value,
    /// Description of the value.
    #[serde(default)]
    pub description: String,
    /// Comment on the value.
    #[serde(default)]
    pub comment: Option<String>,
}

/// One series of a unified series response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSeriesEntryResponse {
    /// Error text; absent when the series was converted.
    #[serde(default)]
    pub error_text: Option<String>,
    /// Series metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Observations on the common calendar.
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

/// Result of a unified series request.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSeriesResponse {
    /// The common calendar.
    #[serde(default)]
    pub dates: Vec<String>,
    /// The series, in request order.
    #[serde(default)]
    pub series: Vec<UnifiedSeriesEntryResponse>,
}

/// Body of an entity search.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Filters every entity must match.
    pub filters: Vec<SearchFilter>,
    /// Include discontinued series.
    pub include_discontinued: bool,
    /// Leave metadata out of the results.
    pub no_metadata: bool,
}

/// Result of an entity search.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Metadata of the matching entities.
    #[serde(default)]
    pub results: Vec<Metadata>,
    /// True if more entities matched than were returned.
    #[serde(default)]
    pub is_truncated: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_series_defaults() {
        let response: SeriesResponse =
            serde_json::from_value(json!({"errorText": "Not found"})).unwrap();
        assert_eq!(response.error_text.as_deref(), Some("Not found"));
        assert!(response.values.is_empty());
        assert!(response.metadata.is_empty());
    }

    #[test]
    fn test_revision_info_wire_names() {
        let response: SeriesWithRevisionsInfoResponse = serde_json::from_value(json!({
            "storesRevisions": true,
            "hasRevisions": true,
            "timeStampOfLastRevision": "2024-01-01T00:00:00Z",
            "vintageTimeStamps": ["2023-01-01T00:00:00Z"],
        }))
        .unwrap();
        assert!(response.stores_revisions);
        assert!(response.time_stamp_of_first_revision.is_none());
        assert_eq!(response.vintage_time_stamps.len(), 1);
    }

    #[test]
    fn test_search_request_body() {
        let request = SearchRequest {
            filters: vec![SearchFilter::new().with_must_have_value("MoveBase", "pp100")],
            include_discontinued: false,
            no_metadata: false,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["filters"][0]["mustHaveValues"]["MoveBase"], "pp100");
        assert_eq!(body["includeDiscontinued"], false);
        assert_eq!(body["noMetadata"], false);
    }
}
