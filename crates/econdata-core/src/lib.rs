#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/econdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for economic data backends.
//!
//! This crate provides the abstractions shared by every backend:
//!
//! - [`DataApi`](api::DataApi) - Entry point implemented by each backend
//! - [`ApiReturn`](api::ApiReturn) - Lazily fetched batch result with object, mapping and table views
//! - [`GetEntitiesError`](entity_error::GetEntitiesError) - Aggregate of per-entity failures
//! - [`StartOrEndPoint`](point::StartOrEndPoint) - Absolute, relative or sentinel range bound
//! - [`SearchFilter`](search::SearchFilter) - Multi-criteria entity search
//! - [`InHouseSeries`](upload::InHouseSeries) - Validating builder for uploads

/// Backend traits and lazily fetched results.
pub mod api;
/// Aggregation of per-entity failures.
pub mod entity_error;
/// Error types for data operations.
pub mod error;
/// Mapping and frame conversion.
pub mod frame;
/// Frequency, calendar and conversion methods.
pub mod frequency;
/// Metadata normalization.
pub mod metadata;
/// Start and end points of a date range.
pub mod point;
/// Problem details of failed HTTP requests.
pub mod problem;
/// Unified series requests.
pub mod request;
/// Entity search filters.
pub mod search;
/// Canonical record types.
pub mod types;
/// In-house series upload.
pub mod upload;

// Re-export commonly used items at crate root
pub use api::{ApiReturn, BoxedReturn, DataApi, MetadataValuesReturn, UnifiedSeriesReturn};
pub use entity_error::{EntityErrorInfo, GetEntitiesError};
pub use error::{DataError, Result};
pub use frame::{TableOptions, ToMapping, frame_from_mappings, unified_frame};
pub use frequency::{
    CalendarMergeMode, SeriesFrequency, SeriesMissingValueMethod, SeriesPartialPeriodsMethod,
    SeriesToHigherFrequencyMethod, SeriesToLowerFrequencyMethod, SeriesWeekdays,
};
pub use metadata::{Metadata, MetadataContainer, copy_metadata_namespaced, fill_metadata};
pub use point::{CalendarDateMode, RelativeUnit, StartOrEndPoint};
pub use problem::ProblemDetails;
pub use request::{SeriesEntry, UnifiedSeriesRequest};
pub use search::{IntoStringList, SearchFilter};
pub use types::{
    Entity, MetadataAttributeInformation, MetadataAttributeType, MetadataValueInformation,
    MetadataValueInformationItem, RevisionInfo, SearchResult, Series, UnifiedSerie, UnifiedSeries,
    VintageSeries,
};
pub use upload::{InHouseSeries, UploadSeriesRequest, UploadTimestamp};
