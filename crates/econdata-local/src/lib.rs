#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/econdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Local desktop backend, with an in-memory database for offline use.

/// The local backend.
pub mod api;
/// In-memory local database.
pub mod memory;
/// The local database collaborator and its native payloads.
pub mod native;
/// Local adapters.
pub mod returns;

pub use api::LocalApi;
pub use memory::InMemoryDatabase;
pub use native::{
    LocalDatabase, NativeEntity, NativeMetadata, NativeMetadataInformation, NativeMetadataValue,
    NativeRevisionInfo, NativeSearchResult, NativeSeries, NativeUnifiedSeries, NativeVintage,
};
