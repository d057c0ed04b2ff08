#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/econdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Web API backend.
//!
//! This crate implements the econdata-core traits over the provider's JSON web API:
//!
//! - [`Session`] - Transport trait; [`HttpSession`] is the `reqwest` implementation
//! - [`WebApi`] - The [`DataApi`](econdata_core::DataApi) implementation
//! - [`returns`] - Per-operation adapters and payload conversion
//!
//! # Usage
//!
//! ```rust,ignore
//! use econdata_core::{ApiReturn, DataApi, SearchFilter};
//! use econdata_web::{HttpSession, WebApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = WebApi::new(HttpSession::new("your_token")?);
//!
//!     // Fetch two series, keeping failures as error records
//!     let series = api.get_series(&["usgdp", "uscpi"], false).records().await?;
//!
//!     // Search on metadata
//!     let filter = SearchFilter::new().with_must_have_value("MoveBase", "pp100");
//!     let found = api.entity_search_multi_filter(&[filter], false).await?;
//!
//!     Ok(())
//! }
//! ```

/// The web backend.
pub mod api;
/// JSON payloads of the web API.
pub mod responses;
/// Web adapters.
pub mod returns;
/// HTTP transport.
pub mod session;
#[cfg(test)]
mod testing;
mod time;

pub use api::WebApi;
pub use session::{DEFAULT_BASE_URL, HttpSession, Session};
