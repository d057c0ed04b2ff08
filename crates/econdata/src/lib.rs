#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/econdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Economic time-series client with interchangeable backends.
//!
//! This crate re-exports the core types and the enabled backends, and provides a
//! [`Client`] that forwards every operation to whichever backend it was built with.
//!
//! # Features
//!
//! - `web` - Remote backend over the provider's web API
//! - `local` - Local backend over the desktop application's database
//!
//! # Example
//!
//! ```rust,ignore
//! use econdata::{ApiReturn, Client, DataApi, StartOrEndPoint, UnifiedSeriesRequest};
//!
//! #[tokio::main]
//! async fn main() -> econdata::Result<()> {
//!     let client = Client::web("your_token")?;
//!
//!     let request = UnifiedSeriesRequest::new(["usgdp", "uscpi"])
//!         .with_start_point(StartOrEndPoint::relative_to_years(-10));
//!     let table = client.get_unified_series(request, true).table().await?;
//!     println!("{table:?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use econdata_core::*;

// Backends
#[cfg(feature = "local")]
pub use econdata_local::{InMemoryDatabase, LocalApi, LocalDatabase};
#[cfg(feature = "web")]
pub use econdata_web::{DEFAULT_BASE_URL, HttpSession, Session, WebApi};

mod client;
pub use client::Client;
