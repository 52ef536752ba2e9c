//! # seedscout-catalog
//!
//! Client for a Deezer-compatible music catalog.
//!
//! - [`CatalogClient::list_new_releases`]: editorial releases within a day window
//! - [`CatalogClient::list_tracks`]: tracks of an album that have a preview clip
//! - [`CatalogClient::compile_previewable_tracks`]: tracks of many albums,
//!   skipping albums that fail

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod types;

pub use client::{CatalogClient, CatalogConfig, DEFAULT_BASE_URL};
pub use errors::{CatalogError, Result};
pub use seedscout_core::safe_filename;
pub use types::Album;
