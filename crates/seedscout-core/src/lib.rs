//! # seedscout-core
//!
//! Foundation types shared by every seedscout crate.
//!
//! - [`Waveform`]: decoded mono audio handed from the audio layer to the
//!   embedding layer
//! - [`PreviewTrack`]: a catalog track that has a playable preview
//! - [`logging`]: `tracing` subscriber setup and log capture for tests
//!
//! ## Crate Position
//!
//! Standalone (no seedscout crate dependencies).
//! Depended on by: every other seedscout crate.

#![deny(unsafe_code)]

pub mod logging;
pub mod types;

pub use types::{PreviewTrack, Waveform, safe_filename};
