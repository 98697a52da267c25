//! # orbitx Storage
//!
//! Persistence layer for the orbitx exoplanet analysis engine: the four
//! fitted model blobs and their metadata document, saved atomically and
//! reloaded on process start.

pub mod artifacts;

pub use artifacts::{ArtifactStore, ModelMetadata};
