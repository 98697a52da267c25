//! # orbitx
//!
//! An exoplanet analysis service: exact record matching, nearest-neighbor
//! similarity search, and probabilistic classification over an archive CSV,
//! with persisted model artifacts and change-triggered retraining.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! orbitx train
//! orbitx predict '{"user_inputs": {"pl_orbper": 10.0}, "selected_columns": ["pl_rade"]}'
//! orbitx columns
//! orbitx watch
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use orbitx::prelude::*;
//! use std::path::Path;
//!
//! let data = loading::load_or_synthesize(Path::new("training_data.csv")).unwrap();
//! let (model, _report) = train::train(&data).unwrap();
//!
//! let engine = InferenceEngine::new(EngineConfig::default());
//! engine.install(Snapshot { data, model: Some(model) });
//!
//! let request: InferenceRequest = serde_json::from_str(
//!     r#"{"user_inputs": {"pl_orbper": 10.0}, "selected_columns": ["pl_rade"]}"#,
//! ).unwrap();
//! println!("{}", serde_json::to_string(&engine.analyze(&request)).unwrap());
//! ```
//!
//! ## Crate Structure
//!
//! - `orbitx-core` - dataset model, exact match, neighbor search,
//!   classifier, inference engine
//! - `orbitx-storage` - persisted model artifacts
//!
//! Every analysis request resolves to exactly one JSON-shaped response:
//! `exact_match`, `ml_analysis`, or `error`.

// Re-export core types
pub use orbitx_core::{
    loading, train,
    AnalysisResponse, Classification, ColumnReport, ColumnSummary, Dataset,
    EngineConfig, Error, FittedModel, InferenceEngine, InferenceRequest,
    Neighbor, PreparedDataset, Result, Snapshot, TrainingReport, Value,
};

// Re-export storage
pub use orbitx_storage::{ArtifactStore, ModelMetadata};

/// Change-triggered retraining: dataset watcher plus the debounced
/// reload/train/swap consumer.
pub mod watch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        loading, train,
        AnalysisResponse, ArtifactStore, Classification, ColumnReport,
        ColumnSummary, Dataset, EngineConfig, Error, FittedModel,
        InferenceEngine, InferenceRequest, ModelMetadata, Neighbor,
        PreparedDataset, Result, Snapshot, TrainingReport, Value,
    };
}
