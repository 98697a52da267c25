//! # orbitx Core
//!
//! Core library for the orbitx exoplanet analysis engine.
//!
//! This crate provides the record-matching and classification-inference
//! pipeline:
//!
//! - [`Dataset`] - in-memory tabular observations with column statistics
//! - [`loading`] - CSV ingestion, target selection, feature schema, imputation
//! - [`find_exact_match`] - tolerance-based row matching
//! - [`NeighborIndex`] - exact k-nearest-neighbor search in scaled space
//! - [`GaussianNb`] - classifier with per-class probability output
//! - [`InferenceEngine`] - the orchestrator tying it all together behind an
//!   atomically swappable dataset/model snapshot
//!
//! ## Example
//!
//! ```rust,no_run
//! use orbitx_core::{loading, train, EngineConfig, InferenceEngine, Snapshot};
//! use std::path::Path;
//!
//! let data = loading::load_or_synthesize(Path::new("training_data.csv")).unwrap();
//! let (model, report) = train::train(&data).unwrap();
//! println!("holdout accuracy: {:.4}", report.accuracy);
//!
//! let engine = InferenceEngine::new(EngineConfig::default());
//! engine.install(Snapshot { data, model: Some(model) });
//!
//! let request = serde_json::from_str(
//!     r#"{"user_inputs": {"pl_orbper": 10.0}, "selected_columns": ["pl_rade"]}"#,
//! ).unwrap();
//! let response = engine.analyze(&request);
//! println!("{}", serde_json::to_string(&response).unwrap());
//! ```

pub mod cache;
pub mod classifier;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod exact;
pub mod loading;
pub mod neighbors;
pub mod preprocess;
pub mod response;
pub mod train;
pub mod value;
pub mod vectorize;

pub use cache::{Clock, SystemClock, TimedCache};
pub use classifier::GaussianNb;
pub use dataset::{ColumnSummary, Dataset};
pub use engine::{EngineConfig, InferenceEngine, Snapshot};
pub use error::{Error, Result};
pub use exact::{find_exact_match, ExactMatch};
pub use loading::PreparedDataset;
pub use neighbors::{similarity_score, NeighborHit, NeighborIndex};
pub use preprocess::{LabelEncoder, StandardScaler};
pub use response::{
    AnalysisResponse, Classification, ColumnReport, InferenceRequest, Neighbor,
};
pub use train::{train, FittedModel, TrainingReport};
pub use value::Value;
pub use vectorize::{feature_vector, UserInputs};
