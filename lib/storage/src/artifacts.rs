//! Persisted model artifacts.
//!
//! Four opaque serialized blobs (classifier, scaler, neighbor index, label
//! encoder) plus a `metadata.json` document describing the training cycle.
//! Blobs are written to a temp sibling and renamed into place so a crashed
//! save never leaves a half-written artifact. Loading validates the set as
//! a unit; a missing or inconsistent member fails the whole load.

use chrono::Utc;
use orbitx_core::{Error, FittedModel, Result, TrainingReport};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const CLASSIFIER_FILE: &str = "classifier.bin";
const SCALER_FILE: &str = "scaler.bin";
const NEIGHBORS_FILE: &str = "neighbors.bin";
const LABEL_ENCODER_FILE: &str = "label_encoder.bin";
const METADATA_FILE: &str = "metadata.json";

/// The training-cycle description persisted next to the blobs. Consumers
/// treat the blobs as opaque and reload this document on every start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub class_names: Vec<String>,
    pub n_features: usize,
    pub n_samples: usize,
    /// Unix seconds of the save.
    pub trained_at: i64,
}

/// Saves and loads the fitted model state under one directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist all four blobs and the metadata document.
    pub fn save(&self, model: &FittedModel, report: &TrainingReport) -> Result<ModelMetadata> {
        std::fs::create_dir_all(&self.dir)?;

        self.write_blob(CLASSIFIER_FILE, &model.classifier)?;
        self.write_blob(SCALER_FILE, &model.scaler)?;
        self.write_blob(NEIGHBORS_FILE, &model.neighbors)?;
        self.write_blob(LABEL_ENCODER_FILE, &model.encoder)?;

        let metadata = ModelMetadata {
            feature_columns: model.feature_columns.clone(),
            target_column: model.target_column.clone(),
            class_names: model.encoder.classes().to_vec(),
            n_features: model.feature_columns.len(),
            n_samples: report.n_samples,
            trained_at: Utc::now().timestamp(),
        };
        let json = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        self.write_atomic(METADATA_FILE, &json)?;

        info!(dir = %self.dir.display(), "model artifacts saved");
        Ok(metadata)
    }

    /// Load the persisted model state, or `None` when no save exists.
    pub fn load(&self) -> Result<Option<(FittedModel, ModelMetadata)>> {
        let metadata_path = self.dir.join(METADATA_FILE);
        if !metadata_path.exists() {
            return Ok(None);
        }

        let metadata: ModelMetadata =
            serde_json::from_slice(&std::fs::read(&metadata_path)?)
                .map_err(|e| Error::Serialization(format!("{METADATA_FILE}: {e}")))?;

        let classifier = self.read_blob(CLASSIFIER_FILE)?;
        let scaler: orbitx_core::StandardScaler = self.read_blob(SCALER_FILE)?;
        let neighbors = self.read_blob(NEIGHBORS_FILE)?;
        let encoder: orbitx_core::LabelEncoder = self.read_blob(LABEL_ENCODER_FILE)?;

        if scaler.n_features() != metadata.n_features
            || metadata.feature_columns.len() != metadata.n_features
        {
            return Err(Error::Serialization(format!(
                "artifact mismatch: metadata declares {} features, scaler has {}",
                metadata.n_features,
                scaler.n_features()
            )));
        }
        if encoder.classes() != metadata.class_names.as_slice() {
            return Err(Error::Serialization(
                "artifact mismatch: encoder classes differ from metadata".into(),
            ));
        }

        let model = FittedModel {
            feature_columns: metadata.feature_columns.clone(),
            target_column: metadata.target_column.clone(),
            scaler,
            encoder,
            classifier,
            neighbors,
        };

        info!(dir = %self.dir.display(), trained_at = metadata.trained_at, "model artifacts loaded");
        Ok(Some((model, metadata)))
    }

    fn write_blob<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let bytes =
            bincode::serialize(value).map_err(|e| Error::Serialization(format!("{name}: {e}")))?;
        self.write_atomic(name, &bytes)
    }

    fn read_blob<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let bytes = std::fs::read(&path)
            .map_err(|e| Error::Serialization(format!("{name}: {e}")))?;
        bincode::deserialize(&bytes).map_err(|e| Error::Serialization(format!("{name}: {e}")))
    }

    /// Write to a temp sibling, then rename into place.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(name);
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
