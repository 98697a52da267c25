//! The inference engine: the one context object owning the dataset and the
//! fitted model state, plus the orchestration of exact match, neighbor
//! search, and classification into a single tagged response.

use crate::cache::{Clock, TimedCache};
use crate::error::{Error, Result};
use crate::exact::find_exact_match;
use crate::loading::PreparedDataset;
use crate::neighbors::similarity_score;
use crate::response::{
    AnalysisResponse, Classification, ColumnReport, InferenceRequest, Neighbor,
};
use crate::train::FittedModel;
use crate::vectorize::feature_vector;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Inference policy knobs. The defaults mirror the reference deployment
/// but are deliberate configuration, not constants.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Neighbors returned by a similarity search.
    pub neighbor_count: usize,
    /// Absolute tolerance for numeric exact-match comparison (strict).
    pub numeric_tolerance: f64,
    /// How long column summaries stay cached.
    pub cache_freshness: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbor_count: 6,
            numeric_tolerance: 1e-6,
            cache_freshness: Duration::from_secs(300),
        }
    }
}

/// A consistent pair of dataset and model, produced by one load/train
/// cycle. Readers always see the pair together; a retrain installs a new
/// snapshot in a single store.
#[derive(Debug)]
pub struct Snapshot {
    pub data: PreparedDataset,
    pub model: Option<FittedModel>,
}

/// Shared, swap-on-retrain inference context.
///
/// Readers clone the inner `Arc` and work against an immutable snapshot
/// for the whole request; the retraining task is the only writer.
pub struct InferenceEngine {
    config: EngineConfig,
    state: RwLock<Option<Arc<Snapshot>>>,
    column_cache: TimedCache<ColumnReport>,
}

impl InferenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        let freshness = config.cache_freshness;
        Self {
            config,
            state: RwLock::new(None),
            column_cache: TimedCache::new(freshness),
        }
    }

    /// Like [`InferenceEngine::new`] with an injected clock for the
    /// metadata cache.
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let freshness = config.cache_freshness;
        Self {
            config,
            state: RwLock::new(None),
            column_cache: TimedCache::with_clock(freshness, clock),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install a new dataset/model pair. Atomic from the perspective of
    /// readers; also drops cached column statistics, which were computed
    /// from the previous snapshot.
    pub fn install(&self, snapshot: Snapshot) {
        *self.state.write() = Some(Arc::new(snapshot));
        self.column_cache.clear();
    }

    /// The current snapshot, if any load has completed.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.read().clone()
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot().is_some_and(|s| s.model.is_some())
    }

    pub fn clear_cache(&self) {
        self.column_cache.clear();
    }

    /// Run one analysis request to a single tagged response. No failure
    /// escapes as an error value, let alone a panic.
    pub fn analyze(&self, request: &InferenceRequest) -> AnalysisResponse {
        match self.try_analyze(request) {
            Ok(response) => response,
            Err(err) => AnalysisResponse::failure(&err),
        }
    }

    fn try_analyze(&self, request: &InferenceRequest) -> Result<AnalysisResponse> {
        request.validate()?;

        let snapshot = self
            .snapshot()
            .ok_or_else(|| Error::DataUnavailable("dataset not loaded".into()))?;
        let dataset = &snapshot.data.dataset;

        // Exact match comes first and short-circuits the ML path entirely.
        if let Some(hit) = find_exact_match(
            dataset,
            &request.user_inputs,
            &request.selected_columns,
            self.config.numeric_tolerance,
        ) {
            return Ok(AnalysisResponse::exact_match(hit.record));
        }

        let model = snapshot.model.as_ref().ok_or(Error::ModelNotReady)?;

        // One vector feeds both neighbor search and classification, scaled
        // with the transform fitted alongside the model.
        let vector = feature_vector(dataset, &model.feature_columns, &request.user_inputs)?;
        let scaled = model.scaler.transform(&vector)?;

        let hits = model.neighbors.search(&scaled, self.config.neighbor_count)?;
        let (best, probs) = model.classifier.predict(&scaled)?;

        let classification = Classification {
            classification: model.encoder.decode(best)?.to_string(),
            confidence: probs[best],
            probabilities: model
                .encoder
                .classes()
                .iter()
                .cloned()
                .zip(probs)
                .collect(),
        };

        let neighbors = hits
            .into_iter()
            .map(|hit| Neighbor {
                index: hit.index,
                similarity_score: similarity_score(hit.distance),
                distance: hit.distance,
                record: dataset.record(hit.index, &[]),
            })
            .collect();

        Ok(AnalysisResponse::ml_analysis(classification, neighbors))
    }

    /// Column summaries for the current dataset, served from the timed
    /// cache while fresh.
    pub fn column_info(&self) -> ColumnReport {
        let Some(snapshot) = self.snapshot() else {
            return ColumnReport::failure("data not loaded");
        };
        self.column_cache
            .get_or_compute(|| {
                Ok::<_, Error>(ColumnReport::ok(snapshot.data.dataset.column_summaries()))
            })
            .unwrap_or_else(|err| ColumnReport::failure(err.to_string()))
    }
}
