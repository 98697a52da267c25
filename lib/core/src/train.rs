//! Training pipeline: label encoding, holdout evaluation, and the fitting
//! of all four model artifacts from one dataset snapshot.

use crate::classifier::GaussianNb;
use crate::error::{Error, Result};
use crate::loading::PreparedDataset;
use crate::neighbors::NeighborIndex;
use crate::preprocess::{LabelEncoder, StandardScaler};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

const SPLIT_SEED: u64 = 42;
const TEST_FRACTION: f64 = 0.2;
const MIN_HOLDOUT_ROWS: usize = 5;

/// Everything inference needs, fitted together from one dataset snapshot.
/// Partially refreshed state is unrepresentable: the struct is built whole
/// and swapped whole.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub scaler: StandardScaler,
    pub encoder: LabelEncoder,
    pub classifier: GaussianNb,
    pub neighbors: NeighborIndex,
}

/// Outcome summary of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub n_samples: usize,
    pub n_features: usize,
    pub class_names: Vec<String>,
}

/// Fit scaler, label encoder, classifier, and neighbor index from the
/// prepared dataset. The classifier is fitted on a shuffled training split
/// and scored on the holdout; the neighbor index covers every dataset row
/// so hit indices are dataset row indices.
pub fn train(prepared: &PreparedDataset) -> Result<(FittedModel, TrainingReport)> {
    let dataset = &prepared.dataset;
    if dataset.is_empty() {
        return Err(Error::DataUnavailable("no data available for training".into()));
    }
    if prepared.feature_columns.is_empty() {
        return Err(Error::DataUnavailable("no usable feature columns".into()));
    }

    let feature_indices: Vec<usize> = prepared
        .feature_columns
        .iter()
        .map(|name| {
            dataset
                .column_index(name)
                .ok_or_else(|| Error::Internal(format!("feature column '{name}' missing")))
        })
        .collect::<Result<_>>()?;

    let x_all: Vec<Vec<f64>> = (0..dataset.n_rows())
        .map(|row| {
            feature_indices
                .iter()
                .map(|&c| {
                    dataset.value(row, c).as_f64().ok_or_else(|| {
                        Error::Internal(format!("non-numeric feature cell at row {row}"))
                    })
                })
                .collect()
        })
        .collect::<Result<_>>()?;

    let target_col = dataset
        .column_index(&prepared.target_column)
        .ok_or_else(|| Error::Internal("target column missing".into()))?;

    // Rows with a null target are excluded from supervised fitting but
    // remain in the neighbor index.
    let labeled_rows: Vec<usize> = (0..dataset.n_rows())
        .filter(|&row| !dataset.value(row, target_col).is_null())
        .collect();
    if labeled_rows.is_empty() {
        return Err(Error::DataUnavailable("target column has no labels".into()));
    }

    let labels: Vec<String> = labeled_rows
        .iter()
        .map(|&row| dataset.value(row, target_col).to_string())
        .collect();
    let encoder = LabelEncoder::fit(&labels)?;
    let encoded: Vec<usize> = labels
        .iter()
        .map(|l| encoder.encode(l))
        .collect::<Result<_>>()?;

    let mut order: Vec<usize> = (0..labeled_rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(SPLIT_SEED));
    let test_len = if labeled_rows.len() >= MIN_HOLDOUT_ROWS {
        ((labeled_rows.len() as f64) * TEST_FRACTION) as usize
    } else {
        0
    };
    let (test_idx, train_idx) = order.split_at(test_len);

    let train_rows: Vec<Vec<f64>> = train_idx
        .iter()
        .map(|&i| x_all[labeled_rows[i]].clone())
        .collect();
    let train_labels: Vec<usize> = train_idx.iter().map(|&i| encoded[i]).collect();

    let scaler = StandardScaler::fit(&train_rows)?;
    let classifier = GaussianNb::fit(
        &scaler.transform_all(&train_rows)?,
        &train_labels,
        encoder.n_classes(),
    )?;

    // Holdout accuracy; on tiny datasets fall back to the training rows so
    // the report is never empty.
    let (eval_idx, eval_name) = if test_len > 0 {
        (test_idx, "holdout")
    } else {
        (train_idx, "training")
    };
    let mut correct = 0usize;
    for &i in eval_idx {
        let scaled = scaler.transform(&x_all[labeled_rows[i]])?;
        let (predicted, _) = classifier.predict(&scaled)?;
        if predicted == encoded[i] {
            correct += 1;
        }
    }
    let accuracy = correct as f64 / eval_idx.len() as f64;

    let neighbors = NeighborIndex::fit(scaler.transform_all(&x_all)?)?;

    info!(
        accuracy,
        eval = eval_name,
        samples = dataset.n_rows(),
        features = prepared.feature_columns.len(),
        classes = ?encoder.classes(),
        "model trained"
    );

    let report = TrainingReport {
        accuracy,
        n_samples: dataset.n_rows(),
        n_features: prepared.feature_columns.len(),
        class_names: encoder.classes().to_vec(),
    };

    Ok((
        FittedModel {
            feature_columns: prepared.feature_columns.clone(),
            target_column: prepared.target_column.clone(),
            scaler,
            encoder,
            classifier,
            neighbors,
        },
        report,
    ))
}
