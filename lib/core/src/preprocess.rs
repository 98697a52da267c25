//! Fitted preprocessing transforms: feature standardization and label
//! encoding. Both are serialized as part of the persisted model artifacts.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standardizes features to zero mean and unit variance, column-wise.
///
/// The transform fitted at training time must be applied to every query
/// vector before distance computation or classification; mixing scaled and
/// unscaled spaces is a correctness bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a row-major sample matrix.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let n_samples = rows.len();
        if n_samples == 0 {
            return Err(Error::Internal("cannot fit scaler on empty data".into()));
        }
        let n_features = rows[0].len();

        let mut mean = vec![0.0; n_features];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n_samples as f64;
        }

        let mut std = vec![0.0; n_features];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                let diff = v - m;
                *s += diff * diff;
            }
        }
        for s in &mut std {
            *s = (*s / n_samples as f64).sqrt();
            // Constant columns pass through unscaled.
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { mean, std })
    }

    #[inline]
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one vector.
    pub fn transform(&self, vector: &[f64]) -> Result<Vec<f64>> {
        if vector.len() != self.mean.len() {
            return Err(Error::Internal(format!(
                "scaler fitted on {} features, got {}",
                self.mean.len(),
                vector.len()
            )));
        }
        Ok(vector
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }

    /// Standardize a batch of vectors.
    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

/// Maps class labels to dense indices `0..n_classes` and back.
/// Classes are sorted, matching the order of the persisted class list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit(labels: &[String]) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::Internal("cannot fit encoder on empty labels".into()));
        }
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Ok(Self { classes })
    }

    #[inline]
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| Error::Internal(format!("unknown class label '{label}'")))
    }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::Internal(format!("class index {index} out of range")))
    }
}
