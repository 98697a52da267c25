//! Gaussian naive Bayes classifier over standardized features.
//!
//! Class-conditional feature likelihoods are modeled as independent
//! Gaussians; posteriors are computed in log space and normalized with the
//! log-sum-exp trick so the returned distribution always sums to one.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const VAR_SMOOTHING: f64 = 1e-9;

/// A fitted Gaussian naive Bayes model. Class indices are the label
/// encoder's dense indices `0..n_classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianNb {
    /// P(y = c), zero for classes absent from the training split.
    priors: Vec<f64>,
    /// Per-class feature means, `means[class][feature]`.
    means: Vec<Vec<f64>>,
    /// Per-class feature variances, smoothed.
    variances: Vec<Vec<f64>>,
}

impl GaussianNb {
    /// Fit on a row-major sample matrix with encoded labels in
    /// `0..n_classes`.
    pub fn fit(rows: &[Vec<f64>], labels: &[usize], n_classes: usize) -> Result<Self> {
        let n_samples = rows.len();
        if n_samples == 0 {
            return Err(Error::Internal("cannot fit classifier on empty data".into()));
        }
        if labels.len() != n_samples {
            return Err(Error::Internal(format!(
                "{} samples but {} labels",
                n_samples,
                labels.len()
            )));
        }
        if n_classes < 2 {
            return Err(Error::Internal(
                "training requires at least 2 target classes".into(),
            ));
        }
        let n_features = rows[0].len();

        let mut priors = vec![0.0; n_classes];
        let mut means = vec![vec![0.0; n_features]; n_classes];
        let mut variances = vec![vec![VAR_SMOOTHING; n_features]; n_classes];

        let mut counts = vec![0usize; n_classes];
        for (row, &label) in rows.iter().zip(labels) {
            if label >= n_classes {
                return Err(Error::Internal(format!(
                    "label {label} out of range for {n_classes} classes"
                )));
            }
            counts[label] += 1;
            for (m, v) in means[label].iter_mut().zip(row) {
                *m += v;
            }
        }
        for (class, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            priors[class] = count as f64 / n_samples as f64;
            for m in &mut means[class] {
                *m /= count as f64;
            }
        }
        for (row, &label) in rows.iter().zip(labels) {
            for ((var, v), m) in variances[label].iter_mut().zip(row).zip(&means[label]) {
                let diff = v - m;
                *var += diff * diff / counts[label] as f64;
            }
        }

        Ok(Self {
            priors,
            means,
            variances,
        })
    }

    #[inline]
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.priors.len()
    }

    #[inline]
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.means.first().map_or(0, Vec::len)
    }

    /// Posterior probability per class for one standardized vector.
    pub fn predict_proba(&self, vector: &[f64]) -> Result<Vec<f64>> {
        let n_features = self.n_features();
        if vector.len() != n_features {
            return Err(Error::Internal(format!(
                "classifier fitted on {} features, got {}",
                n_features,
                vector.len()
            )));
        }

        let mut log_probs = Vec::with_capacity(self.priors.len());
        for class in 0..self.priors.len() {
            if self.priors[class] == 0.0 {
                log_probs.push(f64::NEG_INFINITY);
                continue;
            }
            let mut log_prob = self.priors[class].ln();
            for ((v, m), var) in vector
                .iter()
                .zip(&self.means[class])
                .zip(&self.variances[class])
            {
                let diff = v - m;
                log_prob += -0.5 * (std::f64::consts::TAU * var).ln() - diff * diff / (2.0 * var);
            }
            log_probs.push(log_prob);
        }

        let max_log = log_probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max_log.is_finite() {
            return Err(Error::Internal("degenerate class posteriors".into()));
        }
        let exp: Vec<f64> = log_probs.iter().map(|lp| (lp - max_log).exp()).collect();
        let sum: f64 = exp.iter().sum();
        Ok(exp.into_iter().map(|p| p / sum).collect())
    }

    /// Most probable class index together with the full distribution.
    pub fn predict(&self, vector: &[f64]) -> Result<(usize, Vec<f64>)> {
        let probs = self.predict_proba(vector)?;
        let best = probs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .ok_or_else(|| Error::Internal("empty probability vector".into()))?;
        Ok((best, probs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> GaussianNb {
        // Two well-separated clusters.
        let rows = vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![-0.1, -0.1],
            vec![5.0, 5.1],
            vec![5.1, 4.9],
            vec![4.9, 5.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        GaussianNb::fit(&rows, &labels, 2).unwrap()
    }

    #[test]
    fn test_predicts_nearest_cluster() {
        let model = fitted();
        let (class, _) = model.predict(&[0.05, 0.05]).unwrap();
        assert_eq!(class, 0);
        let (class, _) = model.predict(&[5.0, 5.0]).unwrap();
        assert_eq!(class, 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = fitted();
        let probs = model.predict_proba(&[2.0, 2.0]).unwrap();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let model = fitted();
        let (class, probs) = model.predict(&[0.0, 0.0]).unwrap();
        let max = probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(probs[class], max);
        assert!(max > 0.9);
    }

    #[test]
    fn test_single_class_rejected() {
        let rows = vec![vec![1.0], vec![2.0]];
        assert!(GaussianNb::fit(&rows, &[0, 0], 1).is_err());
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = fitted();
        assert!(model.predict_proba(&[1.0]).is_err());
    }
}
