//! Bernoulli naive Bayes over binary symptom features

use super::Classifier;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bernoulli naive Bayes model.
///
/// Log-probabilities are stored per class: `feature_log_prob[c][j]` is
/// `ln P(x_j = 1 | c)` and `feature_log_neg_prob[c][j]` is `ln P(x_j = 0 | c)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BernoulliNaiveBayes {
    pub classes: Vec<String>,
    pub feature_count: usize,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
    pub feature_log_neg_prob: Vec<Vec<f64>>,
}

impl BernoulliNaiveBayes {
    /// Fit on binary samples with additive (Laplace) smoothing `alpha`.
    ///
    /// Classes are ordered by label so the output order is stable.
    pub fn fit(samples: &[Vec<f64>], labels: &[String], alpha: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::Model("no training samples".to_string()));
        }
        if samples.len() != labels.len() {
            return Err(Error::Model(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if alpha <= 0.0 {
            return Err(Error::Model("alpha must be positive".to_string()));
        }

        let feature_count = samples[0].len();
        if let Some(row) = samples.iter().find(|r| r.len() != feature_count) {
            return Err(Error::Model(format!(
                "ragged samples: expected {} features, found {}",
                feature_count,
                row.len()
            )));
        }

        // label -> (sample count, per-feature ones)
        let mut counts: BTreeMap<&str, (usize, Vec<usize>)> = BTreeMap::new();
        for (row, label) in samples.iter().zip(labels) {
            let entry = counts
                .entry(label.as_str())
                .or_insert_with(|| (0, vec![0; feature_count]));
            entry.0 += 1;
            for (j, &x) in row.iter().enumerate() {
                if x > 0.0 {
                    entry.1[j] += 1;
                }
            }
        }

        let total = samples.len() as f64;
        let mut model = Self {
            classes: Vec::with_capacity(counts.len()),
            feature_count,
            class_log_prior: Vec::with_capacity(counts.len()),
            feature_log_prob: Vec::with_capacity(counts.len()),
            feature_log_neg_prob: Vec::with_capacity(counts.len()),
        };

        for (label, (n, ones)) in counts {
            let denom = n as f64 + 2.0 * alpha;
            let probs: Vec<f64> = ones.iter().map(|&k| (k as f64 + alpha) / denom).collect();
            model.classes.push(label.to_string());
            model.class_log_prior.push((n as f64 / total).ln());
            model.feature_log_prob.push(probs.iter().map(|p| p.ln()).collect());
            model
                .feature_log_neg_prob
                .push(probs.iter().map(|p| (1.0 - p).ln()).collect());
        }

        Ok(model)
    }

    /// Check internal consistency of a deserialized model
    pub fn validate(&self) -> Result<()> {
        let n = self.classes.len();
        if n == 0 {
            return Err(Error::Model("model has no classes".to_string()));
        }
        if self.class_log_prior.len() != n
            || self.feature_log_prob.len() != n
            || self.feature_log_neg_prob.len() != n
        {
            return Err(Error::Model(format!(
                "parameter tables do not match {} classes",
                n
            )));
        }

        let rows = self.feature_log_prob.iter().chain(&self.feature_log_neg_prob);
        for row in rows {
            if row.len() != self.feature_count {
                return Err(Error::Model(format!(
                    "parameter row has {} entries, expected {}",
                    row.len(),
                    self.feature_count
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(Error::Model("non-finite log probability".to_string()));
            }
        }

        if self.class_log_prior.iter().any(|v| v.is_nan()) {
            return Err(Error::Model("NaN class prior".to_string()));
        }

        Ok(())
    }

    /// Joint log-likelihood of each class
    fn joint_log_likelihood(&self, features: &[f64]) -> Vec<f64> {
        (0..self.classes.len())
            .map(|c| {
                let present = &self.feature_log_prob[c];
                let absent = &self.feature_log_neg_prob[c];
                features.iter().enumerate().fold(self.class_log_prior[c], |acc, (j, &x)| {
                    acc + if x > 0.0 { present[j] } else { absent[j] }
                })
            })
            .collect()
    }
}

impl Classifier for BernoulliNaiveBayes {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.feature_count {
            return Err(Error::PredictionFailed(format!(
                "expected {} features, got {}",
                self.feature_count,
                features.len()
            )));
        }

        let jll = self.joint_log_likelihood(features);
        let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(Error::PredictionFailed(
                "no class has finite likelihood".to_string(),
            ));
        }

        let exp: Vec<f64> = jll.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        Ok(exp.into_iter().map(|e| e / sum).collect())
    }
}
