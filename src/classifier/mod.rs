//! Condition classification
//!
//! This module provides:
//! - A trait for probabilistic multi-class classifiers
//! - The JSON model artifact format and its loader
//! - Aggregation of per-class probabilities into ranked predictions

mod naive_bayes;
pub mod train;

pub use naive_bayes::*;

use crate::error::{Error, Result};
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Probabilities within this distance outside [0, 1] are treated as rounding noise
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Trait for pre-trained probabilistic classifiers
pub trait Classifier: Send + Sync {
    /// Class labels, in the order `predict_proba` reports them
    fn classes(&self) -> &[String];

    /// Expected input width
    fn feature_count(&self) -> usize;

    /// One probability per class label
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// Serialized classifier, tagged by model kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    BernoulliNaiveBayes(BernoulliNaiveBayes),
}

impl ModelArtifact {
    fn into_classifier(self) -> Result<Arc<dyn Classifier>> {
        match self {
            ModelArtifact::BernoulliNaiveBayes(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
        }
    }
}

/// Load a classifier artifact from disk
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>> {
    debug!("Loading classifier from {:?}", path);

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Model(format!("Failed to read model {}: {}", path.display(), e))
    })?;
    let artifact: ModelArtifact = serde_json::from_str(&content).map_err(|e| {
        Error::Model(format!("Failed to parse model {}: {}", path.display(), e))
    })?;
    let classifier = artifact.into_classifier()?;

    info!(
        "Loaded classifier with {} classes over {} features",
        classifier.classes().len(),
        classifier.feature_count()
    );
    Ok(classifier)
}

/// Write a classifier artifact to disk
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(artifact)?;
    std::fs::write(path, content)?;
    info!("Saved model to {:?}", path);
    Ok(())
}

/// Probability assigned to one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionProbability {
    pub condition: String,
    pub probability: f64,
}

/// Per-class probabilities plus the winning label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    /// One entry per class, in the classifier's label order
    pub predictions: Vec<ConditionProbability>,
    pub top_prediction: String,
}

/// Score a feature vector and pick the most probable condition.
///
/// On exact ties the label that comes first in the classifier's order wins.
/// That follows from the first-maximum scan and is not a ranking contract;
/// callers should not rely on which of two tied labels is reported.
/// Every classifier failure surfaces as `PredictionFailed`.
pub fn rank_predictions(
    classifier: &dyn Classifier,
    features: &FeatureVector,
) -> Result<PredictionSet> {
    if features.len() != classifier.feature_count() {
        return Err(Error::PredictionFailed(format!(
            "feature vector has {} entries, model expects {}",
            features.len(),
            classifier.feature_count()
        )));
    }

    let probabilities = classifier
        .predict_proba(features.as_slice())
        .map_err(|e| match e {
            Error::PredictionFailed(_) => e,
            other => Error::PredictionFailed(other.to_string()),
        })?;

    let classes = classifier.classes();
    if probabilities.len() != classes.len() {
        return Err(Error::PredictionFailed(format!(
            "model returned {} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        )));
    }

    let mut predictions = Vec::with_capacity(classes.len());
    let mut top: Option<(usize, f64)> = None;
    for (idx, (label, &p)) in classes.iter().zip(probabilities.iter()).enumerate() {
        if !p.is_finite() || p < -PROBABILITY_TOLERANCE || p > 1.0 + PROBABILITY_TOLERANCE {
            return Err(Error::PredictionFailed(format!(
                "invalid probability {} for '{}'",
                p, label
            )));
        }
        let p = p.clamp(0.0, 1.0);
        if top.map_or(true, |(_, best)| p > best) {
            top = Some((idx, p));
        }
        predictions.push(ConditionProbability {
            condition: label.clone(),
            probability: p,
        });
    }

    let (top_idx, _) =
        top.ok_or_else(|| Error::PredictionFailed("model has no classes".to_string()))?;

    Ok(PredictionSet {
        top_prediction: classes[top_idx].clone(),
        predictions,
    })
}
