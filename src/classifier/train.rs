//! Synthetic training data and model fitting
//!
//! Produces the bundled classifier artifact. Each synthetic patient has
//! random background symptoms plus the signature symptoms of their
//! condition.

use super::{rank_predictions, BernoulliNaiveBayes};
use crate::db::SEED_SYMPTOMS;
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

/// Signature symptoms per condition, as zero-based feature slots
pub const CONDITION_PROFILES: &[(&str, &[usize])] = &[
    ("Flu", &[0, 1, 8]),
    ("Cold", &[1, 5, 6]),
    ("Migraine", &[3, 2, 9]),
    ("Allergies", &[4, 5]),
    ("Gastroenteritis", &[4, 7, 8]),
];

/// Training parameters
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub samples: usize,
    pub seed: u64,
    pub alpha: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            samples: 100,
            seed: 42,
            alpha: 1.0,
        }
    }
}

/// Fitted model with its training-set accuracy
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub model: BernoulliNaiveBayes,
    pub summary: TrainSummary,
}

/// Printable training summary
#[derive(Debug, Clone, Serialize)]
pub struct TrainSummary {
    pub samples: usize,
    pub features: usize,
    pub classes: Vec<String>,
    pub accuracy: f64,
}

/// Generate `samples` synthetic (features, label) pairs
pub fn generate_synthetic(options: &TrainOptions) -> (Vec<Vec<f64>>, Vec<String>) {
    let feature_count = SEED_SYMPTOMS.len();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut samples = Vec::with_capacity(options.samples);
    let mut labels = Vec::with_capacity(options.samples);

    for _ in 0..options.samples {
        let mut row: Vec<f64> = (0..feature_count)
            .map(|_| rng.gen_range(0..2u8) as f64)
            .collect();
        let (label, slots) = CONDITION_PROFILES[rng.gen_range(0..CONDITION_PROFILES.len())];
        for &slot in slots {
            row[slot] = 1.0;
        }
        samples.push(row);
        labels.push(label.to_string());
    }

    (samples, labels)
}

/// Fit a Bernoulli naive Bayes model on synthetic data
pub fn train_synthetic(options: &TrainOptions) -> Result<TrainReport> {
    if options.samples == 0 {
        return Err(Error::Model("samples must be at least 1".to_string()));
    }

    let (samples, labels) = generate_synthetic(options);
    info!(
        "Training on {} synthetic samples (seed {})",
        samples.len(),
        options.seed
    );

    let model = BernoulliNaiveBayes::fit(&samples, &labels, options.alpha)?;

    let mut correct = 0usize;
    for (row, label) in samples.iter().zip(&labels) {
        let features = FeatureVector::from_values(row.clone());
        if rank_predictions(&model, &features)?.top_prediction == *label {
            correct += 1;
        }
    }
    let accuracy = correct as f64 / samples.len() as f64;
    info!("Training accuracy: {:.3}", accuracy);

    Ok(TrainReport {
        summary: TrainSummary {
            samples: samples.len(),
            features: model.feature_count,
            classes: model.classes.clone(),
            accuracy,
        },
        model,
    })
}
