//! Train command implementation

use crate::classifier::train::{train_synthetic, TrainOptions, TrainSummary};
use crate::classifier::{save_artifact, ModelArtifact};
use crate::config::Config;
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Result of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainResult {
    pub model_path: String,
    pub summary: TrainSummary,
}

/// Train on synthetic data and write the artifact to `output` (or the
/// configured model path).
pub fn cmd_train(
    config: &Config,
    options: &TrainOptions,
    output: Option<PathBuf>,
) -> Result<TrainResult> {
    let path = output.unwrap_or_else(|| config.model_path());
    let report = train_synthetic(options)?;
    save_artifact(&ModelArtifact::BernoulliNaiveBayes(report.model), &path)?;

    Ok(TrainResult {
        model_path: path.display().to_string(),
        summary: report.summary,
    })
}

/// Print training summary to console
pub fn print_train_result(result: &TrainResult) {
    println!("\n🧪 Training complete\n");
    println!("Model: {}", result.model_path);
    println!("Samples: {}", result.summary.samples);
    println!("Features: {}", result.summary.features);
    println!("Conditions: {}", result.summary.classes.join(", "));
    println!("Training accuracy: {:.1}%", result.summary.accuracy * 100.0);
}
