//! Status command implementation

use crate::classifier::load_classifier;
use crate::config::Config;
use crate::db::{DbStats, SymptomDb};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub model_path: String,
    pub model_loaded: bool,
    pub model_classes: Vec<String>,
    pub model_features: usize,
    pub key_env: String,
    pub key_present: bool,
    pub db_stats: DbStats,
}

/// Get system status
pub async fn cmd_status(config: &Config, db: &SymptomDb) -> Result<StatusInfo> {
    info!("Getting status");

    let db_stats = db.get_stats().await?;
    let model_path = config.model_path();

    let (model_loaded, model_classes, model_features) = match load_classifier(&model_path) {
        Ok(classifier) => (
            true,
            classifier.classes().to_vec(),
            classifier.feature_count(),
        ),
        Err(e) => {
            debug!("Model not loadable: {}", e);
            (false, Vec::new(), 0)
        }
    };

    let key_present = std::env::var(&config.crypto.key_env)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        model_path: model_path.display().to_string(),
        model_loaded,
        model_classes,
        model_features,
        key_env: config.crypto.key_env.clone(),
        key_present,
        db_stats,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 symptom-checker Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);

    println!("\nModel: {}", status.model_path);
    if status.model_loaded {
        println!("  Status: ✓ Loaded");
        println!("  Features: {}", status.model_features);
        println!("  Conditions: {}", status.model_classes.join(", "));
        if status.model_features != status.db_stats.symptom_count {
            println!(
                "  ⚠ Model expects {} features but the database has {} symptoms",
                status.model_features, status.db_stats.symptom_count
            );
        }
    } else {
        println!("  Status: ✗ Missing or invalid (run 'symptom-checker train')");
    }

    let key_status = if status.key_present {
        "✓ Set"
    } else {
        "✗ Not set (run 'symptom-checker keygen')"
    };
    println!("\nEncryption key ({}): {}", status.key_env, key_status);

    println!("\nDatabase Stats:");
    println!("  Symptoms: {}", status.db_stats.symptom_count);
    println!("  Conditions: {}", status.db_stats.condition_count);
    println!("  Prediction records: {}", status.db_stats.record_count);
    println!("  Severity entries: {}", status.db_stats.severity_count);
}
