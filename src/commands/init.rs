//! Init command implementation

use crate::config::Config;
use crate::db::SymptomDb;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// What `init` created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSummary {
    pub config_path: String,
    pub db_path: String,
    pub config_written: bool,
    pub reference_data_seeded: bool,
}

/// Write a default config (unless one exists), create the schema and seed
/// reference data.
pub async fn cmd_init(base_dir: PathBuf, config_path: PathBuf, force: bool) -> Result<InitSummary> {
    let config_exists = config_path.exists();

    let mut config = if config_exists && !force {
        info!("Keeping existing config at {:?}", config_path);
        Config::load(&config_path)?
    } else {
        Config::default()
    };
    config.init_paths(Some(base_dir));
    config.paths.config_file = config_path.clone();

    let config_written = !config_exists || force;
    if config_written {
        config.validate()?;
        config.save()?;
    }

    let db = SymptomDb::connect(&config).await?;
    if !db.is_initialized().await? {
        db.init_schema().await?;
        info!("Created database at {:?}", config.paths.db_file);
    }
    let seeded = db.seed_reference_data().await?;
    db.close().await;

    Ok(InitSummary {
        config_path: config_path.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        config_written,
        reference_data_seeded: seeded,
    })
}

/// Print init summary to console
pub fn print_init_summary(summary: &InitSummary) {
    println!("✓ symptom-checker initialized");
    if summary.config_written {
        println!("  Config: {}", summary.config_path);
    } else {
        println!("  Config: {} (existing, kept)", summary.config_path);
    }
    println!("  Database: {}", summary.db_path);
    if summary.reference_data_seeded {
        println!("  Seeded reference symptoms and conditions");
    }
    println!("\nNext steps:");
    println!("  1. Generate a key: symptom-checker keygen");
    println!("  2. Export it: export SYMPTOM_CHECKER_ENCRYPTION_KEY=<key>");
    println!("  3. Train the model: symptom-checker train");
    println!("  4. Start the API: symptom-checker serve");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_and_db() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        let summary = cmd_init(tmp.path().to_path_buf(), config_path.clone(), false)
            .await
            .unwrap();
        assert!(summary.config_written);
        assert!(summary.reference_data_seeded);
        assert!(config_path.exists());

        // Second run keeps the config and seeds nothing
        let again = cmd_init(tmp.path().to_path_buf(), config_path, false)
            .await
            .unwrap();
        assert!(!again.config_written);
        assert!(!again.reference_data_seeded);
    }

    #[tokio::test]
    async fn test_force_overwrites_config() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[server]\nbind = \"127.0.0.1:9999\"\n").unwrap();

        let summary = cmd_init(tmp.path().to_path_buf(), config_path.clone(), true)
            .await
            .unwrap();
        assert!(summary.config_written);

        let loaded = Config::load(&config_path).unwrap();
        assert_ne!(loaded.server.bind, "127.0.0.1:9999");
    }
}
