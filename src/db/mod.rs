//! Prediction storage using SQLite
//!
//! This module handles all persistent state:
//! - Symptoms and conditions (seeded reference data)
//! - Patient symptom records (encrypted input + top prediction)
//! - Per-symptom severities attached to each record
//! - Analytics over historical severities

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Reported severity of a single symptom, stored as TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Mild" => Ok(Severity::Mild),
            "Moderate" => Ok(Severity::Moderate),
            "Severe" => Ok(Severity::Severe),
            _ => Err(Error::InvalidSeverity(s.to_string())),
        }
    }
}

/// A known symptom; `id` is its 1-based feature slot
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Symptom {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// A condition the classifier may predict
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub severity: Severity,
}

/// A stored prediction
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PatientSymptomRecord {
    pub id: i64,
    #[serde(skip)]
    pub encrypted_symptoms: Vec<u8>,
    pub prediction: String,
    pub timestamp: String,
}

/// A severity row joined with its symptom name
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SeverityEntry {
    pub symptom_id: i64,
    pub symptom: String,
    pub severity: Severity,
}

/// Everything needed to persist one prediction
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub encrypted_symptoms: Vec<u8>,
    pub prediction: String,
    pub severities: Vec<(i64, Severity)>,
}

/// How often a symptom has been reported
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SymptomFrequency {
    pub symptom: String,
    pub count: i64,
}

/// Row counts across all tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStats {
    pub symptom_count: usize,
    pub condition_count: usize,
    pub record_count: usize,
    pub severity_count: usize,
}

/// Prediction database handle
#[derive(Clone)]
pub struct SymptomDb {
    pool: SqlitePool,
}

impl SymptomDb {
    /// Connect to the database configured in `config`
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::connect_path(&config.paths.db_file, config.database.max_connections).await
    }

    async fn connect_path(db_path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Connect, create the schema if needed, and seed reference data
    pub async fn open(config: &Config) -> Result<Self> {
        let db = Self::connect(config).await?;
        if !db.is_initialized().await? {
            db.init_schema().await?;
        }
        db.seed_reference_data().await?;
        Ok(db)
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if database is initialized
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='patient_symptom_mapping'",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(result.is_some())
    }

    /// Insert reference symptoms and conditions into empty tables.
    /// Returns true if anything was inserted.
    pub async fn seed_reference_data(&self) -> Result<bool> {
        let mut seeded = false;
        let mut tx = self.pool.begin().await?;

        let symptoms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM symptoms")
            .fetch_one(&mut *tx)
            .await?;
        if symptoms == 0 {
            for (idx, (name, description)) in SEED_SYMPTOMS.iter().enumerate() {
                sqlx::query("INSERT INTO symptoms (id, name, description) VALUES (?, ?, ?)")
                    .bind(idx as i64 + 1)
                    .bind(name)
                    .bind(description)
                    .execute(&mut *tx)
                    .await?;
            }
            info!("Initialized {} symptoms in database", SEED_SYMPTOMS.len());
            seeded = true;
        }

        let conditions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conditions")
            .fetch_one(&mut *tx)
            .await?;
        if conditions == 0 {
            for (name, description, severity) in SEED_CONDITIONS {
                sqlx::query("INSERT INTO conditions (name, description, severity) VALUES (?, ?, ?)")
                    .bind(name)
                    .bind(description)
                    .bind(severity)
                    .execute(&mut *tx)
                    .await?;
            }
            info!("Initialized {} conditions in database", SEED_CONDITIONS.len());
            seeded = true;
        }

        tx.commit().await?;
        Ok(seeded)
    }

    // ===== Reference Data =====

    /// List all symptoms in id order
    pub async fn list_symptoms(&self) -> Result<Vec<Symptom>> {
        let symptoms = sqlx::query_as::<_, Symptom>("SELECT * FROM symptoms ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(symptoms)
    }

    /// Number of known symptoms, i.e. the feature vector width
    pub async fn count_symptoms(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM symptoms")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// List all conditions by name
    pub async fn list_conditions(&self) -> Result<Vec<Condition>> {
        let conditions = sqlx::query_as::<_, Condition>("SELECT * FROM conditions ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(conditions)
    }

    // ===== Prediction Records =====

    /// Persist a prediction and its severities atomically.
    ///
    /// The record id and timestamp are assigned by the database. If any
    /// insert fails the transaction is dropped uncommitted and nothing is
    /// written.
    pub async fn record_prediction(&self, new: &NewPrediction) -> Result<PatientSymptomRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, PatientSymptomRecord>(
            r#"
            INSERT INTO patient_symptoms (encrypted_symptoms, prediction)
            VALUES (?, ?)
            RETURNING id, encrypted_symptoms, prediction, timestamp
            "#,
        )
        .bind(&new.encrypted_symptoms)
        .bind(&new.prediction)
        .fetch_one(&mut *tx)
        .await?;

        for (symptom_id, severity) in &new.severities {
            sqlx::query(
                r#"
                INSERT INTO patient_symptom_mapping (patient_symptom_id, symptom_id, severity)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(record.id)
            .bind(symptom_id)
            .bind(severity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Saved prediction for patient_symptom_id: {}", record.id);
        Ok(record)
    }

    /// Get a record by id
    pub async fn get_record(&self, id: i64) -> Result<Option<PatientSymptomRecord>> {
        let record =
            sqlx::query_as::<_, PatientSymptomRecord>("SELECT * FROM patient_symptoms WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    /// Most recent records first
    pub async fn list_records(&self, limit: u32) -> Result<Vec<PatientSymptomRecord>> {
        let records = sqlx::query_as::<_, PatientSymptomRecord>(
            "SELECT * FROM patient_symptoms ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Severities reported with a record, in insertion order
    pub async fn list_severities(&self, record_id: i64) -> Result<Vec<SeverityEntry>> {
        let entries = sqlx::query_as::<_, SeverityEntry>(
            r#"
            SELECT m.symptom_id, s.name AS symptom, m.severity
            FROM patient_symptom_mapping m
            JOIN symptoms s ON s.id = m.symptom_id
            WHERE m.patient_symptom_id = ?
            ORDER BY m.id
            "#,
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Number of severity rows attached to a record
    pub async fn count_severities(&self, record_id: i64) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM patient_symptom_mapping WHERE patient_symptom_id = ?",
        )
        .bind(record_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as usize)
    }

    // ===== Statistics =====

    /// How often each symptom has been reported. Unreported symptoms are absent.
    pub async fn symptom_frequencies(&self) -> Result<Vec<SymptomFrequency>> {
        let rows = sqlx::query_as::<_, SymptomFrequency>(
            r#"
            SELECT s.name AS symptom, COUNT(m.id) AS count
            FROM symptoms s
            JOIN patient_symptom_mapping m ON m.symptom_id = s.id
            GROUP BY s.id, s.name
            ORDER BY count DESC, s.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get global statistics
    pub async fn get_stats(&self) -> Result<DbStats> {
        let symptom_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM symptoms")
            .fetch_one(&self.pool)
            .await?;

        let condition_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conditions")
            .fetch_one(&self.pool)
            .await?;

        let record_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patient_symptoms")
            .fetch_one(&self.pool)
            .await?;

        let severity_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM patient_symptom_mapping")
                .fetch_one(&self.pool)
                .await?;

        Ok(DbStats {
            symptom_count: symptom_count as usize,
            condition_count: condition_count as usize,
            record_count: record_count as usize,
            severity_count: severity_count as usize,
        })
    }

    /// Close the pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
