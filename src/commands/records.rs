//! Records command implementation

use crate::context::load_decrypted;
use crate::crypto::SymptomCipher;
use crate::db::{SeverityEntry, SymptomDb};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Stored prediction with its severity rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordInfo {
    pub id: i64,
    pub prediction: String,
    pub timestamp: String,
    pub severities: Vec<SeverityEntry>,
}

/// A record with its decrypted symptom submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub record: RecordInfo,
    pub symptoms: Vec<i64>,
}

/// List the most recent prediction records
pub async fn cmd_list_records(db: &SymptomDb, limit: u32) -> Result<Vec<RecordInfo>> {
    info!("Listing up to {} records", limit);

    let records = db.list_records(limit).await?;
    let mut result = Vec::with_capacity(records.len());

    for record in records {
        let severities = db.list_severities(record.id).await?;
        result.push(RecordInfo {
            id: record.id,
            prediction: record.prediction,
            timestamp: record.timestamp,
            severities,
        });
    }

    Ok(result)
}

/// Load one record and decrypt its symptom list
pub async fn cmd_show_record(
    db: &SymptomDb,
    cipher: &SymptomCipher,
    id: i64,
) -> Result<RecordDetail> {
    let (record, symptoms) = load_decrypted(db, cipher, id).await?;
    let severities = db.list_severities(id).await?;

    Ok(RecordDetail {
        record: RecordInfo {
            id: record.id,
            prediction: record.prediction,
            timestamp: record.timestamp,
            severities,
        },
        symptoms,
    })
}

fn format_severities(entries: &[SeverityEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} ({})", e.symptom, e.severity))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print records list to console
pub fn print_records(records: &[RecordInfo]) {
    println!("\n🗂  Prediction Records\n");

    if records.is_empty() {
        println!("No predictions recorded yet.");
        return;
    }

    for record in records {
        println!("• #{} {} [{}]", record.id, record.prediction, record.timestamp);
        println!("  Symptoms: {}", format_severities(&record.severities));
    }
}

/// Print a single record to console
pub fn print_record_detail(detail: &RecordDetail) {
    println!("\nRecord #{}", detail.record.id);
    println!("  Prediction: {}", detail.record.prediction);
    println!("  Timestamp: {}", detail.record.timestamp);
    let ids: Vec<String> = detail.symptoms.iter().map(|id| id.to_string()).collect();
    println!("  Submitted symptom IDs: {}", ids.join(", "));
    println!("  Severities: {}", format_severities(&detail.record.severities));
}
