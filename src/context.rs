//! Application context shared by every request handler
//!
//! Built once at startup. The classifier and cipher are immutable; the
//! database pool is the only shared mutable resource.

use crate::classifier::{load_classifier, rank_predictions, Classifier, ConditionProbability};
use crate::config::Config;
use crate::crypto::SymptomCipher;
use crate::db::{
    Condition, NewPrediction, PatientSymptomRecord, Severity, Symptom, SymptomDb,
    SymptomFrequency,
};
use crate::error::{Error, Result};
use crate::features::encode_symptoms;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A validated prediction request
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub symptoms: Vec<i64>,
    pub severities: Vec<Severity>,
}

impl PredictionInput {
    /// Validate raw request fields.
    ///
    /// Checks run in a fixed order: presence, non-empty, equal lengths,
    /// then each severity value. Symptom id ranges are checked at encoding.
    pub fn parse(symptoms: Option<Vec<i64>>, severities: Option<Vec<String>>) -> Result<Self> {
        let (symptoms, severities) = match (symptoms, severities) {
            (Some(s), Some(v)) => (s, v),
            _ => return Err(Error::MissingFields),
        };

        if symptoms.is_empty() {
            return Err(Error::EmptyInput);
        }
        if symptoms.len() != severities.len() {
            return Err(Error::SeverityCountMismatch);
        }

        let severities = severities
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Severity>>>()?;

        Ok(Self {
            symptoms,
            severities,
        })
    }
}

/// Result of a successful prediction
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub predictions: Vec<ConditionProbability>,
    pub top_prediction: String,
    pub record_id: i64,
    pub timestamp: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppContext {
    pub db: SymptomDb,
    pub classifier: Arc<dyn Classifier>,
    pub cipher: SymptomCipher,
}

impl AppContext {
    pub fn new(db: SymptomDb, classifier: Arc<dyn Classifier>, cipher: SymptomCipher) -> Self {
        Self {
            db,
            classifier,
            cipher,
        }
    }

    /// Open the database, load the classifier and resolve the key.
    /// Any failure here is fatal for the server.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let classifier = load_classifier(&config.model_path())?;
        let cipher = SymptomCipher::from_config(&config.crypto)?;
        let db = SymptomDb::open(config).await?;

        let symptom_count = db.count_symptoms().await?;
        if symptom_count != classifier.feature_count() {
            warn!(
                "Database has {} symptoms but the model expects {} features; predictions will fail",
                symptom_count,
                classifier.feature_count()
            );
        }

        info!("Application context ready");
        Ok(Self::new(db, classifier, cipher))
    }

    /// Encode, predict, persist.
    pub async fn predict(&self, input: &PredictionInput) -> Result<PredictionOutcome> {
        let symptom_count = self.db.count_symptoms().await?;
        let features = encode_symptoms(&input.symptoms, symptom_count)?;
        debug!(
            "Encoded {} active symptoms out of {}",
            features.active_count(),
            features.len()
        );

        let ranked = rank_predictions(self.classifier.as_ref(), &features)?;

        let new = NewPrediction {
            encrypted_symptoms: self.cipher.encrypt_symptoms(&input.symptoms)?,
            prediction: ranked.top_prediction.clone(),
            severities: input
                .symptoms
                .iter()
                .copied()
                .zip(input.severities.iter().copied())
                .collect(),
        };
        let record = self.db.record_prediction(&new).await?;

        Ok(PredictionOutcome {
            predictions: ranked.predictions,
            top_prediction: ranked.top_prediction,
            record_id: record.id,
            timestamp: record.timestamp,
        })
    }

    pub async fn symptoms(&self) -> Result<Vec<Symptom>> {
        self.db.list_symptoms().await
    }

    pub async fn conditions(&self) -> Result<Vec<Condition>> {
        self.db.list_conditions().await
    }

    pub async fn analytics(&self) -> Result<Vec<SymptomFrequency>> {
        self.db.symptom_frequencies().await
    }

    /// Load a record and decrypt its submitted symptom list
    pub async fn decrypt_record(&self, id: i64) -> Result<(PatientSymptomRecord, Vec<i64>)> {
        load_decrypted(&self.db, &self.cipher, id).await
    }
}

/// Fetch record `id` and decrypt it with `cipher`. Usable without a model.
pub async fn load_decrypted(
    db: &SymptomDb,
    cipher: &SymptomCipher,
    id: i64,
) -> Result<(PatientSymptomRecord, Vec<i64>)> {
    let record = db.get_record(id).await?.ok_or(Error::RecordNotFound(id))?;
    let symptoms = cipher.decrypt_symptoms(&record.encrypted_symptoms)?;
    Ok((record, symptoms))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::tests::FixedClassifier;
    use crate::classifier::train::{train_synthetic, TrainOptions};
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Context over a fresh temp database and the synthetic model
    pub(crate) async fn test_context() -> (AppContext, TempDir) {
        let report = train_synthetic(&TrainOptions::default()).unwrap();
        test_context_with(Arc::new(report.model)).await
    }

    pub(crate) async fn test_context_with(
        classifier: Arc<dyn Classifier>,
    ) -> (AppContext, TempDir) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.db_file = tmp.path().join("test.db");
        let db = SymptomDb::open(&config).await.unwrap();
        (
            AppContext::new(db, classifier, SymptomCipher::generate()),
            tmp,
        )
    }

    #[test]
    fn test_parse_validation_order() {
        assert!(matches!(
            PredictionInput::parse(None, Some(vec![])),
            Err(Error::MissingFields)
        ));
        assert!(matches!(
            PredictionInput::parse(Some(vec![]), Some(vec![])),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            PredictionInput::parse(Some(vec![1, 2]), Some(strings(&["Mild"]))),
            Err(Error::SeverityCountMismatch)
        ));
        assert!(matches!(
            PredictionInput::parse(Some(vec![1, 2]), Some(strings(&["Mild", "Extreme"]))),
            Err(Error::InvalidSeverity(v)) if v == "Extreme"
        ));

        let input =
            PredictionInput::parse(Some(vec![1, 99]), Some(strings(&["Mild", "Severe"]))).unwrap();
        assert_eq!(input.severities, vec![Severity::Mild, Severity::Severe]);
    }

    #[tokio::test]
    async fn test_predict_persists_record() {
        let (ctx, _tmp) = test_context().await;
        let input = PredictionInput::parse(
            Some(vec![1, 2, 9]),
            Some(strings(&["Mild", "Severe", "Moderate"])),
        )
        .unwrap();

        let outcome = ctx.predict(&input).await.unwrap();
        assert_eq!(outcome.predictions.len(), 5);
        assert_eq!(outcome.top_prediction, "Flu");
        assert_eq!(ctx.db.count_severities(outcome.record_id).await.unwrap(), 3);

        let (record, symptoms) = ctx.decrypt_record(outcome.record_id).await.unwrap();
        assert_eq!(symptoms, vec![1, 2, 9]);
        assert_eq!(record.prediction, "Flu");
        assert_eq!(record.timestamp, outcome.timestamp);
    }

    #[tokio::test]
    async fn test_top_prediction_matches_argmax() {
        let (ctx, _tmp) = test_context().await;
        let cases: &[&[i64]] = &[&[4, 3, 10], &[5, 6], &[5, 8, 9], &[2, 6, 7], &[1], &[7, 10]];

        for ids in cases {
            let severities = vec!["Mild".to_string(); ids.len()];
            let input = PredictionInput::parse(Some(ids.to_vec()), Some(severities)).unwrap();
            let outcome = ctx.predict(&input).await.unwrap();

            let best = outcome
                .predictions
                .iter()
                .map(|p| p.probability)
                .fold(f64::NEG_INFINITY, f64::max);
            let first_best = outcome
                .predictions
                .iter()
                .find(|p| p.probability == best)
                .unwrap();
            assert_eq!(outcome.top_prediction, first_best.condition, "ids {:?}", ids);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_writes_nothing() {
        let (ctx, _tmp) = test_context().await;
        let input =
            PredictionInput::parse(Some(vec![1, 11]), Some(strings(&["Mild", "Mild"]))).unwrap();

        assert!(matches!(
            ctx.predict(&input).await,
            Err(Error::InvalidSymptomId(11))
        ));
        assert_eq!(ctx.db.get_stats().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn test_model_width_mismatch_is_prediction_failure() {
        let clf = FixedClassifier::new(&[("Flu", 0.6), ("Cold", 0.4)], 7);
        let (ctx, _tmp) = test_context_with(Arc::new(clf)).await;
        let input = PredictionInput::parse(Some(vec![1]), Some(strings(&["Mild"]))).unwrap();

        assert!(matches!(
            ctx.predict(&input).await,
            Err(Error::PredictionFailed(_))
        ));
        assert_eq!(ctx.db.get_stats().await.unwrap().record_count, 0);
    }

    #[tokio::test]
    async fn test_decrypt_missing_record() {
        let (ctx, _tmp) = test_context().await;
        assert!(matches!(
            ctx.decrypt_record(42).await,
            Err(Error::RecordNotFound(42))
        ));
    }
}
