//! Feature encoding
//!
//! Maps submitted symptom ids onto a fixed-width presence vector, one slot
//! per known symptom. Slot `id - 1` holds symptom `id`.

use crate::error::{Error, Result};

/// Binary presence vector over all known symptoms
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw feature values without range checks
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots set to 1
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|v| **v > 0.0).count()
    }
}

/// Encode symptom ids against a universe of `symptom_count` known symptoms.
///
/// Duplicate ids set the same slot and have no further effect. The first id
/// outside `[1, symptom_count]` is reported.
pub fn encode_symptoms(symptom_ids: &[i64], symptom_count: usize) -> Result<FeatureVector> {
    if symptom_ids.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut values = vec![0.0; symptom_count];
    for &sid in symptom_ids {
        if sid < 1 || sid as u64 > symptom_count as u64 {
            return Err(Error::InvalidSymptomId(sid));
        }
        values[(sid - 1) as usize] = 1.0;
    }

    Ok(FeatureVector { values })
}
