//! SQLite schema definition

/// SQL schema for the prediction database
pub const SCHEMA_SQL: &str = r#"
-- Symptoms: reference data, ids are dense from 1 and index the feature vector
CREATE TABLE IF NOT EXISTS symptoms (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);

-- Conditions: reference data for the classifier's labels
CREATE TABLE IF NOT EXISTS conditions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    severity TEXT NOT NULL CHECK (severity IN ('Mild', 'Moderate', 'Severe'))
);

-- Patient symptom records: one per successful prediction, never updated
CREATE TABLE IF NOT EXISTS patient_symptoms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    encrypted_symptoms BLOB NOT NULL,
    prediction TEXT NOT NULL,
    timestamp TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Per-symptom severities reported with a record
CREATE TABLE IF NOT EXISTS patient_symptom_mapping (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_symptom_id INTEGER NOT NULL REFERENCES patient_symptoms(id),
    symptom_id INTEGER NOT NULL REFERENCES symptoms(id),
    severity TEXT NOT NULL CHECK (severity IN ('Mild', 'Moderate', 'Severe'))
);

CREATE INDEX IF NOT EXISTS idx_mapping_record ON patient_symptom_mapping(patient_symptom_id);
CREATE INDEX IF NOT EXISTS idx_mapping_symptom ON patient_symptom_mapping(symptom_id);
"#;

/// Reference symptoms, in id order
pub const SEED_SYMPTOMS: &[(&str, &str)] = &[
    ("Fever", "Elevated body temperature above 38°C"),
    ("Cough", "Persistent or occasional coughing"),
    ("Fatigue", "Extreme tiredness or lack of energy"),
    ("Headache", "Pain in the head or neck"),
    ("Nausea", "Feeling of sickness or urge to vomit"),
    ("Sore Throat", "Pain or irritation in the throat"),
    ("Shortness of Breath", "Difficulty breathing"),
    ("Muscle Pain", "Aches or soreness in muscles"),
    ("Chills", "Feeling cold with shivering"),
    ("Loss of Taste", "Inability to taste flavors"),
];

/// Reference conditions: (name, description, severity)
pub const SEED_CONDITIONS: &[(&str, &str, &str)] = &[
    (
        "Allergies",
        "Immune reaction to pollen, dust or other irritants",
        "Mild",
    ),
    ("Cold", "Viral infection of the upper respiratory tract", "Mild"),
    (
        "Flu",
        "Influenza virus infection with fever and body aches",
        "Moderate",
    ),
    (
        "Gastroenteritis",
        "Inflammation of the stomach and intestines",
        "Moderate",
    ),
    (
        "Migraine",
        "Recurrent severe headache, often with sensory disturbance",
        "Severe",
    ),
];
