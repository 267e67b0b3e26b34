//! Default values for configuration

/// Default HTTP bind address
pub fn default_bind() -> String {
    std::env::var("SYMPTOM_CHECKER_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string())
}

/// Default CORS origins (any)
pub fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Default SQLite pool size
pub fn default_max_connections() -> u32 {
    5
}

/// Default classifier artifact file name, relative to the base directory
pub fn default_model_path() -> String {
    "model.json".to_string()
}

/// Default environment variable holding the encryption key
pub fn default_key_env() -> String {
    "SYMPTOM_CHECKER_ENCRYPTION_KEY".to_string()
}

/// Default: refuse to start without a persistent key
pub fn default_allow_ephemeral_key() -> bool {
    false
}

/// Default: log to stderr only
pub fn default_log_file() -> Option<String> {
    None
}

/// Default: human-readable log lines
pub fn default_log_json() -> bool {
    false
}

/// Default database file name inside the base directory
pub const DB_FILE_NAME: &str = "symptoms.db";

/// Environment variable overriding the database file path
pub const DB_PATH_ENV: &str = "SYMPTOM_CHECKER_DB";
