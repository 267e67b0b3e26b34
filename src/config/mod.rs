//! Configuration management for symptom-checker
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Classifier artifact configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Encryption key configuration
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Log sink configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allowed CORS origins for `/api/*` ("*" allows any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Maximum pooled SQLite connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized classifier (relative paths resolve against the base dir)
    #[serde(default = "default_model_path")]
    pub path: String,
}

/// Encryption key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Environment variable holding the base64 AES-256 key
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Generate a throwaway key when the variable is unset.
    /// Records written under such a key cannot be decrypted after restart.
    #[serde(default = "default_allow_ephemeral_key")]
    pub allow_ephemeral_key: bool,
}

/// Log sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Optional file that receives a copy of every log line
    #[serde(default = "default_log_file")]
    pub file: Option<String>,

    /// Emit JSON log lines on stderr
    #[serde(default = "default_log_json")]
    pub json: bool,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for symptom-checker data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            key_env: default_key_env(),
            allow_ephemeral_key: default_allow_ephemeral_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            json: default_log_json(),
        }
    }
}

impl Config {
    /// Get the default base directory (~/.symptom-checker)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".symptom-checker")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Resolve a `--config` argument into `(base_dir, config_file)`.
    ///
    /// An existing file or a `.toml` path names the config file; any other
    /// path is a directory holding `config.toml`.
    pub fn resolve_location(path: Option<&Path>) -> (PathBuf, PathBuf) {
        match path {
            Some(p) if p.is_file() || p.extension().is_some_and(|e| e == "toml") => {
                let base = p
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                (base, p.to_path_buf())
            }
            Some(dir) => (dir.to_path_buf(), dir.join("config.toml")),
            None => (Self::default_base_dir(), Self::default_config_path()),
        }
    }

    fn paths_for(base: PathBuf, config_file: PathBuf) -> PathsConfig {
        let db_file = std::env::var(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join(DB_FILE_NAME));
        PathsConfig {
            base_dir: base,
            config_file,
            db_file,
        }
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = Self::paths_for(base.clone(), base.join("config.toml"));
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = Self::paths_for(base, config_path.to_path_buf());

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Resolved classifier artifact path
    pub fn model_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.model.path);
        if path.is_absolute() {
            path
        } else {
            self.paths.base_dir.join(path)
        }
    }

    /// Resolved log file path, if file logging is enabled
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging.file.as_ref().map(|f| {
            let path = PathBuf::from(f);
            if path.is_absolute() {
                path
            } else {
                self.paths.base_dir.join(path)
            }
        })
    }

    /// Parsed bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| Error::Config(format!("server.bind '{}': {}", self.server.bind, e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.model.path.trim().is_empty() {
            return Err(Error::Config("model.path must not be empty".to_string()));
        }

        if self.crypto.key_env.trim().is_empty() {
            return Err(Error::Config("crypto.key_env must not be empty".to_string()));
        }

        if self.server.cors_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(Error::Config(
                "server.cors_origins must not contain empty entries".to_string(),
            ));
        }

        Ok(())
    }
}
