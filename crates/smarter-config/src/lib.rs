//! Runtime settings.
//!
//! Layered configuration: built-in defaults, an optional TOML file, then
//! `SMARTER_*` environment variables (double-underscore section separator,
//! e.g. `SMARTER_STORAGE__SNAPSHOT_PATH`). Commands are single-shot, so
//! settings are read once at startup; there is no watcher machinery.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_account() -> String {
    "0000-0000-0000".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_role() -> String {
    "admin".to_string()
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_key_id() -> String {
    "primary".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageSettings {
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Where the CLI's JSON snapshot lives. None means ephemeral state.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EncryptionSettings {
    /// Hex- or base64-encoded 32-byte key. None means a random per-process key.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_key_id")]
    pub key_id: String,
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            key: None,
            key_id: default_key_id(),
        }
    }
}

/// Top-level settings consumed by the CLI front-end.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Tenant account commands run under.
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_username")]
    pub username: String,
    /// One of `admin`, `staff`, `customer`.
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub encryption: EncryptionSettings,
    /// tracing-subscriber EnvFilter directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            account: default_account(),
            username: default_username(),
            role: default_role(),
            storage: StorageSettings::default(),
            encryption: EncryptionSettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings: defaults <- optional file <- `SMARTER_*` environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        // Pick up a local .env before reading the environment.
        dotenvy::dotenv().ok();
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }
        let loaded = builder
            .add_source(
                config::Environment::with_prefix("SMARTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let settings: Settings = loaded.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let account_ok = self.account.len() == 14
            && self
                .account
                .chars()
                .enumerate()
                .all(|(i, c)| if i == 4 || i == 9 { c == '-' } else { c.is_ascii_digit() });
        if !account_ok {
            return Err(ConfigError::validation(format!(
                "account '{}' must match ####-####-####",
                self.account
            )));
        }
        if !matches!(self.role.as_str(), "admin" | "staff" | "customer") {
            return Err(ConfigError::validation(format!(
                "role '{}' must be one of admin, staff, customer",
                self.role
            )));
        }
        if self.storage.backend != "memory" {
            return Err(ConfigError::validation(format!(
                "unknown storage backend '{}'",
                self.storage.backend
            )));
        }
        Ok(())
    }
}
