use thiserror::Error;

/// Errors raised by store backends.
///
/// Missing rows are reported as `Ok(None)` by lookups, not as errors; the
/// variants here describe infrastructure and contract failures. The broker
/// rewraps these into its uniform error envelope.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {kind}/{name}")]
    NotFound { kind: String, name: String },

    #[error("Record already exists: {kind}/{name}")]
    AlreadyExists { kind: String, name: String },

    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn already_exists(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn secret_not_found(name: impl Into<String>) -> Self {
        Self::SecretNotFound(name.into())
    }

    pub fn encryption(msg: impl Into<String>) -> Self {
        Self::Encryption(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Convenience result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
