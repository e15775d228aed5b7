use thiserror::Error;

/// Core error types for Smarter broker operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid resource kind: {0}")]
    InvalidKind(String),

    #[error("Invalid api version: {0}")]
    InvalidApiVersion(String),

    #[error("Invalid resource name: {0}")]
    InvalidName(String),

    #[error("Invalid account number: {0}")]
    InvalidAccountNumber(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),
}

impl CoreError {
    /// Create a new InvalidKind error
    pub fn invalid_kind(kind: impl Into<String>) -> Self {
        Self::InvalidKind(kind.into())
    }

    /// Create a new InvalidApiVersion error
    pub fn invalid_api_version(version: impl Into<String>) -> Self {
        Self::InvalidApiVersion(version.into())
    }

    /// Create a new InvalidName error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName(name.into())
    }

    /// Create a new InvalidAccountNumber error
    pub fn invalid_account_number(number: impl Into<String>) -> Self {
        Self::InvalidAccountNumber(number.into())
    }

    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(datetime: impl Into<String>) -> Self {
        Self::InvalidDateTime(datetime.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKind(_)
                | Self::InvalidApiVersion(_)
                | Self::InvalidName(_)
                | Self::InvalidAccountNumber(_)
                | Self::InvalidDateTime(_)
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
