use crate::command::Command;
use smarter_core::ManifestKind;
use smarter_manifest::{LoaderError, ValidationError};
use smarter_store::StoreError;
use thiserror::Error;

/// Broker-level error taxonomy.
///
/// Validation and loader errors pass through verbatim; store failures are
/// wrapped with their cause preserved. `NotReady` ("nothing to operate on
/// yet") is distinct from `NotFound` ("the named resource does not exist")
/// and both are distinct from hard failures.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("{kind} broker is not ready: {detail}")]
    NotReady { kind: ManifestKind, detail: String },

    #[error("{kind} {name} not found")]
    NotFound { kind: ManifestKind, name: String },

    #[error("{command} is not implemented for kind {kind}")]
    NotImplemented { kind: ManifestKind, command: Command },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Cannot resolve secret '{name}': no value supplied and no secret registered under that name")]
    UnresolvedSecret { name: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error("Storage failure: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("Internal broker failure: {0}")]
    Internal(String),
}

impl BrokerError {
    pub fn not_ready(kind: ManifestKind, detail: impl Into<String>) -> Self {
        Self::NotReady {
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found(kind: ManifestKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn not_implemented(kind: ManifestKind, command: Command) -> Self {
        Self::NotImplemented { kind, command }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP-equivalent status for the uniform error envelope.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotReady { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::NotImplemented { .. } => 501,
            Self::PermissionDenied(_) => 403,
            Self::UnresolvedSecret { .. } => 400,
            Self::Validation(_) => 422,
            Self::Loader(_) => 400,
            Self::Store { .. } => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Typed class name carried in the error envelope.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::NotReady { .. } => "BrokerErrorNotReady",
            Self::NotFound { .. } => "BrokerErrorNotFound",
            Self::NotImplemented { .. } => "BrokerErrorNotImplemented",
            Self::PermissionDenied(_) => "BrokerErrorPermissionDenied",
            Self::UnresolvedSecret { .. } => "BrokerError",
            Self::Validation(_) => "ValidationError",
            Self::Loader(_) => "LoaderError",
            Self::Store { .. } => "BrokerError",
            Self::Internal(_) => "BrokerError",
        }
    }
}

/// Convenience result type for broker operations
pub type Result<T> = std::result::Result<T, BrokerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BrokerError::not_ready(ManifestKind::SqlConnection, "no manifest").status(),
            400
        );
        assert_eq!(
            BrokerError::not_found(ManifestKind::SqlConnection, "my-db").status(),
            404
        );
        assert_eq!(
            BrokerError::not_implemented(ManifestKind::SqlConnection, Command::Chat).status(),
            501
        );
        assert_eq!(BrokerError::permission_denied("staff only").status(), 403);
        let validation: BrokerError = ValidationError::single("spec.port", "bad").into();
        assert_eq!(validation.status(), 422);
        let loader: BrokerError = LoaderError::MissingSource.into();
        assert_eq!(loader.status(), 400);
    }

    #[test]
    fn test_error_class_names() {
        let err = BrokerError::not_ready(ManifestKind::Chatbot, "x");
        assert_eq!(err.error_class(), "BrokerErrorNotReady");
        let err: BrokerError = ValidationError::single("spec.port", "bad").into();
        assert_eq!(err.error_class(), "ValidationError");
        let err: BrokerError = StoreError::backend("disk on fire").into();
        assert_eq!(err.error_class(), "BrokerError");
    }

    #[test]
    fn test_store_error_cause_preserved() {
        let err: BrokerError = StoreError::backend("disk on fire").into();
        assert!(err.to_string().contains("disk on fire"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_not_implemented_message() {
        let err = BrokerError::not_implemented(ManifestKind::SqlConnection, Command::Chat);
        assert_eq!(
            err.to_string(),
            "chat is not implemented for kind SqlConnection"
        );
    }
}
