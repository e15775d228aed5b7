use thiserror::Error;

/// One field-level rule violation, qualified by the field path
/// (`spec.config.expiration`, `metadata.name`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A manifest failed schema or business-rule validation.
///
/// Carries every violation found, each naming the offending field path and
/// the nature of the problem. Surfaced to the caller verbatim, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation::new(field, message)],
        }
    }

    pub fn field_paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

/// Accumulator used by the per-kind validators.
///
/// Collects violations instead of failing fast so one round trip reports
/// every broken field.
#[derive(Debug, Default)]
pub struct Violations {
    collected: Vec<FieldViolation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.collected.push(FieldViolation::new(field, message));
    }

    /// Record a violation unless `ok` holds.
    pub fn ensure(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.push(field, message);
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.collected.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.collected,
            })
        }
    }
}

/// Manifest ingestion failures: the source is missing, ambiguous, unreadable,
/// unparsable, or structurally incomplete.
///
/// Raised before any broker state is touched.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("No manifest source given (expected one of manifest text, file path, or url)")]
    MissingSource,

    #[error("Conflicting manifest sources given (expected exactly one)")]
    ConflictingSources,

    #[error("IO error reading manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error fetching manifest: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed manifest: {0}")]
    Parse(String),

    #[error("Missing required key {0}")]
    MissingKey(String),

    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    #[error("Unsupported apiVersion: {0}")]
    UnsupportedApiVersion(String),

    #[error("Manifest kind {found} does not match expected kind {expected}")]
    KindMismatch { expected: String, found: String },
}

impl LoaderError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_includes_path() {
        let err = ValidationError::single("spec.port", "must be in 1..=65535");
        assert_eq!(err.to_string(), "spec.port: must be in 1..=65535");
    }

    #[test]
    fn test_violations_collects_all() {
        let mut v = Violations::new();
        v.ensure(false, "spec.port", "must be in 1..=65535");
        v.ensure(true, "spec.hostname", "never recorded");
        v.push("spec.dbEngine", "unsupported engine");
        let err = v.finish().unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert_eq!(err.field_paths(), vec!["spec.port", "spec.dbEngine"]);
    }

    #[test]
    fn test_violations_empty_is_ok() {
        assert!(Violations::new().finish().is_ok());
    }

    #[test]
    fn test_loader_error_messages() {
        assert_eq!(
            LoaderError::missing_key("metadata.name").to_string(),
            "Missing required key metadata.name"
        );
        let err = LoaderError::KindMismatch {
            expected: "SqlConnection".into(),
            found: "Chatbot".into(),
        };
        assert!(err.to_string().contains("Chatbot"));
        assert!(err.to_string().contains("SqlConnection"));
    }
}
