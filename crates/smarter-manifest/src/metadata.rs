use crate::error::{ValidationError, Violations};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smarter_core::validate_name;

/// Shared metadata block carried by every manifest.
///
/// `name` is the tenant-unique identity of the resource and the only field
/// that survives unchanged across the document and persisted-record
/// representations. Everything else may be freely updated by `apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManifestMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Map<String, Value>>,
}

impl ManifestMetadata {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            tags: Vec::new(),
            annotations: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn validate(&self, violations: &mut Violations) {
        if let Err(e) = validate_name(&self.name) {
            violations.push("metadata.name", e.to_string());
        }
        if semver::Version::parse(&self.version).is_err() {
            violations.push(
                "metadata.version",
                format!("'{}' is not a valid semantic version", self.version),
            );
        }
        for tag in &self.tags {
            if tag.trim().is_empty() {
                violations.push("metadata.tags", "tags must not be blank");
                break;
            }
        }
    }
}

/// Standalone validation entry point used by tests and the loader.
pub fn validate_metadata(metadata: &ManifestMetadata) -> Result<(), ValidationError> {
    let mut violations = Violations::new();
    metadata.validate(&mut violations);
    violations.finish()
}
