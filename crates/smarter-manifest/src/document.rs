use crate::error::{ValidationError, Violations};
use crate::kinds::{
    ChatbotManifest, SecretManifest, SqlConnectionManifest, SqlPluginManifest,
    StaticPluginManifest,
};
use crate::metadata::ManifestMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smarter_core::{ApiVersion, ManifestKind};

/// The canonical in-memory representation of one manifest.
///
/// Internally tagged by `kind`, so the wire form is the flat
/// `apiVersion`/`kind`/`metadata`/`spec`/`status` document. A document is
/// transient: it is built per request from loader output or projected from a
/// persisted record, and is never itself persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind")]
pub enum ManifestDocument {
    SqlConnection(SqlConnectionManifest),
    StaticPlugin(StaticPluginManifest),
    SqlPlugin(SqlPluginManifest),
    Chatbot(ChatbotManifest),
    Secret(SecretManifest),
}

impl ManifestDocument {
    pub fn kind(&self) -> ManifestKind {
        match self {
            ManifestDocument::SqlConnection(_) => ManifestKind::SqlConnection,
            ManifestDocument::StaticPlugin(_) => ManifestKind::StaticPlugin,
            ManifestDocument::SqlPlugin(_) => ManifestKind::SqlPlugin,
            ManifestDocument::Chatbot(_) => ManifestKind::Chatbot,
            ManifestDocument::Secret(_) => ManifestKind::Secret,
        }
    }

    pub fn api_version(&self) -> ApiVersion {
        match self {
            ManifestDocument::SqlConnection(m) => m.api_version,
            ManifestDocument::StaticPlugin(m) => m.api_version,
            ManifestDocument::SqlPlugin(m) => m.api_version,
            ManifestDocument::Chatbot(m) => m.api_version,
            ManifestDocument::Secret(m) => m.api_version,
        }
    }

    pub fn metadata(&self) -> &ManifestMetadata {
        match self {
            ManifestDocument::SqlConnection(m) => &m.metadata,
            ManifestDocument::StaticPlugin(m) => &m.metadata,
            ManifestDocument::SqlPlugin(m) => &m.metadata,
            ManifestDocument::Chatbot(m) => &m.metadata,
            ManifestDocument::Secret(m) => &m.metadata,
        }
    }

    /// The tenant-unique identity of the resource.
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Run every schema business rule. Violations are field-path qualified.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new();
        self.metadata().validate(&mut violations);
        match self {
            ManifestDocument::SqlConnection(m) => m.spec.validate(&mut violations),
            ManifestDocument::StaticPlugin(m) => m.spec.validate(&mut violations),
            ManifestDocument::SqlPlugin(m) => m.spec.validate(&mut violations),
            ManifestDocument::Chatbot(m) => m.spec.validate(&mut violations),
            ManifestDocument::Secret(m) => m.spec.validate(&mut violations),
        }
        violations.finish()
    }

    /// Whether a server-populated status block is present.
    pub fn has_status(&self) -> bool {
        match self {
            ManifestDocument::SqlConnection(m) => m.status.is_some(),
            ManifestDocument::StaticPlugin(m) => m.status.is_some(),
            ManifestDocument::SqlPlugin(m) => m.status.is_some(),
            ManifestDocument::Chatbot(m) => m.status.is_some(),
            ManifestDocument::Secret(m) => m.status.is_some(),
        }
    }

    /// Drop any client-supplied status. Status is always recomputed from the
    /// persisted record; it never participates in apply-time writes.
    pub fn strip_status(&mut self) {
        match self {
            ManifestDocument::SqlConnection(m) => m.status = None,
            ManifestDocument::StaticPlugin(m) => m.status = None,
            ManifestDocument::SqlPlugin(m) => m.status = None,
            ManifestDocument::Chatbot(m) => m.status = None,
            ManifestDocument::Secret(m) => m.status = None,
        }
    }

    /// The spec block as wire-form JSON (camelCase keys).
    pub fn spec_value(&self) -> Result<Value, ValidationError> {
        let result = match self {
            ManifestDocument::SqlConnection(m) => serde_json::to_value(&m.spec),
            ManifestDocument::StaticPlugin(m) => serde_json::to_value(&m.spec),
            ManifestDocument::SqlPlugin(m) => serde_json::to_value(&m.spec),
            ManifestDocument::Chatbot(m) => serde_json::to_value(&m.spec),
            ManifestDocument::Secret(m) => serde_json::to_value(&m.spec),
        };
        result.map_err(|e| ValidationError::single("spec", e.to_string()))
    }

    /// Serialize the full document to wire-form JSON.
    pub fn to_value(&self) -> Result<Value, ValidationError> {
        serde_json::to_value(self).map_err(|e| ValidationError::single("document", e.to_string()))
    }

    /// Parse a document from wire-form JSON. Schema mismatches surface as
    /// validation errors; business rules are NOT run here (see [`validate`]).
    ///
    /// [`validate`]: ManifestDocument::validate
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value)
            .map_err(|e| ValidationError::single("document", e.to_string()))
    }

    /// Assemble a document from its parts, as the record projection does.
    pub fn from_parts(
        kind: ManifestKind,
        metadata: &ManifestMetadata,
        spec: Value,
        status: Option<Value>,
    ) -> Result<Self, ValidationError> {
        let metadata_value = serde_json::to_value(metadata)
            .map_err(|e| ValidationError::single("metadata", e.to_string()))?;
        let mut document = serde_json::Map::new();
        document.insert(
            "apiVersion".to_string(),
            Value::String(ApiVersion::default().to_string()),
        );
        document.insert("kind".to_string(), Value::String(kind.to_string()));
        document.insert("metadata".to_string(), metadata_value);
        document.insert("spec".to_string(), spec);
        if let Some(status) = status {
            document.insert("status".to_string(), status);
        }
        Self::from_value(Value::Object(document))
    }

    /// The example manifest text for a kind, used by the `example_manifest`
    /// command and CLI scaffolding.
    pub fn example_text(kind: ManifestKind) -> &'static str {
        match kind {
            ManifestKind::SqlConnection => crate::kinds::sql_connection::EXAMPLE,
            ManifestKind::StaticPlugin => crate::kinds::static_plugin::EXAMPLE,
            ManifestKind::SqlPlugin => crate::kinds::sql_plugin::EXAMPLE,
            ManifestKind::Chatbot => crate::kinds::chatbot::EXAMPLE,
            ManifestKind::Secret => crate::kinds::secret::EXAMPLE,
        }
    }
}
