//! Record types shared by every store backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smarter_core::{AccountNumber, ManifestKind};
use time::OffsetDateTime;
use uuid::Uuid;

/// One persisted resource instance, scoped by tenant account and unique by
/// `name` within that scope.
///
/// `fields` is the flat snake_case projection of the manifest's spec plus the
/// mutable metadata fields (`description`, `version`, `tags`). Secret-bearing
/// fields hold the referenced secret's name, never a plaintext value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub account: AccountNumber,
    pub kind: ManifestKind,
    pub name: String,
    pub fields: Map<String, Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl StoredRecord {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Tags recorded from `metadata.tags`, used by tag filters.
    pub fn tags(&self) -> Vec<&str> {
        self.fields
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|tags| tags.iter().filter_map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Payload for creating a record; the backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub account: AccountNumber,
    pub kind: ManifestKind,
    pub name: String,
    pub fields: Map<String, Value>,
}

/// Query refinement for `RecordStore::filter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Exact-name match.
    pub name: Option<String>,
    /// Keep records carrying at least one of these tags.
    pub tags: Option<Vec<String>>,
}

impl RecordFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    /// Whether a record passes this filter.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        if let Some(name) = &self.name {
            if record.name != *name {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            let record_tags = record.tags();
            if !tags.iter().any(|t| record_tags.contains(&t.as_str())) {
                return false;
            }
        }
        true
    }
}

/// An encrypted secret payload as held at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    /// Base64-encoded ciphertext
    pub ciphertext: String,
    /// Base64-encoded nonce
    pub nonce: String,
    /// Key identifier for key rotation support
    pub key_id: String,
}

/// One tenant-scoped secret. The plaintext exists only transiently inside
/// `SecretStore::reveal`; it is never part of this record's serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: Uuid,
    pub account: AccountNumber,
    pub name: String,
    pub description: String,
    pub encrypted: EncryptedValue,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_accessed: Option<OffsetDateTime>,
}

/// Payload for registering a secret; the backend encrypts `value`.
#[derive(Clone)]
pub struct NewSecret {
    pub account: AccountNumber,
    pub name: String,
    pub value: String,
    pub description: String,
    pub expires_at: Option<OffsetDateTime>,
}

impl std::fmt::Debug for NewSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewSecret")
            .field("account", &self.account)
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("description", &self.description)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
