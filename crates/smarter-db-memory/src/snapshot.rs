//! JSON snapshot of the in-memory stores.
//!
//! The CLI front-end runs one command per process; the snapshot is what makes
//! `apply` followed by `get` in a later invocation see the same records.
//! Secret values stay sealed in the snapshot file.

use crate::{InMemoryRecordStore, InMemorySecretStore};
use serde::{Deserialize, Serialize};
use smarter_store::{SecretRecord, StoreError, StoredRecord};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub records: Vec<StoredRecord>,
    #[serde(default)]
    pub secrets: Vec<SecretRecord>,
}

impl StoreSnapshot {
    /// Capture the current state of both stores.
    pub fn capture(records: &InMemoryRecordStore, secrets: &InMemorySecretStore) -> Self {
        Self {
            records: records.export(),
            secrets: secrets.export(),
        }
    }

    /// Restore the snapshot into both stores.
    pub fn restore(self, records: &InMemoryRecordStore, secrets: &InMemorySecretStore) {
        records.import(self.records);
        secrets.import(self.secrets);
    }

    /// Read a snapshot from disk. A missing file yields an empty snapshot.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot found, starting empty");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::backend(format!("read snapshot {}: {e}", path.display())))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the snapshot to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::backend(format!("create {}: {e}", parent.display()))
            })?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .map_err(|e| StoreError::backend(format!("write snapshot {}: {e}", path.display())))?;
        debug!(path = %path.display(), records = self.records.len(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarter_core::{AccountNumber, ManifestKind};
    use smarter_store::{NewRecord, NewSecret, RecordStore, SecretStore};

    fn account() -> AccountNumber {
        AccountNumber::new("1234-5678-9012").unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_via_disk() {
        let records = InMemoryRecordStore::new();
        let secrets = InMemorySecretStore::ephemeral();
        records
            .create(NewRecord {
                account: account(),
                kind: ManifestKind::SqlConnection,
                name: "my-db".into(),
                fields: serde_json::Map::new(),
            })
            .await
            .unwrap();
        secrets
            .create(NewSecret {
                account: account(),
                name: "db-password".into(),
                value: "hunter2".into(),
                description: String::new(),
                expires_at: None,
            })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        StoreSnapshot::capture(&records, &secrets).save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("hunter2"), "snapshot must not leak plaintext");

        let restored_records = InMemoryRecordStore::new();
        let restored_secrets = InMemorySecretStore::ephemeral();
        StoreSnapshot::load(&path)
            .unwrap()
            .restore(&restored_records, &restored_secrets);
        assert_eq!(restored_records.len(), 1);
        assert_eq!(restored_secrets.len(), 1);
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        let snapshot = StoreSnapshot::load(Path::new("/nonexistent/state.json")).unwrap();
        assert!(snapshot.records.is_empty());
        assert!(snapshot.secrets.is_empty());
    }
}
