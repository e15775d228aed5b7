use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use smarter_core::{AccountNumber, ManifestKind};
use smarter_store::{NewRecord, RecordFilter, RecordStore, StoreError, StoredRecord};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

pub type StorageKey = String; // Format: "account/Kind/name"

pub(crate) fn make_storage_key(account: &AccountNumber, kind: ManifestKind, name: &str) -> StorageKey {
    format!("{account}/{kind}/{name}")
}

/// In-memory record store using a papaya lock-free HashMap.
///
/// One entry per resource instance, keyed `account/Kind/name`. Commands are
/// single-shot lookups and writes; there is no cross-command transaction.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    pub(crate) data: Arc<PapayaHashMap<StorageKey, StoredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(PapayaHashMap::new()),
        }
    }

    /// Number of records held, across all accounts and kinds.
    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record, for snapshotting.
    pub fn export(&self) -> Vec<StoredRecord> {
        let guard = self.data.pin();
        let mut records: Vec<StoredRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Bulk-load records, replacing any existing entry with the same key.
    pub fn import(&self, records: Vec<StoredRecord>) {
        let guard = self.data.pin();
        for record in records {
            let key = make_storage_key(&record.account, record.kind, &record.name);
            guard.insert(key, record);
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(
        &self,
        account: &AccountNumber,
        kind: ManifestKind,
        name: &str,
    ) -> Result<Option<StoredRecord>, StoreError> {
        let key = make_storage_key(account, kind, name);
        let guard = self.data.pin();
        Ok(guard.get(&key).cloned())
    }

    async fn filter(
        &self,
        account: &AccountNumber,
        kind: ManifestKind,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let prefix = format!("{account}/{kind}/");
        let guard = self.data.pin();
        let mut matched: Vec<StoredRecord> = guard
            .iter()
            .filter(|(key, record)| key.starts_with(&prefix) && filter.matches(record))
            .map(|(_, record)| record.clone())
            .collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }

    async fn create(&self, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let key = make_storage_key(&record.account, record.kind, &record.name);
        let guard = self.data.pin();
        if guard.contains_key(&key) {
            return Err(StoreError::already_exists(
                record.kind.to_string(),
                record.name,
            ));
        }
        let now = OffsetDateTime::now_utc();
        let stored = StoredRecord {
            id: Uuid::new_v4(),
            account: record.account,
            kind: record.kind,
            name: record.name,
            fields: record.fields,
            created_at: now,
            updated_at: now,
        };
        debug!(%key, "creating record");
        guard.insert(key, stored.clone());
        Ok(stored)
    }

    async fn save(&self, record: &StoredRecord) -> Result<StoredRecord, StoreError> {
        let key = make_storage_key(&record.account, record.kind, &record.name);
        let guard = self.data.pin();
        if !guard.contains_key(&key) {
            return Err(StoreError::not_found(
                record.kind.to_string(),
                record.name.clone(),
            ));
        }
        let mut updated = record.clone();
        updated.updated_at = OffsetDateTime::now_utc();
        debug!(%key, "saving record");
        guard.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete(
        &self,
        account: &AccountNumber,
        kind: ManifestKind,
        name: &str,
    ) -> Result<(), StoreError> {
        let key = make_storage_key(account, kind, name);
        let guard = self.data.pin();
        if guard.remove(&key).is_none() {
            return Err(StoreError::not_found(kind.to_string(), name));
        }
        debug!(%key, "deleted record");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
