use crate::cipher::SecretCipher;
use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use smarter_core::AccountNumber;
use smarter_store::{NewSecret, SecretRecord, SecretStore, StoreError};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

fn make_secret_key(account: &AccountNumber, name: &str) -> String {
    format!("{account}/{name}")
}

/// In-memory secret store.
///
/// Values are sealed by [`SecretCipher`] before they land in the map; the
/// plaintext exists only inside `create`/`update`/`reveal` call frames.
#[derive(Debug)]
pub struct InMemorySecretStore {
    data: Arc<PapayaHashMap<String, SecretRecord>>,
    cipher: SecretCipher,
}

impl InMemorySecretStore {
    pub fn new(cipher: SecretCipher) -> Self {
        Self {
            data: Arc::new(PapayaHashMap::new()),
            cipher,
        }
    }

    /// A store with a random throwaway key, for tests and ephemeral sessions.
    pub fn ephemeral() -> Self {
        Self::new(SecretCipher::new(SecretCipher::generate_key(), "ephemeral"))
    }

    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every secret record, for snapshotting. Values stay sealed.
    pub fn export(&self) -> Vec<SecretRecord> {
        let guard = self.data.pin();
        let mut secrets: Vec<SecretRecord> = guard.values().cloned().collect();
        secrets.sort_by(|a, b| a.name.cmp(&b.name));
        secrets
    }

    /// Bulk-load sealed secret records.
    pub fn import(&self, secrets: Vec<SecretRecord>) {
        let guard = self.data.pin();
        for secret in secrets {
            let key = make_secret_key(&secret.account, &secret.name);
            guard.insert(key, secret);
        }
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(
        &self,
        account: &AccountNumber,
        name: &str,
    ) -> Result<Option<SecretRecord>, StoreError> {
        let key = make_secret_key(account, name);
        let guard = self.data.pin();
        Ok(guard.get(&key).cloned())
    }

    async fn list(&self, account: &AccountNumber) -> Result<Vec<SecretRecord>, StoreError> {
        let prefix = format!("{account}/");
        let guard = self.data.pin();
        let mut secrets: Vec<SecretRecord> = guard
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, secret)| secret.clone())
            .collect();
        secrets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(secrets)
    }

    async fn create(&self, secret: NewSecret) -> Result<SecretRecord, StoreError> {
        let key = make_secret_key(&secret.account, &secret.name);
        let guard = self.data.pin();
        if guard.contains_key(&key) {
            return Err(StoreError::already_exists("Secret", secret.name));
        }
        let encrypted = self.cipher.encrypt(&secret.value)?;
        let now = OffsetDateTime::now_utc();
        let record = SecretRecord {
            id: Uuid::new_v4(),
            account: secret.account,
            name: secret.name,
            description: secret.description,
            encrypted,
            expires_at: secret.expires_at,
            created_at: now,
            updated_at: now,
            last_accessed: None,
        };
        debug!(%key, "creating secret");
        guard.insert(key, record.clone());
        Ok(record)
    }

    async fn update(&self, secret: NewSecret) -> Result<SecretRecord, StoreError> {
        let key = make_secret_key(&secret.account, &secret.name);
        let guard = self.data.pin();
        let existing = guard
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::secret_not_found(secret.name.clone()))?;
        let encrypted = self.cipher.encrypt(&secret.value)?;
        let record = SecretRecord {
            description: secret.description,
            encrypted,
            expires_at: secret.expires_at,
            updated_at: OffsetDateTime::now_utc(),
            ..existing
        };
        debug!(%key, "updating secret");
        guard.insert(key, record.clone());
        Ok(record)
    }

    async fn delete(&self, account: &AccountNumber, name: &str) -> Result<(), StoreError> {
        let key = make_secret_key(account, name);
        let guard = self.data.pin();
        if guard.remove(&key).is_none() {
            return Err(StoreError::secret_not_found(name));
        }
        debug!(%key, "deleted secret");
        Ok(())
    }

    async fn reveal(&self, secret: &SecretRecord) -> Result<String, StoreError> {
        let plaintext = self.cipher.decrypt(&secret.encrypted)?;
        // Stamp last_accessed on the stored copy.
        let key = make_secret_key(&secret.account, &secret.name);
        let guard = self.data.pin();
        if let Some(stored) = guard.get(&key) {
            let mut touched = stored.clone();
            touched.last_accessed = Some(OffsetDateTime::now_utc());
            guard.insert(key, touched);
        }
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountNumber {
        AccountNumber::new("1234-5678-9012").unwrap()
    }

    fn new_secret(name: &str, value: &str) -> NewSecret {
        NewSecret {
            account: account(),
            name: name.into(),
            value: value.into(),
            description: "test secret".into(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_seals_value() {
        let store = InMemorySecretStore::ephemeral();
        let record = store
            .create(new_secret("db-password", "hunter2"))
            .await
            .unwrap();
        assert_ne!(record.encrypted.ciphertext, "hunter2");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_reveal_roundtrip_and_touch() {
        let store = InMemorySecretStore::ephemeral();
        let record = store
            .create(new_secret("db-password", "hunter2"))
            .await
            .unwrap();
        assert!(record.last_accessed.is_none());

        let plaintext = store.reveal(&record).await.unwrap();
        assert_eq!(plaintext, "hunter2");

        let touched = store.get(&account(), "db-password").await.unwrap().unwrap();
        assert!(touched.last_accessed.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let store = InMemorySecretStore::ephemeral();
        store.create(new_secret("s", "one")).await.unwrap();
        let err = store.create(new_secret("s", "two")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_reseals() {
        let store = InMemorySecretStore::ephemeral();
        let first = store.create(new_secret("s", "one")).await.unwrap();
        let updated = store.update(new_secret("s", "two")).await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.created_at, first.created_at);
        assert_eq!(store.reveal(&updated).await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let store = InMemorySecretStore::ephemeral();
        let err = store.update(new_secret("ghost", "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::SecretNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let store = InMemorySecretStore::ephemeral();
        store.create(new_secret("a", "1")).await.unwrap();
        store.create(new_secret("b", "2")).await.unwrap();
        assert_eq!(store.list(&account()).await.unwrap().len(), 2);

        store.delete(&account(), "a").await.unwrap();
        assert_eq!(store.list(&account()).await.unwrap().len(), 1);

        let err = store.delete(&account(), "a").await.unwrap_err();
        assert!(matches!(err, StoreError::SecretNotFound(_)));
    }
}
