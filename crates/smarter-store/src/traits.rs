//! Store traits the broker reconciles against.
//!
//! All implementations must be thread-safe (`Send + Sync`). Missing rows are
//! `Ok(None)`; errors are reserved for infrastructure failures.

use async_trait::async_trait;
use smarter_core::{AccountNumber, ManifestKind};

use crate::error::StoreError;
use crate::types::{NewRecord, NewSecret, RecordFilter, SecretRecord, StoredRecord};

/// The persisted-record store: one row per resource instance, keyed by
/// `(account, kind, name)`.
///
/// # Example
///
/// ```ignore
/// use smarter_store::{RecordStore, StoreError, StoredRecord};
///
/// async fn lookup(store: &dyn RecordStore) -> Result<StoredRecord, StoreError> {
///     store
///         .get(&account, ManifestKind::SqlConnection, "my-db")
///         .await?
///         .ok_or_else(|| StoreError::not_found("SqlConnection", "my-db"))
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up one record by its scope and name.
    ///
    /// Returns `None` if no record exists; errors are infrastructure-only.
    async fn get(
        &self,
        account: &AccountNumber,
        kind: ManifestKind,
        name: &str,
    ) -> Result<Option<StoredRecord>, StoreError>;

    /// All records of a kind within the account's scope, refined by `filter`.
    async fn filter(
        &self,
        account: &AccountNumber,
        kind: ManifestKind,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredRecord>, StoreError>;

    /// Create a new record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if `(account, kind, name)` is
    /// already taken.
    async fn create(&self, record: NewRecord) -> Result<StoredRecord, StoreError>;

    /// Persist updated fields for an existing record. The backend refreshes
    /// `updated_at` and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record does not exist.
    async fn save(&self, record: &StoredRecord) -> Result<StoredRecord, StoreError>;

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record does not exist.
    async fn delete(
        &self,
        account: &AccountNumber,
        kind: ManifestKind,
        name: &str,
    ) -> Result<(), StoreError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// The secret store: tenant-scoped named secrets, encrypted at rest.
///
/// The broker never sees an encryption key; `reveal` is the only path back to
/// a plaintext and exists for the connection-building collaborators, not for
/// document rendering.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Look up a secret by name within the account's scope.
    async fn get(
        &self,
        account: &AccountNumber,
        name: &str,
    ) -> Result<Option<SecretRecord>, StoreError>;

    /// All secrets within the account's scope.
    async fn list(&self, account: &AccountNumber) -> Result<Vec<SecretRecord>, StoreError>;

    /// Encrypt and store a new secret.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the name is taken, and
    /// `StoreError::Encryption` if the value cannot be sealed.
    async fn create(&self, secret: NewSecret) -> Result<SecretRecord, StoreError>;

    /// Re-encrypt an existing secret with a new value and/or metadata.
    async fn update(&self, secret: NewSecret) -> Result<SecretRecord, StoreError>;

    /// Remove a secret.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SecretNotFound` if the secret does not exist.
    async fn delete(&self, account: &AccountNumber, name: &str) -> Result<(), StoreError>;

    /// Decrypt a secret's value and stamp `last_accessed`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Encryption` on key or ciphertext mismatch.
    async fn reveal(&self, secret: &SecretRecord) -> Result<String, StoreError>;
}

// Ensure traits are object-safe by using them as trait objects
#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that RecordStore is object-safe
    fn _assert_record_store_object_safe(_: &dyn RecordStore) {}

    // Compile-time test that SecretStore is object-safe
    fn _assert_secret_store_object_safe(_: &dyn SecretStore) {}
}
