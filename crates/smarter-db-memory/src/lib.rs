//! In-memory store backend.
//!
//! Backs the broker's store contracts with lock-free concurrent maps, an
//! AES-256-GCM cipher for secrets at rest, and an optional JSON snapshot so
//! command-line sessions keep state between invocations.

pub mod cipher;
pub mod secrets;
pub mod snapshot;
pub mod storage;

pub use cipher::SecretCipher;
pub use secrets::InMemorySecretStore;
pub use snapshot::StoreSnapshot;
pub use storage::InMemoryRecordStore;
