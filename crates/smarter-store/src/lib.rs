//! Store contracts for the Smarter manifest broker.
//!
//! The broker consumes a persisted-record store and a secret store as
//! external collaborators. This crate defines those contracts; backends live
//! in their own crates (`smarter-db-memory` ships the in-memory one).

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, StoreError};
pub use traits::{RecordStore, SecretStore};
pub use types::{EncryptedValue, NewRecord, NewSecret, RecordFilter, SecretRecord, StoredRecord};
