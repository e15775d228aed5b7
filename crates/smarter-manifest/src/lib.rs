//! Typed manifest documents and the manifest loader.
//!
//! A manifest is a declarative YAML/JSON document
//! (`apiVersion`/`kind`/`metadata`/`spec`/`status`) describing the desired
//! state of one resource. This crate owns the typed representation of every
//! supported kind, the structural loader that ingests raw text, and the JSON
//! Schema surface exposed through the `schema` command.

pub mod document;
pub mod error;
pub mod kinds;
pub mod loader;
pub mod metadata;
pub mod schema;
pub mod secret_binding;

pub use document::ManifestDocument;
pub use error::{FieldViolation, LoaderError, ValidationError, Violations};
pub use loader::{LoaderSources, ManifestLoader};
pub use metadata::ManifestMetadata;
pub use schema::schema_for_kind;
pub use secret_binding::{InlineSecret, SecretBinding};
