//! The reconciliation engine.
//!
//! A broker reconciles a declarative manifest against persisted state and
//! exposes the uniform command protocol (`apply`, `get`, `describe`,
//! `delete`, `deploy`, `undeploy`, `logs`, `chat`, `schema`,
//! `example_manifest`) consumed identically by the CLI and REST front-ends.
//! Every kind implements the core [`ResourceBroker`] surface; optional
//! behavior lives behind the capability traits ([`Deployable`], [`Chattable`],
//! [`LogEmitting`]) and is probed by the dispatcher rather than
//! invoked-and-caught.

pub mod base;
pub mod brokers;
pub mod command;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod mapping;
pub mod secrets;

pub use base::{
    BrokerCore, BrokerRequest, BrokerStores, Chattable, Deployable, GetQuery, LogEmitting,
    ManifestSource, ResourceBroker,
};
pub use brokers::{
    ChatbotBroker, SecretBroker, SqlConnectionBroker, SqlPluginBroker, StaticPluginBroker,
};
pub use command::Command;
pub use context::BrokerContext;
pub use dispatch::{CommandArgs, broker_for_kind, dispatch};
pub use envelope::{CommandResponse, ErrorDetail, ResponseMetadata};
pub use error::{BrokerError, Result};
pub use mapping::{FieldMap, FieldSpec};
pub use secrets::get_or_create_secret;
