//! The broker engine shared by every resource kind.
//!
//! Concrete brokers supply the kind tag, the field-mapping table, and any
//! computed status fields; the apply/get/describe/delete machinery is
//! implemented once here as provided trait methods driven by those tables.

use crate::command::Command;
use crate::context::BrokerContext;
use crate::envelope::CommandResponse;
use crate::error::BrokerError;
use crate::mapping::FieldMap;
use crate::secrets::get_or_create_secret;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use smarter_core::{ManifestKind, SmarterDateTime};
use smarter_manifest::{
    LoaderSources, ManifestDocument, ManifestLoader, ManifestMetadata, SecretBinding,
    schema_for_kind,
};
use smarter_store::{NewRecord, RecordFilter, RecordStore, SecretStore, StoredRecord};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info};

/// The store handles a broker operates against.
#[derive(Clone)]
pub struct BrokerStores {
    pub records: Arc<dyn RecordStore>,
    pub secrets: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for BrokerStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerStores")
            .field("records", &self.records.backend_name())
            .finish()
    }
}

/// Where the broker's document came from, decided once at construction.
///
/// `Unresolved` means neither a manifest nor a persisted record is available;
/// read commands fail with `NotReady` in that state.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestSource {
    Unresolved,
    FromLoader(ManifestDocument),
    FromRecord(ManifestDocument),
}

impl ManifestSource {
    pub fn document(&self) -> Option<&ManifestDocument> {
        match self {
            ManifestSource::Unresolved => None,
            ManifestSource::FromLoader(doc) | ManifestSource::FromRecord(doc) => Some(doc),
        }
    }

    pub fn is_from_loader(&self) -> bool {
        matches!(self, ManifestSource::FromLoader(_))
    }
}

/// What an inbound command carries: optionally a manifest source, optionally
/// a resource name.
#[derive(Debug, Clone, Default)]
pub struct BrokerRequest {
    /// Inline manifest text (YAML or JSON).
    pub manifest: Option<String>,
    /// Path to a manifest file.
    pub file_path: Option<PathBuf>,
    /// Remote manifest location.
    pub url: Option<url::Url>,
    /// Resource name, for commands addressing an existing resource.
    pub name: Option<String>,
}

impl BrokerRequest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_manifest(text: impl Into<String>) -> Self {
        Self {
            manifest: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn loader_sources(&self) -> Option<LoaderSources> {
        if self.manifest.is_none() && self.file_path.is_none() && self.url.is_none() {
            return None;
        }
        Some(LoaderSources {
            manifest: self.manifest.clone(),
            file_path: self.file_path.clone(),
            url: self.url.clone(),
        })
    }
}

/// Query parameters for the `get` command.
#[derive(Debug, Clone, Default)]
pub struct GetQuery {
    pub name: Option<String>,
    pub all: bool,
    pub tags: Option<Vec<String>>,
}

impl GetQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn all_objects() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }
}

/// Per-request broker state: tenant context, store handles, the resolved
/// document source, and the located record if one exists.
///
/// A core is built fresh for each inbound command and never shared across
/// requests.
#[derive(Debug, Clone)]
pub struct BrokerCore {
    pub context: BrokerContext,
    pub stores: BrokerStores,
    pub name: Option<String>,
    pub source: ManifestSource,
    pub record: Option<StoredRecord>,
}

impl BrokerCore {
    /// Bind the loader (if a manifest source was supplied) and locate the
    /// persisted record. Loader failures surface here, before any command
    /// runs; record projection happens in `ResourceBroker::finish_resolve`.
    pub async fn resolve(
        kind: ManifestKind,
        context: BrokerContext,
        stores: BrokerStores,
        request: BrokerRequest,
    ) -> Result<Self, BrokerError> {
        let mut source = ManifestSource::Unresolved;
        let mut name = request.name.clone();

        if let Some(sources) = request.loader_sources() {
            let loader = ManifestLoader::load(sources).await?;
            loader.ensure_kind(kind)?;
            // Schema-level parse only; business rules run at apply time.
            let mut document = ManifestDocument::from_value(loader.parsed().clone())?;
            document.strip_status();
            name = Some(document.name().to_string());
            source = ManifestSource::FromLoader(document);
        }

        let record = match &name {
            Some(n) => stores.records.get(&context.account, kind, n).await?,
            None => None,
        };
        debug!(%kind, ?name, located = record.is_some(), "broker core resolved");

        Ok(Self {
            context,
            stores,
            name,
            source,
            record,
        })
    }
}

/// Optional capability: kinds that can be pushed to/pulled from a serving
/// surface.
#[async_trait]
pub trait Deployable: Send + Sync {
    async fn deploy(&mut self) -> Result<CommandResponse, BrokerError>;
    async fn undeploy(&mut self) -> Result<CommandResponse, BrokerError>;
}

/// Optional capability: kinds that accept a chat message.
#[async_trait]
pub trait Chattable: Send + Sync {
    async fn chat(&mut self, message: &str) -> Result<CommandResponse, BrokerError>;
}

/// Optional capability: kinds that expose an activity log.
#[async_trait]
pub trait LogEmitting: Send + Sync {
    async fn logs(&self) -> Result<CommandResponse, BrokerError>;
}

/// The core reconciliation surface every kind implements.
///
/// Concrete brokers provide the kind tag, field map, and computed status;
/// the provided methods implement "kubectl apply" semantics over those
/// tables. Capability probes return `None` for kinds that do not support the
/// optional commands; the dispatcher maps that to `NotImplemented`.
#[async_trait]
pub trait ResourceBroker: Send + Sync {
    fn kind(&self) -> ManifestKind;
    fn core(&self) -> &BrokerCore;
    fn core_mut(&mut self) -> &mut BrokerCore;
    fn field_map(&self) -> &FieldMap;

    /// Kind-specific computed status fields (camelCase keys), merged with the
    /// record's `created`/`modified` timestamps at render time.
    fn status_extras(&self, _record: &StoredRecord) -> Map<String, Value> {
        Map::new()
    }

    /// Kinds whose mutations are restricted to staff users.
    fn apply_requires_staff(&self) -> bool {
        false
    }

    fn as_deployable_mut(&mut self) -> Option<&mut dyn Deployable> {
        None
    }

    fn as_chattable_mut(&mut self) -> Option<&mut dyn Chattable> {
        None
    }

    fn as_log_emitting(&self) -> Option<&dyn LogEmitting> {
        None
    }

    /// The resolved document, whichever side it came from.
    fn manifest(&self) -> Option<&ManifestDocument> {
        self.core().source.document()
    }

    /// Project a persisted record into document form (the record-to-document
    /// direction of the bidirectional mapping).
    fn project_record(&self, record: &StoredRecord) -> Result<ManifestDocument, BrokerError> {
        let metadata = metadata_from_record(record);
        let spec = self.field_map().record_to_spec(&record.fields);
        let status = status_from_record(record, self.status_extras(record));
        ManifestDocument::from_parts(self.kind(), &metadata, spec, Some(status))
            .map_err(Into::into)
    }

    /// Complete construction: if no manifest was supplied but a record was
    /// located, project it so read commands have a document.
    fn finish_resolve(&mut self) -> Result<(), BrokerError> {
        if self.core().source.document().is_none() {
            if let Some(record) = self.core().record.clone() {
                let document = self.project_record(&record)?;
                self.core_mut().source = ManifestSource::FromRecord(document);
            }
        }
        Ok(())
    }

    /// Idempotent upsert: create the record for `(account, name)` or update
    /// it in place. Secret bindings are resolved to registered names before
    /// anything is written; status and other read-only fields never
    /// participate in the write.
    async fn apply(&mut self) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        if self.apply_requires_staff() && !self.core().context.is_staff() {
            return Err(BrokerError::permission_denied(format!(
                "{kind} apply requires a staff role"
            )));
        }
        let document = match &self.core().source {
            ManifestSource::FromLoader(doc) => doc.clone(),
            _ => return Err(BrokerError::not_ready(kind, "apply requires a manifest")),
        };
        document.validate()?;
        let name = document.name().to_string();

        let mut spec = document.spec_value()?;
        let secret_wires: Vec<&'static str> =
            self.field_map().secret_fields().map(|f| f.wire).collect();
        for wire in secret_wires {
            let Some(value) = spec.get(wire) else { continue };
            if value.is_null() {
                continue;
            }
            let binding: SecretBinding = serde_json::from_value(value.clone())
                .map_err(|e| BrokerError::internal(format!("secret field {wire}: {e}")))?;
            let secret = get_or_create_secret(
                &self.core().context,
                self.core().stores.secrets.as_ref(),
                &binding,
            )
            .await?;
            spec[wire] = Value::String(secret.name);
        }

        let mut fields = self.field_map().spec_to_record(&spec);
        let metadata = document.metadata();
        fields.insert(
            "description".to_string(),
            Value::String(metadata.description.clone()),
        );
        fields.insert(
            "version".to_string(),
            Value::String(metadata.version.clone()),
        );
        if !metadata.tags.is_empty() {
            fields.insert("tags".to_string(), json!(metadata.tags));
        }

        let record = match self.core().record.clone() {
            Some(mut existing) => {
                existing.fields = fields;
                self.core().stores.records.save(&existing).await?
            }
            None => {
                self.core()
                    .stores
                    .records
                    .create(NewRecord {
                        account: self.core().context.account.clone(),
                        kind,
                        name: name.clone(),
                        fields,
                    })
                    .await?
            }
        };
        let rendered = self.project_record(&record)?;
        self.core_mut().record = Some(record);
        self.core_mut().name = Some(name.clone());
        info!(%kind, %name, "applied");
        Ok(CommandResponse::success(
            kind,
            Command::Apply,
            Some(&name),
            Some(rendered.to_value()?),
        ))
    }

    /// Query by exact name within the tenant's scope, or all records of the
    /// kind. Zero matches is a successful empty result, not an error.
    async fn get(&self, query: &GetQuery) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        let mut filter = RecordFilter::default();
        if !query.all {
            filter.name = query.name.clone().or_else(|| self.core().name.clone());
        }
        filter.tags = query.tags.clone();

        let records = self
            .core()
            .stores
            .records
            .filter(&self.core().context.account, kind, &filter)
            .await?;
        let mut items = Vec::with_capacity(records.len());
        for record in &records {
            items.push(self.project_record(record)?.to_value()?);
        }
        let count = items.len();
        let data = json!({
            "items": items,
            "titles": self.field_map().titles(),
            "metadata": {"count": count},
        });
        Ok(CommandResponse::success_with_count(
            kind,
            Command::Get,
            data,
            count,
        ))
    }

    /// Render the full current document (metadata + spec + status) for the
    /// located resource.
    async fn describe(&self) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        let record = self
            .core()
            .record
            .clone()
            .ok_or_else(|| BrokerError::not_ready(kind, "no resource located to describe"))?;
        let document = self.project_record(&record)?;
        Ok(CommandResponse::success(
            kind,
            Command::Describe,
            Some(&record.name),
            Some(document.to_value()?),
        ))
    }

    /// Remove the persisted record. Role-restricted identically to `apply`.
    async fn delete(&mut self) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        if self.apply_requires_staff() && !self.core().context.is_staff() {
            return Err(BrokerError::permission_denied(format!(
                "{kind} delete requires a staff role"
            )));
        }
        let record = self
            .core()
            .record
            .clone()
            .ok_or_else(|| BrokerError::not_ready(kind, "no resource located to delete"))?;
        self.core()
            .stores
            .records
            .delete(&self.core().context.account, kind, &record.name)
            .await?;
        self.core_mut().record = None;
        info!(%kind, name = %record.name, "deleted");
        Ok(CommandResponse::success(
            kind,
            Command::Delete,
            Some(&record.name),
            None,
        ))
    }

    /// JSON Schema for the kind's document type.
    fn schema(&self) -> CommandResponse {
        let kind = self.kind();
        CommandResponse::success(kind, Command::Schema, None, Some(schema_for_kind(kind)))
    }

    /// A syntactically valid, representative manifest for the kind,
    /// independent of any persisted state.
    fn example_manifest(&self) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        let loader = ManifestLoader::from_text(ManifestDocument::example_text(kind))?;
        let document = loader.document()?;
        Ok(CommandResponse::success(
            kind,
            Command::ExampleManifest,
            None,
            Some(document.to_value()?),
        ))
    }
}

fn metadata_from_record(record: &StoredRecord) -> ManifestMetadata {
    ManifestMetadata {
        name: record.name.clone(),
        description: record
            .field_str("description")
            .unwrap_or_default()
            .to_string(),
        version: record.field_str("version").unwrap_or("0.1.0").to_string(),
        tags: record.tags().iter().map(|t| t.to_string()).collect(),
        annotations: None,
    }
}

fn status_from_record(record: &StoredRecord, extras: Map<String, Value>) -> Value {
    let mut status = Map::new();
    status.insert("created".to_string(), timestamp_value(record.created_at));
    status.insert("modified".to_string(), timestamp_value(record.updated_at));
    for (key, value) in extras {
        status.insert(key, value);
    }
    Value::Object(status)
}

fn timestamp_value(datetime: OffsetDateTime) -> Value {
    serde_json::to_value(SmarterDateTime::from(datetime)).unwrap_or(Value::Null)
}
