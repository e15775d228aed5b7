use crate::base::{BrokerCore, BrokerRequest, BrokerStores, GetQuery, ResourceBroker};
use crate::command::Command;
use crate::context::BrokerContext;
use crate::envelope::CommandResponse;
use crate::error::BrokerError;
use crate::mapping::{FieldMap, FieldSpec};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use smarter_core::{ManifestKind, SmarterDateTime};
use smarter_manifest::{ManifestDocument, ManifestMetadata};
use smarter_store::{NewSecret, SecretRecord};
use time::OffsetDateTime;
use tracing::info;

static FIELDS: FieldMap = FieldMap::new(&[FieldSpec::new("config", "config", "object")]);

/// Broker for the Secret kind.
///
/// Unlike every other kind, the persisted entity is the secret store's own
/// record, so the record-backed default engine is overridden end to end. The
/// one invariant that never bends: a value goes in through `apply` and never
/// comes back out of `get` or `describe`.
pub struct SecretBroker {
    core: BrokerCore,
    secret: Option<SecretRecord>,
}

impl SecretBroker {
    pub async fn new(
        context: BrokerContext,
        stores: BrokerStores,
        request: BrokerRequest,
    ) -> Result<Self, BrokerError> {
        let core = BrokerCore::resolve(ManifestKind::Secret, context, stores, request).await?;
        let secret = match &core.name {
            Some(name) => core.stores.secrets.get(&core.context.account, name).await?,
            None => None,
        };
        Ok(Self { core, secret })
    }

    fn located(&self, action: &str) -> Result<SecretRecord, BrokerError> {
        self.secret.clone().ok_or_else(|| {
            BrokerError::not_ready(ManifestKind::Secret, format!("no secret located to {action}"))
        })
    }
}

fn timestamp_value(datetime: OffsetDateTime) -> Value {
    serde_json::to_value(SmarterDateTime::from(datetime)).unwrap_or(Value::Null)
}

/// Render a secret record as a manifest document. The value never appears;
/// the spec carries only the non-sensitive configuration.
fn project_secret(secret: &SecretRecord) -> Result<ManifestDocument, BrokerError> {
    let metadata =
        ManifestMetadata::new(secret.name.as_str(), secret.description.as_str(), "0.1.0");
    let mut config = Map::new();
    if let Some(expires) = secret.expires_at {
        config.insert("expiration".to_string(), timestamp_value(expires));
    }
    let spec = json!({ "config": config });

    let mut status = Map::new();
    status.insert("created".to_string(), timestamp_value(secret.created_at));
    status.insert("modified".to_string(), timestamp_value(secret.updated_at));
    status.insert("encrypted".to_string(), Value::Bool(true));
    if let Some(last_accessed) = secret.last_accessed {
        status.insert("lastAccessed".to_string(), timestamp_value(last_accessed));
    }

    ManifestDocument::from_parts(
        ManifestKind::Secret,
        &metadata,
        spec,
        Some(Value::Object(status)),
    )
    .map_err(Into::into)
}

fn secret_titles() -> Vec<Value> {
    vec![
        json!({"name": "name", "type": "string"}),
        json!({"name": "description", "type": "string"}),
        json!({"name": "expiration", "type": "string"}),
        json!({"name": "created", "type": "string"}),
        json!({"name": "modified", "type": "string"}),
    ]
}

#[async_trait]
impl ResourceBroker for SecretBroker {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Secret
    }

    fn core(&self) -> &BrokerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BrokerCore {
        &mut self.core
    }

    fn field_map(&self) -> &FieldMap {
        &FIELDS
    }

    /// Upsert against the secret store. A supplied value is encrypted; an
    /// apply without a value against an existing secret leaves it sealed and
    /// untouched.
    async fn apply(&mut self) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        let document = match &self.core.source {
            crate::base::ManifestSource::FromLoader(doc) => doc.clone(),
            _ => return Err(BrokerError::not_ready(kind, "apply requires a manifest")),
        };
        document.validate()?;
        let ManifestDocument::Secret(manifest) = &document else {
            return Err(BrokerError::internal("secret broker received a foreign document"));
        };
        let name = manifest.metadata.name.clone();
        let value = manifest.spec.config.value.clone();
        let expires_at = manifest
            .spec
            .config
            .expiration
            .clone()
            .map(SmarterDateTime::into_inner);

        let account = self.core.context.account.clone();
        let existing = self.core.stores.secrets.get(&account, &name).await?;
        let record = match (existing, value) {
            (Some(existing), None) => existing,
            (Some(_), Some(value)) => {
                self.core
                    .stores
                    .secrets
                    .update(NewSecret {
                        account,
                        name: name.clone(),
                        value,
                        description: manifest.metadata.description.clone(),
                        expires_at,
                    })
                    .await?
            }
            (None, Some(value)) => {
                self.core
                    .stores
                    .secrets
                    .create(NewSecret {
                        account,
                        name: name.clone(),
                        value,
                        description: manifest.metadata.description.clone(),
                        expires_at,
                    })
                    .await?
            }
            (None, None) => return Err(BrokerError::UnresolvedSecret { name }),
        };
        self.secret = Some(record.clone());
        self.core.name = Some(name.clone());
        let rendered = project_secret(&record)?;
        info!(%name, "secret applied");
        Ok(CommandResponse::success(
            kind,
            Command::Apply,
            Some(&name),
            Some(rendered.to_value()?),
        ))
    }

    async fn get(&self, query: &GetQuery) -> Result<CommandResponse, BrokerError> {
        let kind = self.kind();
        let account = &self.core.context.account;
        let store = self.core.stores.secrets.as_ref();
        let secrets = if query.all {
            store.list(account).await?
        } else {
            match query.name.clone().or_else(|| self.core.name.clone()) {
                Some(name) => store.get(account, &name).await?.into_iter().collect(),
                None => store.list(account).await?,
            }
        };
        let mut items = Vec::with_capacity(secrets.len());
        for secret in &secrets {
            items.push(project_secret(secret)?.to_value()?);
        }
        let count = items.len();
        let data = json!({
            "items": items,
            "titles": secret_titles(),
            "metadata": {"count": count},
        });
        Ok(CommandResponse::success_with_count(
            kind,
            Command::Get,
            data,
            count,
        ))
    }

    async fn describe(&self) -> Result<CommandResponse, BrokerError> {
        let secret = self.located("describe")?;
        let document = project_secret(&secret)?;
        Ok(CommandResponse::success(
            self.kind(),
            Command::Describe,
            Some(&secret.name),
            Some(document.to_value()?),
        ))
    }

    async fn delete(&mut self) -> Result<CommandResponse, BrokerError> {
        let secret = self.located("delete")?;
        self.core
            .stores
            .secrets
            .delete(&self.core.context.account, &secret.name)
            .await?;
        self.secret = None;
        info!(name = %secret.name, "secret deleted");
        Ok(CommandResponse::success(
            self.kind(),
            Command::Delete,
            Some(&secret.name),
            None,
        ))
    }
}
