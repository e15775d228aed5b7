use crate::base::{
    BrokerCore, BrokerRequest, BrokerStores, Chattable, Deployable, LogEmitting, ResourceBroker,
};
use crate::command::Command;
use crate::context::BrokerContext;
use crate::envelope::CommandResponse;
use crate::error::BrokerError;
use crate::mapping::{FieldMap, FieldSpec};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use smarter_core::{ManifestKind, now_utc};
use smarter_store::StoredRecord;
use tracing::info;

/// Apex domain chatbots are served under when no custom domain is set.
const SERVING_DOMAIN: &str = "platform.smarter.sh";

static FIELDS: FieldMap = FieldMap::new(&[
    FieldSpec::new("appName", "app_name", "string"),
    FieldSpec::new("provider", "provider", "string"),
    FieldSpec::new("defaultModel", "default_model", "string"),
    FieldSpec::new("defaultTemperature", "default_temperature", "number"),
    FieldSpec::new("defaultMaxTokens", "default_max_tokens", "integer"),
    FieldSpec::new("systemRole", "system_role", "string"),
    FieldSpec::new("subdomain", "subdomain", "string"),
    FieldSpec::new("customDomain", "custom_domain", "string"),
    FieldSpec::new("plugins", "plugins", "array"),
]);

/// Broker for hosted chatbots.
///
/// The only kind with the full capability set: it deploys to a serving
/// surface, emits a deployment event log, and accepts chat messages while
/// deployed.
pub struct ChatbotBroker {
    core: BrokerCore,
}

impl ChatbotBroker {
    pub async fn new(
        context: BrokerContext,
        stores: BrokerStores,
        request: BrokerRequest,
    ) -> Result<Self, BrokerError> {
        let core = BrokerCore::resolve(ManifestKind::Chatbot, context, stores, request).await?;
        let mut broker = Self { core };
        broker.finish_resolve()?;
        Ok(broker)
    }

    fn located(&self, action: &str) -> Result<StoredRecord, BrokerError> {
        self.core
            .record
            .clone()
            .ok_or_else(|| BrokerError::not_ready(ManifestKind::Chatbot, format!("no chatbot located to {action}")))
    }

    fn serving_url(&self, record: &StoredRecord) -> Option<url::Url> {
        let host = match record.field_str("custom_domain") {
            Some(domain) => domain.to_string(),
            None => format!("{}.{SERVING_DOMAIN}", record.field_str("subdomain")?),
        };
        url::Url::parse(&format!("https://{host}/")).ok()
    }

    fn is_deployed(record: &StoredRecord) -> bool {
        record
            .field("deployed")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Flip the deployment flag, append an event-log entry, and save.
    async fn set_deployed(&mut self, deployed: bool) -> Result<StoredRecord, BrokerError> {
        let action = if deployed { "deploy" } else { "undeploy" };
        let mut record = self.located(action)?;
        record
            .fields
            .insert("deployed".to_string(), Value::Bool(deployed));
        let entry = json!({"event": action, "at": now_utc().to_string()});
        match record.fields.get_mut("event_log") {
            Some(Value::Array(log)) => log.push(entry),
            _ => {
                record
                    .fields
                    .insert("event_log".to_string(), Value::Array(vec![entry]));
            }
        }
        let saved = self.core.stores.records.save(&record).await?;
        self.core.record = Some(saved.clone());
        Ok(saved)
    }
}

#[async_trait]
impl ResourceBroker for ChatbotBroker {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Chatbot
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

    fn status_extras(&self, record: &StoredRecord) -> Map<String, Value> {
        let deployed = Self::is_deployed(record);
        let mut extras = Map::new();
        extras.insert("deployed".to_string(), Value::Bool(deployed));
        if deployed {
            if let Some(url) = self.serving_url(record) {
                extras.insert("url".to_string(), Value::String(url.to_string()));
            }
        }
        extras
    }

    fn as_deployable_mut(&mut self) -> Option<&mut dyn Deployable> {
        Some(self)
    }

    fn as_chattable_mut(&mut self) -> Option<&mut dyn Chattable> {
        Some(self)
    }

    fn as_log_emitting(&self) -> Option<&dyn LogEmitting> {
        Some(self)
    }
}

#[async_trait]
impl Deployable for ChatbotBroker {
    async fn deploy(&mut self) -> Result<CommandResponse, BrokerError> {
        let saved = self.set_deployed(true).await?;
        let rendered = self.project_record(&saved)?;
        info!(name = %saved.name, "chatbot deployed");
        Ok(CommandResponse::success(
            ManifestKind::Chatbot,
            Command::Deploy,
            Some(&saved.name),
            Some(rendered.to_value()?),
        ))
    }

    async fn undeploy(&mut self) -> Result<CommandResponse, BrokerError> {
        let saved = self.set_deployed(false).await?;
        let rendered = self.project_record(&saved)?;
        info!(name = %saved.name, "chatbot undeployed");
        Ok(CommandResponse::success(
            ManifestKind::Chatbot,
            Command::Undeploy,
            Some(&saved.name),
            Some(rendered.to_value()?),
        ))
    }
}

#[async_trait]
impl Chattable for ChatbotBroker {
    /// Validate readiness and hand the message off to the chat runtime.
    ///
    /// Completion orchestration happens downstream; the broker neither waits
    /// for nor relays the model's answer.
    async fn chat(&mut self, message: &str) -> Result<CommandResponse, BrokerError> {
        let record = self.located("chat with")?;
        if !Self::is_deployed(&record) {
            return Err(BrokerError::not_ready(
                ManifestKind::Chatbot,
                format!("{} is not deployed", record.name),
            ));
        }
        let data = json!({
            "chatbot": record.name,
            "message": message,
            "delegated": true,
            "url": self.serving_url(&record).map(|u| u.to_string()),
        });
        info!(name = %record.name, "chat message dispatched");
        Ok(CommandResponse::success(
            ManifestKind::Chatbot,
            Command::Chat,
            Some(&record.name),
            Some(data),
        ))
    }
}

#[async_trait]
impl LogEmitting for ChatbotBroker {
    async fn logs(&self) -> Result<CommandResponse, BrokerError> {
        let record = self.located("read logs for")?;
        let log = record
            .field("event_log")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(CommandResponse::success(
            ManifestKind::Chatbot,
            Command::Logs,
            Some(&record.name),
            Some(json!({"logs": log})),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarter_core::{AccountNumber, UserProfile, UserRole};
    use smarter_db_memory::{InMemoryRecordStore, InMemorySecretStore};
    use smarter_manifest::ManifestDocument;
    use std::sync::Arc;

    fn stores() -> BrokerStores {
        BrokerStores {
            records: Arc::new(InMemoryRecordStore::new()),
            secrets: Arc::new(InMemorySecretStore::ephemeral()),
        }
    }

    fn context() -> BrokerContext {
        BrokerContext::new(
            AccountNumber::new("1234-5678-9012").unwrap(),
            UserProfile::new("alice", UserRole::Customer),
        )
    }

    async fn applied_broker(stores: BrokerStores) -> ChatbotBroker {
        let text = ManifestDocument::example_text(ManifestKind::Chatbot);
        let mut broker =
            ChatbotBroker::new(context(), stores, BrokerRequest::with_manifest(text))
                .await
                .unwrap();
        broker.apply().await.unwrap();
        broker
    }

    #[test]
    fn test_field_map_consistent() {
        assert!(FIELDS.is_consistent());
    }

    #[tokio::test]
    async fn test_apply_starts_undeployed() {
        let mut broker = applied_broker(stores()).await;
        let described = broker.describe().await.unwrap().data.unwrap();
        assert_eq!(described["status"]["deployed"], false);
        assert!(described["status"].get("url").is_none());
        // chat before deploy is a readiness failure
        let err = broker.chat("hello").await.unwrap_err();
        assert!(matches!(err, BrokerError::NotReady { .. }));
    }

    #[tokio::test]
    async fn test_deploy_then_chat_and_logs() {
        let mut broker = applied_broker(stores()).await;

        let response = broker.deploy().await.unwrap();
        assert_eq!(
            response.message,
            "Chatbot example-chatbot deployed successfully"
        );
        let data = response.data.unwrap();
        assert_eq!(data["status"]["deployed"], true);
        assert_eq!(
            data["status"]["url"],
            "https://example-support.platform.smarter.sh/"
        );

        let chat = broker.chat("hello there").await.unwrap();
        let chat_data = chat.data.unwrap();
        assert_eq!(chat_data["delegated"], true);
        assert_eq!(chat_data["message"], "hello there");

        let logs = broker.logs().await.unwrap().data.unwrap();
        let entries = logs["logs"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["event"], "deploy");
    }

    #[tokio::test]
    async fn test_undeploy_appends_event() {
        let mut broker = applied_broker(stores()).await;
        broker.deploy().await.unwrap();
        let response = broker.undeploy().await.unwrap();
        let data = response.data.unwrap();
        assert_eq!(data["status"]["deployed"], false);

        let logs = broker.logs().await.unwrap().data.unwrap();
        let entries = logs["logs"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["event"], "undeploy");
    }

    #[tokio::test]
    async fn test_deploy_without_record_is_not_ready() {
        let mut broker = ChatbotBroker::new(context(), stores(), BrokerRequest::empty())
            .await
            .unwrap();
        let err = broker.deploy().await.unwrap_err();
        assert!(matches!(err, BrokerError::NotReady { .. }));
    }
}
