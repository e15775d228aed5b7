use crate::base::{BrokerCore, BrokerRequest, BrokerStores, ResourceBroker};
use crate::context::BrokerContext;
use crate::error::BrokerError;
use crate::mapping::{FieldMap, FieldSpec};
use async_trait::async_trait;
use smarter_core::ManifestKind;

static FIELDS: FieldMap = FieldMap::new(&[
    FieldSpec::new("selector", "selector", "object"),
    FieldSpec::new("prompt", "prompt", "object"),
    FieldSpec::new("data", "data", "object"),
]);

/// Broker for plugins that return a static payload when selected.
pub struct StaticPluginBroker {
    core: BrokerCore,
}

impl StaticPluginBroker {
    pub async fn new(
        context: BrokerContext,
        stores: BrokerStores,
        request: BrokerRequest,
    ) -> Result<Self, BrokerError> {
        let core =
            BrokerCore::resolve(ManifestKind::StaticPlugin, context, stores, request).await?;
        let mut broker = Self { core };
        broker.finish_resolve()?;
        Ok(broker)
    }
}

#[async_trait]
impl ResourceBroker for StaticPluginBroker {
    fn kind(&self) -> ManifestKind {
        ManifestKind::StaticPlugin
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

    #[tokio::test]
    async fn test_apply_and_reload_roundtrip() {
        let text = ManifestDocument::example_text(ManifestKind::StaticPlugin);
        let mut broker =
            StaticPluginBroker::new(context(), stores(), BrokerRequest::with_manifest(text))
                .await
                .unwrap();
        let response = broker.apply().await.unwrap();
        let data = response.data.unwrap();
        assert_eq!(data["spec"]["selector"]["directive"], "contact information");
        assert_eq!(
            data["spec"]["data"]["staticData"]["email"],
            "support@example.com"
        );
        assert_eq!(data["spec"]["prompt"]["maxTokens"], 2048);
    }

    #[tokio::test]
    async fn test_customer_may_apply_static_plugin() {
        let text = ManifestDocument::example_text(ManifestKind::StaticPlugin);
        let mut broker =
            StaticPluginBroker::new(context(), stores(), BrokerRequest::with_manifest(text))
                .await
                .unwrap();
        assert!(broker.apply().await.is_ok());
    }
}
