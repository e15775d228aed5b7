use crate::base::{BrokerCore, BrokerRequest, BrokerStores, ResourceBroker};
use crate::context::BrokerContext;
use crate::error::BrokerError;
use crate::mapping::{FieldMap, FieldSpec};
use async_trait::async_trait;
use smarter_core::ManifestKind;

static FIELDS: FieldMap = FieldMap::new(&[
    FieldSpec::new("selector", "selector", "object"),
    FieldSpec::new("prompt", "prompt", "object"),
    FieldSpec::new("sqlData", "sql_data", "object"),
]);

/// Broker for SQL-backed plugins.
///
/// Mutations are staff-restricted: a SqlPlugin executes operator-authored SQL
/// against a tenant connection, so customers may read but not write.
pub struct SqlPluginBroker {
    core: BrokerCore,
}

impl SqlPluginBroker {
    pub async fn new(
        context: BrokerContext,
        stores: BrokerStores,
        request: BrokerRequest,
    ) -> Result<Self, BrokerError> {
        let core = BrokerCore::resolve(ManifestKind::SqlPlugin, context, stores, request).await?;
        let mut broker = Self { core };
        broker.finish_resolve()?;
        Ok(broker)
    }
}

#[async_trait]
impl ResourceBroker for SqlPluginBroker {
    fn kind(&self) -> ManifestKind {
        ManifestKind::SqlPlugin
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

    fn apply_requires_staff(&self) -> bool {
        true
    }
}
