use crate::base::{BrokerCore, BrokerRequest, BrokerStores, ResourceBroker};
use crate::context::BrokerContext;
use crate::error::BrokerError;
use crate::mapping::{FieldMap, FieldSpec};
use async_trait::async_trait;
use serde_json::{Map, Value};
use smarter_core::ManifestKind;
use smarter_manifest::kinds::SqlConnectionSpec;
use smarter_store::StoredRecord;

/// Every SqlConnection spec field, with the two secret indirections marked.
static FIELDS: FieldMap = FieldMap::new(&[
    FieldSpec::new("dbEngine", "db_engine", "string"),
    FieldSpec::new("hostname", "hostname", "string"),
    FieldSpec::new("port", "port", "integer"),
    FieldSpec::new("username", "username", "string"),
    FieldSpec::secret("password", "password"),
    FieldSpec::new("database", "database", "string"),
    FieldSpec::new("poolSize", "pool_size", "integer"),
    FieldSpec::new("maxOverflow", "max_overflow", "integer"),
    FieldSpec::new("timeout", "timeout", "integer"),
    FieldSpec::new("useSsl", "use_ssl", "boolean"),
    FieldSpec::new("proxyHost", "proxy_host", "string"),
    FieldSpec::new("proxyPort", "proxy_port", "integer"),
    FieldSpec::new("proxyUsername", "proxy_username", "string"),
    FieldSpec::secret("proxyPassword", "proxy_password"),
]);

/// Broker for tenant database connections.
#[derive(Debug)]
pub struct SqlConnectionBroker {
    core: BrokerCore,
}

impl SqlConnectionBroker {
    pub async fn new(
        context: BrokerContext,
        stores: BrokerStores,
        request: BrokerRequest,
    ) -> Result<Self, BrokerError> {
        let core =
            BrokerCore::resolve(ManifestKind::SqlConnection, context, stores, request).await?;
        let mut broker = Self { core };
        broker.finish_resolve()?;
        Ok(broker)
    }
}

#[async_trait]
impl ResourceBroker for SqlConnectionBroker {
    fn kind(&self) -> ManifestKind {
        ManifestKind::SqlConnection
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

    /// `isValid` reflects whether a connection URL can be constructed from
    /// the persisted coordinates.
    fn status_extras(&self, record: &StoredRecord) -> Map<String, Value> {
        let spec_value = self.field_map().record_to_spec(&record.fields);
        let is_valid = serde_json::from_value::<SqlConnectionSpec>(spec_value)
            .ok()
            .and_then(|spec| spec.connection_url())
            .is_some();
        let mut extras = Map::new();
        extras.insert("isValid".to_string(), Value::Bool(is_valid));
        if let Some(last_accessed) = record.field("last_accessed") {
            extras.insert("lastAccessed".to_string(), last_accessed.clone());
        }
        extras
    }
}
