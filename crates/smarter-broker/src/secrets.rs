use crate::context::BrokerContext;
use crate::error::BrokerError;
use smarter_manifest::SecretBinding;
use smarter_store::{NewSecret, SecretRecord, SecretStore};
use tracing::debug;

/// Resolve a secret binding against the tenant's secret store.
///
/// An existing secret registered under the binding's name always wins. If
/// none exists and the binding carries a plaintext value, the value is
/// encrypted and registered. If none exists and no value was supplied, there
/// is nothing to materialize and the apply fails.
///
/// Plaintext never escapes this function; the caller receives only the
/// [`SecretRecord`] reference.
pub async fn get_or_create_secret(
    context: &BrokerContext,
    store: &dyn SecretStore,
    binding: &SecretBinding,
) -> Result<SecretRecord, BrokerError> {
    let name = binding.name();
    if let Some(existing) = store.get(&context.account, name).await? {
        debug!(name, "secret resolved to existing record");
        return Ok(existing);
    }
    match binding.value() {
        Some(value) => {
            debug!(name, "registering new secret");
            let created = store
                .create(NewSecret {
                    account: context.account.clone(),
                    name: name.to_string(),
                    value: value.to_string(),
                    description: binding.description().unwrap_or_default().to_string(),
                    expires_at: None,
                })
                .await?;
            Ok(created)
        }
        None => Err(BrokerError::UnresolvedSecret {
            name: name.to_string(),
        }),
    }
}
