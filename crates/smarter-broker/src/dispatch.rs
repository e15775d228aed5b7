use crate::base::{BrokerRequest, BrokerStores, GetQuery, ResourceBroker};
use crate::brokers::{
    ChatbotBroker, SecretBroker, SqlConnectionBroker, SqlPluginBroker, StaticPluginBroker,
};
use crate::command::Command;
use crate::context::BrokerContext;
use crate::envelope::CommandResponse;
use crate::error::BrokerError;
use smarter_core::ManifestKind;
use tracing::warn;

/// Per-command arguments beyond the broker's own request.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub query: GetQuery,
    pub message: Option<String>,
}

/// Construct the concrete broker for a kind.
pub async fn broker_for_kind(
    kind: ManifestKind,
    context: BrokerContext,
    stores: BrokerStores,
    request: BrokerRequest,
) -> Result<Box<dyn ResourceBroker>, BrokerError> {
    let broker: Box<dyn ResourceBroker> = match kind {
        ManifestKind::SqlConnection => {
            Box::new(SqlConnectionBroker::new(context, stores, request).await?)
        }
        ManifestKind::StaticPlugin => {
            Box::new(StaticPluginBroker::new(context, stores, request).await?)
        }
        ManifestKind::SqlPlugin => Box::new(SqlPluginBroker::new(context, stores, request).await?),
        ManifestKind::Chatbot => Box::new(ChatbotBroker::new(context, stores, request).await?),
        ManifestKind::Secret => Box::new(SecretBroker::new(context, stores, request).await?),
    };
    Ok(broker)
}

/// Run one command against a broker and always produce an envelope.
///
/// Optional commands probe for the capability; a kind without it yields the
/// `NotImplemented` error envelope. No error escapes as a raw exception;
/// the transport layer above only ever sees [`CommandResponse`].
pub async fn dispatch(
    broker: &mut dyn ResourceBroker,
    command: Command,
    args: &CommandArgs,
) -> CommandResponse {
    let kind = broker.kind();
    let result = match command {
        Command::Apply => broker.apply().await,
        Command::Get => broker.get(&args.query).await,
        Command::Describe => broker.describe().await,
        Command::Delete => broker.delete().await,
        Command::Schema => Ok(broker.schema()),
        Command::ExampleManifest => broker.example_manifest(),
        Command::Deploy => match broker.as_deployable_mut() {
            Some(deployable) => deployable.deploy().await,
            None => Err(BrokerError::not_implemented(kind, command)),
        },
        Command::Undeploy => match broker.as_deployable_mut() {
            Some(deployable) => deployable.undeploy().await,
            None => Err(BrokerError::not_implemented(kind, command)),
        },
        Command::Logs => match broker.as_log_emitting() {
            Some(emitter) => emitter.logs().await,
            None => Err(BrokerError::not_implemented(kind, command)),
        },
        Command::Chat => match broker.as_chattable_mut() {
            Some(chattable) => {
                chattable
                    .chat(args.message.as_deref().unwrap_or_default())
                    .await
            }
            None => Err(BrokerError::not_implemented(kind, command)),
        },
    };
    match result {
        Ok(response) => response,
        Err(error) => {
            warn!(%kind, %command, %error, "command failed");
            CommandResponse::from_error(kind, command, &error)
        }
    }
}
