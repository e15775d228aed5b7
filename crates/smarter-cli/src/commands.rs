use crate::cli::{Cli, Commands, OutputFormat};
use crate::output;
use anyhow::Context;
use smarter_broker::{
    BrokerContext, BrokerRequest, BrokerStores, Command, CommandArgs, CommandResponse, GetQuery,
    broker_for_kind, dispatch,
};
use smarter_config::Settings;
use smarter_core::{AccountNumber, ManifestKind, UserProfile, UserRole};
use smarter_db_memory::{InMemoryRecordStore, InMemorySecretStore, SecretCipher, StoreSnapshot};
use smarter_manifest::ManifestLoader;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

struct Session {
    settings: Settings,
    records: Arc<InMemoryRecordStore>,
    secrets: Arc<InMemorySecretStore>,
    snapshot_path: Option<PathBuf>,
}

impl Session {
    fn open(settings: Settings) -> anyhow::Result<Self> {
        let cipher = match &settings.encryption.key {
            Some(key) => SecretCipher::from_key_str(key, &settings.encryption.key_id)
                .context("invalid encryption key")?,
            None => SecretCipher::new(SecretCipher::generate_key(), &settings.encryption.key_id),
        };
        let records = Arc::new(InMemoryRecordStore::new());
        let secrets = Arc::new(InMemorySecretStore::new(cipher));

        let snapshot_path = settings
            .storage
            .snapshot_path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".smarter").join("state.json")));
        if let Some(path) = &snapshot_path {
            StoreSnapshot::load(path)
                .context("loading state snapshot")?
                .restore(&records, &secrets);
            debug!(path = %path.display(), "state snapshot loaded");
        }

        Ok(Self {
            settings,
            records,
            secrets,
            snapshot_path,
        })
    }

    fn stores(&self) -> BrokerStores {
        BrokerStores {
            records: self.records.clone(),
            secrets: self.secrets.clone(),
        }
    }

    fn context(&self) -> anyhow::Result<BrokerContext> {
        let account = AccountNumber::new(&self.settings.account)?;
        let role = match self.settings.role.as_str() {
            "admin" => UserRole::Admin,
            "staff" => UserRole::Staff,
            _ => UserRole::Customer,
        };
        Ok(BrokerContext::new(
            account,
            UserProfile::new(self.settings.username.clone(), role),
        ))
    }

    fn persist(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.snapshot_path {
            StoreSnapshot::capture(&self.records, &self.secrets)
                .save(path)
                .context("saving state snapshot")?;
        }
        Ok(())
    }
}

/// Resolve the manifest text for `apply` from file, URL, or stdin.
async fn apply_manifest_text(
    file: Option<PathBuf>,
    url: Option<url::Url>,
) -> anyhow::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()));
    }
    if let Some(url) = url {
        return reqwest::get(url.clone())
            .await?
            .error_for_status()?
            .text()
            .await
            .with_context(|| format!("fetching {url}"));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading manifest from stdin")?;
    Ok(text)
}

fn parse_kind(kind: &str) -> anyhow::Result<ManifestKind> {
    ManifestKind::from_str(kind).map_err(Into::into)
}

/// Translate the parsed CLI into broker inputs.
async fn plan(
    command: Commands,
) -> anyhow::Result<(ManifestKind, BrokerRequest, Command, CommandArgs)> {
    let planned = match command {
        Commands::Apply(args) => {
            let text = apply_manifest_text(args.file, args.url).await?;
            // Peek at the kind before constructing the broker for it.
            let kind = ManifestLoader::from_text(&text)?.manifest_kind();
            (
                kind,
                BrokerRequest::with_manifest(text),
                Command::Apply,
                CommandArgs::default(),
            )
        }
        Commands::Get(args) => {
            let kind = parse_kind(&args.kind)?;
            let query = GetQuery {
                name: args.name,
                all: args.all,
                tags: (!args.tags.is_empty()).then_some(args.tags),
            };
            (
                kind,
                BrokerRequest::empty(),
                Command::Get,
                CommandArgs {
                    query,
                    message: None,
                },
            )
        }
        Commands::Describe(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::named(args.name),
            Command::Describe,
            CommandArgs::default(),
        ),
        Commands::Delete(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::named(args.name),
            Command::Delete,
            CommandArgs::default(),
        ),
        Commands::Deploy(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::named(args.name),
            Command::Deploy,
            CommandArgs::default(),
        ),
        Commands::Undeploy(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::named(args.name),
            Command::Undeploy,
            CommandArgs::default(),
        ),
        Commands::Logs(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::named(args.name),
            Command::Logs,
            CommandArgs::default(),
        ),
        Commands::Chat(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::named(args.name),
            Command::Chat,
            CommandArgs {
                query: GetQuery::default(),
                message: Some(args.message),
            },
        ),
        Commands::Schema(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::empty(),
            Command::Schema,
            CommandArgs::default(),
        ),
        Commands::ExampleManifest(args) => (
            parse_kind(&args.kind)?,
            BrokerRequest::empty(),
            Command::ExampleManifest,
            CommandArgs::default(),
        ),
    };
    Ok(planned)
}

/// Run one command end to end. Returns whether it succeeded.
pub async fn run(cli: Cli) -> anyhow::Result<bool> {
    let settings = Settings::load(cli.config.as_deref())?;

    // RUST_LOG wins; the configured filter is the fallback.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = cli.output.unwrap_or(OutputFormat::default());
    let session = Session::open(settings)?;

    let (kind, request, command, args) = plan(cli.command).await?;

    let response = match broker_for_kind(kind, session.context()?, session.stores(), request).await
    {
        Ok(mut broker) => dispatch(broker.as_mut(), command, &args).await,
        // Construction failures (loader, kind mismatch) render as the same envelope.
        Err(error) => CommandResponse::from_error(kind, command, &error),
    };

    session.persist()?;
    output::print_response(&response, format);
    Ok(response.is_success())
}
