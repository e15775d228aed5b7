use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smarter")]
#[command(about = "Smarter CLI — declarative management of platform resources")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML); SMARTER_* env vars override it
    #[arg(short, long, global = true, env = "SMARTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    pub output: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a manifest: create the resource or update it in place
    Apply(ApplyArgs),
    /// List resources of a kind
    Get(GetArgs),
    /// Show the full manifest (metadata, spec, status) of one resource
    Describe(KindNameArgs),
    /// Delete a resource
    Delete(KindNameArgs),
    /// Deploy a resource to its serving surface
    Deploy(KindNameArgs),
    /// Take a deployed resource off its serving surface
    Undeploy(KindNameArgs),
    /// Show a resource's activity log
    Logs(KindNameArgs),
    /// Send a chat message to a deployed resource
    Chat(ChatArgs),
    /// Print the JSON Schema for a kind's manifest
    Schema(KindArgs),
    /// Print a representative example manifest for a kind
    ExampleManifest(KindArgs),
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Path to a YAML/JSON manifest (reads from stdin if omitted)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Fetch the manifest from a URL instead
    #[arg(long, conflicts_with = "file")]
    pub url: Option<url::Url>,
}

#[derive(clap::Args)]
pub struct GetArgs {
    /// Resource kind (e.g. SqlConnection)
    pub kind: String,
    /// Exact resource name; omit to list everything of the kind
    pub name: Option<String>,
    /// List all resources of the kind
    #[arg(long)]
    pub all: bool,
    /// Keep only resources carrying one of these tags
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(clap::Args)]
pub struct KindNameArgs {
    /// Resource kind (e.g. Chatbot)
    pub kind: String,
    /// Resource name
    pub name: String,
}

#[derive(clap::Args)]
pub struct ChatArgs {
    /// Resource kind (e.g. Chatbot)
    pub kind: String,
    /// Resource name
    pub name: String,
    /// The message to send
    pub message: String,
}

#[derive(clap::Args)]
pub struct KindArgs {
    /// Resource kind (e.g. SqlConnection)
    pub kind: String,
}
