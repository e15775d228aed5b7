pub mod chatbot;
pub mod secret;
pub mod sql_connection;
pub mod sql_plugin;
pub mod static_plugin;

pub use chatbot::{ChatbotManifest, ChatbotSpec, ChatbotStatus};
pub use secret::{SecretConfig, SecretManifest, SecretSpec, SecretStatus};
pub use sql_connection::{SqlConnectionManifest, SqlConnectionSpec, SqlConnectionStatus};
pub use sql_plugin::{SqlData, SqlPluginManifest, SqlPluginSpec, SqlPluginStatus};
pub use static_plugin::{
    PluginData, PluginPrompt, PluginSelector, StaticPluginManifest, StaticPluginSpec,
    StaticPluginStatus,
};
