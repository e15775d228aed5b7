pub mod chatbot;
pub mod secret;
pub mod sql_connection;
pub mod sql_plugin;
pub mod static_plugin;

pub use chatbot::ChatbotBroker;
pub use secret::SecretBroker;
pub use sql_connection::SqlConnectionBroker;
pub use sql_plugin::SqlPluginBroker;
pub use static_plugin::StaticPluginBroker;
