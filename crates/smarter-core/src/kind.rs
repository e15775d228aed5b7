use crate::error::CoreError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource kinds understood by the broker framework.
///
/// The kind string is the routing key of the command protocol: it selects the
/// concrete broker and the document schema that apply to a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ManifestKind {
    SqlConnection,
    StaticPlugin,
    SqlPlugin,
    Chatbot,
    Secret,
}

impl ManifestKind {
    /// All kinds, in routing order. Used for error messages and CLI help.
    pub const ALL: [ManifestKind; 5] = [
        ManifestKind::SqlConnection,
        ManifestKind::StaticPlugin,
        ManifestKind::SqlPlugin,
        ManifestKind::Chatbot,
        ManifestKind::Secret,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::SqlConnection => "SqlConnection",
            ManifestKind::StaticPlugin => "StaticPlugin",
            ManifestKind::SqlPlugin => "SqlPlugin",
            ManifestKind::Chatbot => "Chatbot",
            ManifestKind::Secret => "Secret",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SqlConnection" => Ok(ManifestKind::SqlConnection),
            "StaticPlugin" => Ok(ManifestKind::StaticPlugin),
            "SqlPlugin" => Ok(ManifestKind::SqlPlugin),
            "Chatbot" => Ok(ManifestKind::Chatbot),
            "Secret" => Ok(ManifestKind::Secret),
            _ => {
                let valid: Vec<&str> = ManifestKind::ALL.iter().map(|k| k.as_str()).collect();
                Err(CoreError::invalid_kind(format!(
                    "{s} (valid kinds: {})",
                    valid.join(", ")
                )))
            }
        }
    }
}
