use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The uniform command surface every broker answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Apply,
    Get,
    Describe,
    Delete,
    Deploy,
    Undeploy,
    Logs,
    Chat,
    Schema,
    ExampleManifest,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::Apply,
        Command::Get,
        Command::Describe,
        Command::Delete,
        Command::Deploy,
        Command::Undeploy,
        Command::Logs,
        Command::Chat,
        Command::Schema,
        Command::ExampleManifest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Apply => "apply",
            Command::Get => "get",
            Command::Describe => "describe",
            Command::Delete => "delete",
            Command::Deploy => "deploy",
            Command::Undeploy => "undeploy",
            Command::Logs => "logs",
            Command::Chat => "chat",
            Command::Schema => "schema",
            Command::ExampleManifest => "example_manifest",
        }
    }

    /// Affirmative past tense used in success messages.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Command::Apply => "applied",
            Command::Get => "retrieved",
            Command::Describe => "described",
            Command::Delete => "deleted",
            Command::Deploy => "deployed",
            Command::Undeploy => "undeployed",
            Command::Logs => "retrieved",
            Command::Chat => "accepted",
            Command::Schema => "generated",
            Command::ExampleManifest => "generated",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apply" => Ok(Command::Apply),
            "get" => Ok(Command::Get),
            "describe" => Ok(Command::Describe),
            "delete" => Ok(Command::Delete),
            "deploy" => Ok(Command::Deploy),
            "undeploy" => Ok(Command::Undeploy),
            "logs" => Ok(Command::Logs),
            "chat" => Ok(Command::Chat),
            "schema" => Ok(Command::Schema),
            "example_manifest" | "example-manifest" => Ok(Command::ExampleManifest),
            _ => Err(format!("unknown command: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_roundtrip() {
        for command in Command::ALL {
            assert_eq!(Command::from_str(command.as_str()).unwrap(), command);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Command::ExampleManifest).unwrap();
        assert_eq!(json, "\"example_manifest\"");
    }

    #[test]
    fn test_past_tense() {
        assert_eq!(Command::Apply.past_tense(), "applied");
        assert_eq!(Command::Delete.past_tense(), "deleted");
        assert_eq!(Command::Undeploy.past_tense(), "undeployed");
    }
}
