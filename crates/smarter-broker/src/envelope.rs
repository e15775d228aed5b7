use crate::command::Command;
use crate::error::BrokerError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use smarter_core::{ApiVersion, ManifestKind};

/// Routing metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub command: Command,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Typed error payload carried under `data.error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub error_class: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub status: u16,
}

/// The uniform success/error wrapper returned by every broker command.
///
/// CLI and REST callers receive the same shape, so one error-rendering path
/// serves both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub api: ApiVersion,
    pub thing: ManifestKind,
    pub metadata: ResponseMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
}

impl CommandResponse {
    /// Success envelope with the command/kind templated message.
    pub fn success(
        kind: ManifestKind,
        command: Command,
        name: Option<&str>,
        data: Option<Value>,
    ) -> Self {
        Self {
            api: ApiVersion::default(),
            thing: kind,
            metadata: ResponseMetadata {
                command,
                count: None,
            },
            data,
            message: success_message(kind, command, name),
        }
    }

    /// Success envelope for queries, carrying the match count.
    pub fn success_with_count(
        kind: ManifestKind,
        command: Command,
        data: Value,
        count: usize,
    ) -> Self {
        Self {
            api: ApiVersion::default(),
            thing: kind,
            metadata: ResponseMetadata {
                command,
                count: Some(count),
            },
            data: Some(data),
            message: format!("{kind} query returned {count} result(s)"),
        }
    }

    /// Error envelope: the taxonomy's class name, description, status, and
    /// the cause chain as a stack trace.
    pub fn from_error(kind: ManifestKind, command: Command, error: &BrokerError) -> Self {
        let detail = ErrorDetail {
            error_class: error.error_class().to_string(),
            description: error.to_string(),
            stack_trace: cause_chain(error),
            status: error.status(),
        };
        Self {
            api: ApiVersion::default(),
            thing: kind,
            metadata: ResponseMetadata {
                command,
                count: None,
            },
            data: Some(json!({ "error": detail })),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error().is_none()
    }

    /// The error payload, if this is an error envelope.
    pub fn error(&self) -> Option<ErrorDetail> {
        let error_value = self.data.as_ref()?.get("error")?;
        serde_json::from_value(error_value.clone()).ok()
    }
}

fn success_message(kind: ManifestKind, command: Command, name: Option<&str>) -> String {
    let past = command.past_tense();
    match command {
        Command::Schema => format!("{kind} schema {past} successfully"),
        Command::ExampleManifest => format!("{kind} example manifest {past} successfully"),
        Command::Logs => match name {
            Some(name) => format!("{kind} {name} logs {past} successfully"),
            None => format!("{kind} logs {past} successfully"),
        },
        _ => match name {
            Some(name) => format!("{kind} {name} {past} successfully"),
            None => format!("{kind} {past} successfully"),
        },
    }
}

/// Render the error's cause chain for operator diagnosis.
fn cause_chain(error: &BrokerError) -> Option<String> {
    let mut lines = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
