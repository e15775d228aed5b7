use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Inline form of a secret binding: registers a new secret at apply time.
///
/// The `value` is consumed by the broker's get-or-create step and is never
/// persisted in the resource record nor rendered back in any response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InlineSecret {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A secret-bearing spec field.
///
/// Either a bare string naming an existing Secret in the tenant's scope, or
/// an inline `{name, value}` object whose plaintext is registered on first
/// use. Documents rendered by the broker always carry the name-only form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SecretBinding {
    Name(String),
    Inline(InlineSecret),
}

impl SecretBinding {
    /// The secret's name within the tenant scope.
    pub fn name(&self) -> &str {
        match self {
            SecretBinding::Name(name) => name,
            SecretBinding::Inline(inline) => &inline.name,
        }
    }

    /// The plaintext carried by an inline binding, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            SecretBinding::Name(_) => None,
            SecretBinding::Inline(inline) => Some(&inline.value),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SecretBinding::Name(_) => None,
            SecretBinding::Inline(inline) => inline.description.as_deref(),
        }
    }

    /// Name-only projection, used whenever a document is rendered back out.
    pub fn redacted(&self) -> SecretBinding {
        SecretBinding::Name(self.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_form() {
        let binding: SecretBinding = serde_json::from_str("\"db-password\"").unwrap();
        assert_eq!(binding.name(), "db-password");
        assert!(binding.value().is_none());
    }

    #[test]
    fn test_inline_form() {
        let binding: SecretBinding =
            serde_json::from_value(serde_json::json!({"name": "db-password", "value": "hunter2"}))
                .unwrap();
        assert_eq!(binding.name(), "db-password");
        assert_eq!(binding.value(), Some("hunter2"));
    }

    #[test]
    fn test_redacted_drops_value() {
        let binding = SecretBinding::Inline(InlineSecret {
            name: "db-password".into(),
            value: "hunter2".into(),
            description: None,
        });
        let redacted = binding.redacted();
        assert_eq!(redacted, SecretBinding::Name("db-password".into()));
        let json = serde_json::to_string(&redacted).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
