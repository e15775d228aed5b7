use crate::error::Violations;
use crate::metadata::ManifestMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smarter_core::{ApiVersion, SmarterDateTime, validate_name};

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f64 {
    0.5
}

fn default_max_tokens() -> u32 {
    2048
}

/// Desired state of a hosted chatbot: model defaults, the plugins it may
/// invoke, and where it is served once deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotSpec {
    pub app_name: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    pub system_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
}

impl ChatbotSpec {
    pub fn validate(&self, violations: &mut Violations) {
        violations.ensure(!self.app_name.is_empty(), "spec.appName", "Field required");
        violations.ensure(
            !self.default_model.is_empty(),
            "spec.defaultModel",
            "Field required",
        );
        violations.ensure(
            (0.0..=2.0).contains(&self.default_temperature),
            "spec.defaultTemperature",
            "must be between 0 and 2",
        );
        violations.ensure(
            self.default_max_tokens > 0,
            "spec.defaultMaxTokens",
            "must be greater than 0",
        );
        if let Some(subdomain) = &self.subdomain {
            if let Err(e) = validate_name(subdomain) {
                violations.push("spec.subdomain", e.to_string());
            }
        }
        if let Some(domain) = &self.custom_domain {
            if url::Host::parse(domain).is_err() {
                violations.push(
                    "spec.customDomain",
                    format!("'{domain}' is not a valid domain"),
                );
            }
        }
        for plugin in &self.plugins {
            if let Err(e) = validate_name(plugin) {
                violations.push("spec.plugins", e.to_string());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotStatus {
    pub created: SmarterDateTime,
    pub modified: SmarterDateTime,
    pub deployed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<url::Url>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotManifest {
    pub api_version: ApiVersion,
    pub metadata: ManifestMetadata,
    pub spec: ChatbotSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChatbotStatus>,
}

pub const EXAMPLE: &str = r#"apiVersion: smarter.sh/v1
kind: Chatbot
metadata:
  name: example-chatbot
  description: Customer support chatbot for the example storefront.
  version: 0.1.0
spec:
  appName: Example Support
  provider: openai
  defaultModel: gpt-4o-mini
  defaultTemperature: 0.5
  defaultMaxTokens: 2048
  systemRole: You are the Example Support assistant.
  subdomain: example-support
  plugins:
    - example-static-plugin
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ChatbotSpec {
        ChatbotSpec {
            app_name: "Example Support".into(),
            provider: "openai".into(),
            default_model: "gpt-4o-mini".into(),
            default_temperature: 0.5,
            default_max_tokens: 2048,
            system_role: "You are helpful.".into(),
            subdomain: Some("example-support".into()),
            custom_domain: None,
            plugins: vec!["example-static-plugin".into()],
        }
    }

    fn validate(spec: &ChatbotSpec) -> Result<(), crate::ValidationError> {
        let mut v = Violations::new();
        spec.validate(&mut v);
        v.finish()
    }

    #[test]
    fn test_valid_spec() {
        assert!(validate(&spec()).is_ok());
    }

    #[test]
    fn test_bad_subdomain() {
        let mut s = spec();
        s.subdomain = Some("Bad Subdomain".into());
        let err = validate(&s).unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.subdomain"]);
    }

    #[test]
    fn test_bad_custom_domain() {
        let mut s = spec();
        s.custom_domain = Some("not a domain".into());
        let err = validate(&s).unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.customDomain"]);
    }

    #[test]
    fn test_temperature_bounds() {
        let mut s = spec();
        s.default_temperature = -0.1;
        assert!(validate(&s).is_err());
        s.default_temperature = 2.0;
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn test_bad_plugin_name() {
        let mut s = spec();
        s.plugins.push("NOT-VALID".into());
        let err = validate(&s).unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.plugins"]);
    }
}
