use crate::error::Violations;
use crate::metadata::ManifestMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smarter_core::{ApiVersion, SmarterDateTime};

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f64 {
    0.5
}

fn default_max_tokens() -> u32 {
    2048
}

/// When a chat prompt activates this plugin: a directive phrase plus search
/// terms matched against the user's message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PluginSelector {
    pub directive: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_terms: Vec<String>,
}

/// Model parameters applied while the plugin is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PluginPrompt {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub system_role: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl PluginPrompt {
    pub fn validate(&self, violations: &mut Violations) {
        violations.ensure(
            (0.0..=2.0).contains(&self.temperature),
            "spec.prompt.temperature",
            "must be between 0 and 2",
        );
        violations.ensure(
            self.max_tokens > 0,
            "spec.prompt.maxTokens",
            "must be greater than 0",
        );
        violations.ensure(!self.model.is_empty(), "spec.prompt.model", "Field required");
        violations.ensure(
            !self.system_role.is_empty(),
            "spec.prompt.systemRole",
            "Field required",
        );
    }
}

/// The static payload this plugin returns when selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PluginData {
    pub description: String,
    pub static_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticPluginSpec {
    pub selector: PluginSelector,
    pub prompt: PluginPrompt,
    pub data: PluginData,
}

impl StaticPluginSpec {
    pub fn validate(&self, violations: &mut Violations) {
        violations.ensure(
            !self.selector.directive.is_empty(),
            "spec.selector.directive",
            "Field required",
        );
        self.prompt.validate(violations);
        violations.ensure(
            !self.data.description.is_empty(),
            "spec.data.description",
            "Field required",
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticPluginStatus {
    pub created: SmarterDateTime,
    pub modified: SmarterDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticPluginManifest {
    pub api_version: ApiVersion,
    pub metadata: ManifestMetadata,
    pub spec: StaticPluginSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StaticPluginStatus>,
}

pub const EXAMPLE: &str = r#"apiVersion: smarter.sh/v1
kind: StaticPlugin
metadata:
  name: example-static-plugin
  description: Returns company contact information on request.
  version: 0.1.0
spec:
  selector:
    directive: contact information
    searchTerms:
      - contact
      - support
      - email
  prompt:
    provider: openai
    systemRole: You are a helpful assistant for company contact questions.
    model: gpt-4o-mini
    temperature: 0.5
    maxTokens: 2048
  data:
    description: Company contact block.
    staticData:
      email: support@example.com
      phone: "+1-555-0100"
"#;
