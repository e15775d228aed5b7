use crate::error::Violations;
use crate::metadata::ManifestMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smarter_core::{ApiVersion, SmarterDateTime};

/// Write-only secret payload.
///
/// `value` is consumed at apply time, encrypted into the secret store, and
/// never rendered back by `get` or `describe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<SmarterDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSpec {
    pub config: SecretConfig,
}

impl SecretSpec {
    pub fn validate(&self, violations: &mut Violations) {
        if let Some(value) = &self.config.value {
            violations.ensure(
                !value.is_empty(),
                "spec.config.value",
                "must not be empty when present",
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretStatus {
    pub created: SmarterDateTime,
    pub modified: SmarterDateTime,
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<SmarterDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretManifest {
    pub api_version: ApiVersion,
    pub metadata: ManifestMetadata,
    pub spec: SecretSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SecretStatus>,
}

pub const EXAMPLE: &str = r#"apiVersion: smarter.sh/v1
kind: Secret
metadata:
  name: example-api-key
  description: API key for the example upstream service.
  version: 0.1.0
spec:
  config:
    value: replace-me
    expiration: "2027-01-01T00:00:00Z"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_rejected() {
        let spec = SecretSpec {
            config: SecretConfig {
                value: Some(String::new()),
                expiration: None,
            },
        };
        let mut v = Violations::new();
        spec.validate(&mut v);
        let err = v.finish().unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.config.value"]);
    }

    #[test]
    fn test_absent_value_is_ok() {
        let spec = SecretSpec {
            config: SecretConfig {
                value: None,
                expiration: None,
            },
        };
        let mut v = Violations::new();
        spec.validate(&mut v);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_naive_expiration_rejected_at_parse() {
        let json = serde_json::json!({"config": {"expiration": "2027-01-01T00:00:00"}});
        let parsed = serde_json::from_value::<SecretSpec>(json);
        assert!(parsed.is_err());
        let msg = parsed.unwrap_err().to_string();
        assert!(msg.contains("2027-01-01T00:00:00"));
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = SecretStatus {
            created: smarter_core::now_utc(),
            modified: smarter_core::now_utc(),
            encrypted: true,
            last_accessed: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("lastAccessed").is_none());
        assert_eq!(json["encrypted"], true);
    }
}
