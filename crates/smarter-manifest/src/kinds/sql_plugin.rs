use crate::error::Violations;
use crate::kinds::static_plugin::{PluginPrompt, PluginSelector};
use crate::metadata::ManifestMetadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smarter_core::{ApiVersion, SmarterDateTime, validate_name};

/// Query definition for a SQL-backed plugin: the SqlConnection it runs
/// against, the statement, and optional bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlData {
    pub connection: String,
    pub sql_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SqlData {
    pub fn validate(&self, violations: &mut Violations) {
        if let Err(e) = validate_name(&self.connection) {
            violations.push("spec.sqlData.connection", e.to_string());
        }
        violations.ensure(
            !self.sql_query.trim().is_empty(),
            "spec.sqlData.sqlQuery",
            "Field required",
        );
        if let Some(limit) = self.limit {
            violations.ensure(limit > 0, "spec.sqlData.limit", "must be greater than 0");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlPluginSpec {
    pub selector: PluginSelector,
    pub prompt: PluginPrompt,
    pub sql_data: SqlData,
}

impl SqlPluginSpec {
    pub fn validate(&self, violations: &mut Violations) {
        violations.ensure(
            !self.selector.directive.is_empty(),
            "spec.selector.directive",
            "Field required",
        );
        self.prompt.validate(violations);
        self.sql_data.validate(violations);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlPluginStatus {
    pub created: SmarterDateTime,
    pub modified: SmarterDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlPluginManifest {
    pub api_version: ApiVersion,
    pub metadata: ManifestMetadata,
    pub spec: SqlPluginSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SqlPluginStatus>,
}

pub const EXAMPLE: &str = r#"apiVersion: smarter.sh/v1
kind: SqlPlugin
metadata:
  name: example-sql-plugin
  description: Answers order-status questions from the sales replica.
  version: 0.1.0
spec:
  selector:
    directive: order status
    searchTerms:
      - order
      - shipment
  prompt:
    provider: openai
    systemRole: You answer order status questions using query results.
    model: gpt-4o-mini
    temperature: 0.2
    maxTokens: 1024
  sqlData:
    connection: example-mysql
    sqlQuery: SELECT status, updated_at FROM orders WHERE order_id = %(order_id)s
    limit: 10
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SqlPluginSpec {
        SqlPluginSpec {
            selector: PluginSelector {
                directive: "order status".into(),
                search_terms: vec![],
            },
            prompt: PluginPrompt {
                provider: "openai".into(),
                system_role: "You answer order questions.".into(),
                model: "gpt-4o-mini".into(),
                temperature: 0.2,
                max_tokens: 1024,
            },
            sql_data: SqlData {
                connection: "example-mysql".into(),
                sql_query: "SELECT 1".into(),
                parameters: None,
                limit: Some(10),
            },
        }
    }

    fn validate(spec: &SqlPluginSpec) -> Result<(), crate::ValidationError> {
        let mut v = Violations::new();
        spec.validate(&mut v);
        v.finish()
    }

    #[test]
    fn test_valid_spec() {
        assert!(validate(&spec()).is_ok());
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut s = spec();
        s.sql_data.sql_query = "   ".into();
        let err = validate(&s).unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.sqlData.sqlQuery"]);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut s = spec();
        s.sql_data.limit = Some(0);
        let err = validate(&s).unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.sqlData.limit"]);
    }

    #[test]
    fn test_bad_connection_name_rejected() {
        let mut s = spec();
        s.sql_data.connection = "Not A Name".into();
        let err = validate(&s).unwrap_err();
        assert_eq!(err.field_paths(), vec!["spec.sqlData.connection"]);
    }
}
