use crate::kinds::{
    ChatbotManifest, SecretManifest, SqlConnectionManifest, SqlPluginManifest,
    StaticPluginManifest,
};
use schemars::schema_for;
use serde_json::Value;
use smarter_core::ManifestKind;

/// JSON Schema for a kind's document type, served by the `schema` command.
pub fn schema_for_kind(kind: ManifestKind) -> Value {
    let schema = match kind {
        ManifestKind::SqlConnection => schema_for!(SqlConnectionManifest),
        ManifestKind::StaticPlugin => schema_for!(StaticPluginManifest),
        ManifestKind::SqlPlugin => schema_for!(SqlPluginManifest),
        ManifestKind::Chatbot => schema_for!(ChatbotManifest),
        ManifestKind::Secret => schema_for!(SecretManifest),
    };
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_schema() {
        for kind in ManifestKind::ALL {
            let schema = schema_for_kind(kind);
            assert!(schema.is_object(), "{kind} schema should be an object");
            let properties = &schema["properties"];
            assert!(properties.get("apiVersion").is_some());
            assert!(properties.get("metadata").is_some());
            assert!(properties.get("spec").is_some());
        }
    }

    #[test]
    fn test_sql_connection_schema_lists_secret_fields() {
        let schema = schema_for_kind(ManifestKind::SqlConnection);
        let rendered = schema.to_string();
        assert!(rendered.contains("dbEngine"));
        assert!(rendered.contains("password"));
        assert!(rendered.contains("poolSize"));
    }
}
