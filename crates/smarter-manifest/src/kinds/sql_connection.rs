use crate::error::Violations;
use crate::metadata::ManifestMetadata;
use crate::secret_binding::SecretBinding;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smarter_core::{ApiVersion, SmarterDateTime};

/// Database engines a SqlConnection may target.
///
/// Wire identifiers are kept compatible with manifests written against the
/// original platform, so existing documents apply unchanged.
pub const SUPPORTED_ENGINES: [&str; 4] = [
    "django.db.backends.mysql",
    "django.db.backends.postgresql",
    "django.db.backends.sqlite3",
    "django.db.backends.oracle",
];

/// URL scheme used when constructing a connection string for an engine.
fn engine_scheme(engine: &str) -> Option<&'static str> {
    match engine {
        "django.db.backends.mysql" => Some("mysql"),
        "django.db.backends.postgresql" => Some("postgresql"),
        "django.db.backends.sqlite3" => Some("sqlite"),
        "django.db.backends.oracle" => Some("oracle"),
        _ => None,
    }
}

fn default_pool_size() -> u32 {
    5
}

fn default_max_overflow() -> u32 {
    10
}

fn default_timeout() -> u32 {
    30
}

/// Desired state of one tenant database connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlConnectionSpec {
    pub db_engine: String,
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: SecretBinding,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_max_overflow")]
    pub max_overflow: u32,
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_password: Option<SecretBinding>,
}

impl SqlConnectionSpec {
    pub fn validate(&self, violations: &mut Violations) {
        if !SUPPORTED_ENGINES.contains(&self.db_engine.as_str()) {
            violations.push(
                "spec.dbEngine",
                format!(
                    "'{}' is not a supported engine (expected one of: {})",
                    self.db_engine,
                    SUPPORTED_ENGINES.join(", ")
                ),
            );
        }
        if url::Host::parse(&self.hostname).is_err() {
            violations.push(
                "spec.hostname",
                format!("'{}' is not a valid domain or IP address", self.hostname),
            );
        }
        violations.ensure(self.port != 0, "spec.port", "must be in 1..=65535");
        violations.ensure(!self.username.is_empty(), "spec.username", "Field required");
        violations.ensure(!self.database.is_empty(), "spec.database", "Field required");
        violations.ensure(self.pool_size > 0, "spec.poolSize", "must be greater than 0");
        violations.ensure(self.timeout > 0, "spec.timeout", "must be greater than 0");
        if let Some(port) = self.proxy_port {
            violations.ensure(port != 0, "spec.proxyPort", "must be in 1..=65535");
        }
        if let Some(host) = &self.proxy_host {
            if url::Host::parse(host).is_err() {
                violations.push(
                    "spec.proxyHost",
                    format!("'{host}' is not a valid domain or IP address"),
                );
            }
        }
    }

    /// Construct the engine connection URL, credentials elided.
    ///
    /// Success is what `status.isValid` reports; the plaintext password never
    /// participates, only the engine/host/port/database coordinates.
    pub fn connection_url(&self) -> Option<url::Url> {
        let scheme = engine_scheme(&self.db_engine)?;
        let rendered = format!(
            "{scheme}://{}@{}:{}/{}",
            self.username, self.hostname, self.port, self.database
        );
        url::Url::parse(&rendered).ok()
    }
}

/// Server-populated state of a SqlConnection, derived from the persisted
/// record at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlConnectionStatus {
    pub created: SmarterDateTime,
    pub modified: SmarterDateTime,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<SmarterDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlConnectionManifest {
    pub api_version: ApiVersion,
    pub metadata: ManifestMetadata,
    pub spec: SqlConnectionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SqlConnectionStatus>,
}

pub const EXAMPLE: &str = r#"apiVersion: smarter.sh/v1
kind: SqlConnection
metadata:
  name: example-mysql
  description: Example MySQL connection for the sales replica.
  version: 0.1.0
spec:
  dbEngine: django.db.backends.mysql
  hostname: mysql.example.com
  port: 3306
  username: smarter
  password: example-mysql-password
  database: sales
  poolSize: 15
  maxOverflow: 10
  timeout: 30
"#;
