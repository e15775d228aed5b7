use crate::document::ManifestDocument;
use crate::error::{LoaderError, ValidationError};
use serde_json::Value;
use smarter_core::{ApiVersion, ManifestKind};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Where manifest text comes from. Exactly one source must be set.
#[derive(Debug, Default, Clone)]
pub struct LoaderSources {
    /// Inline manifest text (YAML or JSON).
    pub manifest: Option<String>,
    /// Path to a manifest file on disk.
    pub file_path: Option<PathBuf>,
    /// Remote manifest location.
    pub url: Option<url::Url>,
}

impl LoaderSources {
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            manifest: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn remote(url: url::Url) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

}

/// Parses raw manifest text and performs cursory structural validation before
/// any schema instantiation or persistence access.
///
/// Construction fails on malformed YAML/JSON, on a missing required top-level
/// key, on an unknown `kind`, or on an `apiVersion` outside the compatibility
/// set. A constructed loader is always `ready`.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    parsed: Value,
    kind: ManifestKind,
    api_version: ApiVersion,
    ready: bool,
}

const REQUIRED_KEYS: [&str; 4] = ["apiVersion", "kind", "metadata", "spec"];

impl ManifestLoader {
    /// Load from exactly one of the given sources.
    pub async fn load(sources: LoaderSources) -> Result<Self, LoaderError> {
        match (sources.manifest, sources.file_path, sources.url) {
            (Some(text), None, None) => Self::from_text(&text),
            (None, Some(path), None) => {
                debug!(path = %path.display(), "loading manifest from file");
                let text = std::fs::read_to_string(&path)?;
                Self::from_text(&text)
            }
            (None, None, Some(url)) => {
                debug!(%url, "fetching manifest");
                let text = reqwest::get(url).await?.error_for_status()?.text().await?;
                Self::from_text(&text)
            }
            (None, None, None) => Err(LoaderError::MissingSource),
            _ => Err(LoaderError::ConflictingSources),
        }
    }

    /// Parse inline YAML or JSON text.
    pub fn from_text(text: &str) -> Result<Self, LoaderError> {
        let parsed: Value = serde_yaml::from_str(text)
            .map_err(|e| LoaderError::parse(format!("not valid YAML or JSON: {e}")))?;
        Self::from_parsed(parsed)
    }

    /// Validate an already-parsed manifest dict.
    pub fn from_parsed(parsed: Value) -> Result<Self, LoaderError> {
        let document = parsed
            .as_object()
            .ok_or_else(|| LoaderError::parse("manifest must be a mapping"))?;

        for key in REQUIRED_KEYS {
            if !document.contains_key(key) {
                return Err(LoaderError::missing_key(key));
            }
        }
        let metadata = document["metadata"]
            .as_object()
            .ok_or_else(|| LoaderError::parse("metadata must be a mapping"))?;
        if !metadata.contains_key("name") {
            return Err(LoaderError::missing_key("metadata.name"));
        }

        let kind_str = document["kind"]
            .as_str()
            .ok_or_else(|| LoaderError::parse("kind must be a string"))?;
        let kind = ManifestKind::from_str(kind_str)
            .map_err(|e| LoaderError::UnknownKind(e.to_string()))?;

        let api_version_str = document["apiVersion"]
            .as_str()
            .ok_or_else(|| LoaderError::parse("apiVersion must be a string"))?;
        let api_version = ApiVersion::from_str(api_version_str)
            .map_err(|_| LoaderError::UnsupportedApiVersion(api_version_str.to_string()))?;

        Ok(Self {
            parsed,
            kind,
            api_version,
            ready: true,
        })
    }

    /// True once structural validation has passed.
    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn manifest_kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn manifest_api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn manifest_metadata(&self) -> &Value {
        &self.parsed["metadata"]
    }

    pub fn manifest_spec(&self) -> &Value {
        &self.parsed["spec"]
    }

    pub fn manifest_status(&self) -> Option<&Value> {
        self.parsed.get("status")
    }

    pub fn manifest_name(&self) -> &str {
        self.parsed["metadata"]["name"].as_str().unwrap_or_default()
    }

    pub fn parsed(&self) -> &Value {
        &self.parsed
    }

    /// Fail unless the loaded manifest is of the broker's kind.
    pub fn ensure_kind(&self, expected: ManifestKind) -> Result<(), LoaderError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(LoaderError::KindMismatch {
                expected: expected.to_string(),
                found: self.kind.to_string(),
            })
        }
    }

    /// Build and validate the typed document.
    pub fn document(&self) -> Result<ManifestDocument, ValidationError> {
        let document = ManifestDocument::from_value(self.parsed.clone())?;
        document.validate()?;
        Ok(document)
    }
}
