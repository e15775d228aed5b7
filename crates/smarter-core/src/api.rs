use crate::error::CoreError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Manifest api version enumeration.
///
/// A broker declares the set of versions it accepts; anything outside the set
/// is rejected at parse time, before persistence is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ApiVersion {
    #[serde(rename = "smarter.sh/v1")]
    V1,
}

impl ApiVersion {
    /// Versions the current broker generation is compatible with.
    pub const COMPATIBLE: [ApiVersion; 1] = [ApiVersion::V1];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "smarter.sh/v1",
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        ApiVersion::V1
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smarter.sh/v1" => Ok(ApiVersion::V1),
            _ => Err(CoreError::invalid_api_version(s)),
        }
    }
}
