use crate::error::{CoreError, Result};
use std::sync::OnceLock;

/// Maximum length for a resource name.
pub const NAME_MAX_LEN: usize = 64;

fn name_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[a-z0-9]([a-z0-9._-]*[a-z0-9])?$").expect("valid name pattern")
    })
}

/// Validate a resource name: the tenant-unique identity key of a manifest.
///
/// Names are lowercase alphanumerics with interior `.`, `_` or `-`, at most
/// [`NAME_MAX_LEN`] characters. The name is the only stable identity across
/// the document and persisted-record representations, so it is never
/// normalized silently.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CoreError::invalid_name("name must not be empty"));
    }
    if name.len() > NAME_MAX_LEN {
        return Err(CoreError::invalid_name(format!(
            "{name} exceeds {NAME_MAX_LEN} characters"
        )));
    }
    if !name_pattern().is_match(name) {
        return Err(CoreError::invalid_name(format!(
            "{name} (expected lowercase alphanumerics with '.', '_' or '-')"
        )));
    }
    Ok(())
}
