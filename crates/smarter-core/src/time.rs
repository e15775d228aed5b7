use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Timezone-aware timestamp used throughout manifests and status blocks.
///
/// Wire form is RFC3339. Parsing a naive (offset-less) string fails, which is
/// what enforces the "dates must be timezone-aware" manifest rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SmarterDateTime(pub OffsetDateTime);

impl SmarterDateTime {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    pub fn inner(&self) -> &OffsetDateTime {
        &self.0
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }
}

impl fmt::Display for SmarterDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for SmarterDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
            .map_err(|e| {
                CoreError::invalid_date_time(format!("Failed to parse datetime '{s}': {e}"))
            })?;
        Ok(SmarterDateTime(datetime))
    }
}

impl From<OffsetDateTime> for SmarterDateTime {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

impl Serialize for SmarterDateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for SmarterDateTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SmarterDateTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for SmarterDateTime {
    fn schema_name() -> String {
        "SmarterDateTime".to_owned()
    }

    fn json_schema(_: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        schemars::schema::SchemaObject {
            instance_type: Some(schemars::schema::InstanceType::String.into()),
            format: Some("date-time".to_owned()),
            ..Default::default()
        }
        .into()
    }
}

pub fn now_utc() -> SmarterDateTime {
    SmarterDateTime(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_display() {
        let dt = SmarterDateTime::new(datetime!(2025-05-15 14:30:00 UTC));
        assert_eq!(dt.to_string(), "2025-05-15T14:30:00Z");
    }

    #[test]
    fn test_from_str_with_offset() {
        let dt = SmarterDateTime::from_str("2025-05-15T14:30:00+02:00").unwrap();
        let expected = datetime!(2025-05-15 12:30:00 UTC);
        assert_eq!(dt.0.to_offset(time::UtcOffset::UTC), expected);
    }

    #[test]
    fn test_naive_datetime_rejected() {
        assert!(SmarterDateTime::from_str("2025-05-15T14:30:00").is_err());
        assert!(SmarterDateTime::from_str("2025-05-15").is_err());
        assert!(SmarterDateTime::from_str("").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let dt = SmarterDateTime::new(datetime!(2025-05-15 14:30:00 UTC));
        let serialized = serde_json::to_string(&dt).unwrap();
        assert_eq!(serialized, "\"2025-05-15T14:30:00Z\"");
        let deserialized: SmarterDateTime = serde_json::from_str(&serialized).unwrap();
        assert_eq!(dt, deserialized);
    }

    #[test]
    fn test_ordering() {
        let earlier = SmarterDateTime::new(datetime!(2025-05-15 14:30:00 UTC));
        let later = SmarterDateTime::new(datetime!(2025-05-15 14:30:01 UTC));
        assert!(earlier < later);
    }

    #[test]
    fn test_now_utc_is_monotonic_enough() {
        let a = now_utc();
        let b = now_utc();
        assert!(b.0 >= a.0);
    }
}
