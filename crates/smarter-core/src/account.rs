use crate::error::{CoreError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn account_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| regex::Regex::new(r"^\d{4}-\d{4}-\d{4}$").expect("valid pattern"))
}

/// Tenant scope identifier, `####-####-####`.
///
/// Every record and secret lookup is scoped by an account number; two tenants
/// can own resources with the same name without collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(number: impl Into<String>) -> Result<Self> {
        let number = number.into();
        if !account_pattern().is_match(&number) {
            return Err(CoreError::invalid_account_number(format!(
                "{number} (expected ####-####-####)"
            )));
        }
        Ok(Self(number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Role attached to the authenticated user of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
    Customer,
}

impl UserRole {
    /// Staff and admin users may run staff-restricted commands.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff)
    }
}

/// The resolved identity a command runs as.
///
/// Authentication itself happens upstream; the broker only consumes the
/// resolved `(account, user)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub role: UserRole,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_number_format() {
        assert!(AccountNumber::new("1234-5678-9012").is_ok());
        assert!(AccountNumber::new("1234-5678").is_err());
        assert!(AccountNumber::new("abcd-efgh-ijkl").is_err());
        assert!(AccountNumber::new("").is_err());
    }

    #[test]
    fn test_account_number_serde_is_transparent() {
        let account = AccountNumber::new("1234-5678-9012").unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, "\"1234-5678-9012\"");
        let parsed: AccountNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, account);
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Staff.is_staff());
        assert!(!UserRole::Customer.is_staff());
    }

    #[test]
    fn test_user_profile() {
        let user = UserProfile::new("ops", UserRole::Staff);
        assert!(user.is_staff());
        let user = UserProfile::new("alice", UserRole::Customer);
        assert!(!user.is_staff());
    }
}
