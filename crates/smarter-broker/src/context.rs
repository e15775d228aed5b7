use smarter_core::{AccountNumber, UserProfile};

/// The resolved tenant/user context a broker instance runs under.
///
/// Authentication happens upstream; the broker consumes the resolved pair and
/// scopes every store access by `account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerContext {
    pub account: AccountNumber,
    pub user: UserProfile,
}

impl BrokerContext {
    pub fn new(account: AccountNumber, user: UserProfile) -> Self {
        Self { account, user }
    }

    pub fn is_staff(&self) -> bool {
        self.user.is_staff()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarter_core::UserRole;

    #[test]
    fn test_staff_passthrough() {
        let account = AccountNumber::new("1234-5678-9012").unwrap();
        let ctx = BrokerContext::new(account.clone(), UserProfile::new("ops", UserRole::Staff));
        assert!(ctx.is_staff());
        let ctx = BrokerContext::new(account, UserProfile::new("alice", UserRole::Customer));
        assert!(!ctx.is_staff());
    }
}
