//! Role model and related functionality

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability level of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of account a credential belongs to
///
/// Only these two kinds can sign in, so a signed-in session can never carry
/// the guest role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    User,
    Admin,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Admin => "admin",
        }
    }
}

impl From<AccountKind> for Role {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::User => Role::User,
            AccountKind::Admin => Role::Admin,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(AccountKind::User),
            "admin" => Ok(AccountKind::Admin),
            other => Err(format!("unknown account kind `{}`", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_maps_to_role() {
        assert_eq!(Role::from(AccountKind::User), Role::User);
        assert_eq!(Role::from(AccountKind::Admin), Role::Admin);
        assert!(Role::from(AccountKind::Admin).is_admin());
        assert!(!Role::default().is_admin());
    }

    #[test]
    fn test_account_kind_parsing() {
        assert_eq!("Admin".parse::<AccountKind>(), Ok(AccountKind::Admin));
        assert_eq!(" user ".parse::<AccountKind>(), Ok(AccountKind::User));
        assert!("guest".parse::<AccountKind>().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<AccountKind>("\"user\"").unwrap(),
            AccountKind::User
        );
    }
}
