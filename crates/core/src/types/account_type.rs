//! Account roles.

use serde::{Deserialize, Serialize};

/// Capability level of an account.
///
/// Serialized with the capitalized names stored in the `account_type`
/// database enum. Decoding is lenient: any unrecognized or missing value is
/// treated as a standard [`AccountType::Client`], so a token minted with an
/// unexpected role string can never grant elevated access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "account_type"))]
#[serde(from = "String")]
pub enum AccountType {
    /// Standard customer account.
    #[default]
    Client,
    /// Dealership staff; may manage inventory and classifications.
    Employee,
    /// Site administrator; everything an employee can do.
    Admin,
}

impl AccountType {
    /// Whether this role may reach inventory-management operations.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }

    /// The stored name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Employee => "Employee",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AccountType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "employee" => Ok(Self::Employee),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid account type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_roles() {
        assert!(!AccountType::Client.is_elevated());
        assert!(AccountType::Employee.is_elevated());
        assert!(AccountType::Admin.is_elevated());
    }

    #[test]
    fn test_serializes_capitalized_names() {
        assert_eq!(
            serde_json::to_string(&AccountType::Employee).unwrap(),
            "\"Employee\""
        );
    }

    #[test]
    fn test_unknown_role_decodes_as_client() {
        let role: AccountType = serde_json::from_str("\"Superuser\"").unwrap();
        assert_eq!(role, AccountType::Client);

        let role: AccountType = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, AccountType::Admin);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("employee".parse::<AccountType>(), Ok(AccountType::Employee));
        assert!("owner".parse::<AccountType>().is_err());
    }
}
