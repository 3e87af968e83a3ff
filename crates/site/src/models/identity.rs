//! Request identity derived from the signed token.

use serde::{Deserialize, Serialize};

use cse_motors_core::{AccountId, AccountType, Email};

use super::Account;

/// The account attributes embedded in an identity token.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub account_id: AccountId,
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: Email,
    #[serde(default)]
    pub account_type: AccountType,
}

impl IdentityClaims {
    /// Whether this identity may manage inventory.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        self.account_type.is_elevated()
    }
}

impl From<&Account> for IdentityClaims {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id,
            account_firstname: account.account_firstname.clone(),
            account_lastname: account.account_lastname.clone(),
            account_email: account.account_email.clone(),
            account_type: account.account_type,
        }
    }
}

/// Who is making the current request.
///
/// Established by the auth gate and stored in request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    Account(IdentityClaims),
}

impl Identity {
    #[must_use]
    pub const fn claims(&self) -> Option<&IdentityClaims> {
        match self {
            Self::Account(claims) => Some(claims),
            Self::Anonymous => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account(account_type: AccountType) -> Account {
        Account {
            account_id: AccountId::new(7),
            account_firstname: "Happy".to_string(),
            account_lastname: "Client".to_string(),
            account_email: Email::parse("happy@340jr.net").unwrap(),
            account_type,
        }
    }

    #[test]
    fn test_claims_from_account() {
        let claims = IdentityClaims::from(&account(AccountType::Employee));
        assert_eq!(claims.account_id, AccountId::new(7));
        assert_eq!(claims.account_firstname, "Happy");
        assert!(claims.is_elevated());
    }

    #[test]
    fn test_claims_missing_role_decode_as_client() {
        let json = r#"{"account_id":1,"account_firstname":"A","account_lastname":"B","account_email":"a@b.com"}"#;
        let claims: IdentityClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.account_type, AccountType::Client);
        assert!(!claims.is_elevated());
    }

    #[test]
    fn test_identity_accessors() {
        assert!(Identity::Anonymous.claims().is_none());

        let identity = Identity::Account(IdentityClaims::from(&account(AccountType::Client)));
        assert_eq!(identity.claims().unwrap().account_lastname, "Client");
    }
}
