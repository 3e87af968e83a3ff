//! Account rows.

use cse_motors_core::{AccountId, AccountType, Email};

/// An account as shown to the rest of the site.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub account_id: AccountId,
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: Email,
    pub account_type: AccountType,
}

/// An account together with its password hash.
///
/// Only the login path loads this.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountWithPassword {
    #[sqlx(flatten)]
    pub account: Account,
    pub account_password: String,
}

/// Data for creating an account. Registration always creates a `Client`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: Email,
    pub password_hash: String,
}

/// Replacement values for an account's name and email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUpdate {
    pub account_id: AccountId,
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: Email,
}
