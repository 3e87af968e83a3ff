//! Password authentication.
//!
//! Passwords are hashed with Argon2id and a random salt; the encoded hash
//! (algorithm, parameters, salt, digest) is what the account table stores.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use cse_motors_core::{AccountId, Email};

use crate::db::AccountStore;
use crate::models::{Account, NewAccount};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Authentication service.
///
/// Handles registration, login, and password changes against an account store.
pub struct AuthService<'a> {
    accounts: &'a dyn AccountStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountStore) -> Self {
        Self { accounts }
    }

    /// Register a new `Client` account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Repository` if the insert fails (including a taken email).
    pub async fn register(
        &self,
        account_firstname: &str,
        account_lastname: &str,
        account_email: Email,
        password: &str,
    ) -> Result<Account, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .register_account(NewAccount {
                account_firstname: account_firstname.to_string(),
                account_lastname: account_lastname.to_string(),
                account_email,
                password_hash,
            })
            .await?;

        Ok(account)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        let found = self
            .accounts
            .get_account_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &found.account_password)?;

        Ok(found.account)
    }

    /// Replace an account's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AccountNotFound` if no row was updated.
    pub async fn change_password(&self, id: AccountId, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        match self.accounts.update_password(id, &password_hash).await? {
            0 => Err(AuthError::AccountNotFound),
            _ => Ok(()),
        }
    }
}

/// Whether a password satisfies the complexity rules: at least
/// [`MIN_PASSWORD_LENGTH`] characters with a digit, a lowercase letter, an
/// uppercase letter and a symbol, and no whitespace.
#[must_use]
pub fn password_meets_requirements(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(char::is_lowercase)
        && password.chars().any(char::is_uppercase)
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        && !password.chars().any(char::is_whitespace)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password_meets_requirements(password) {
        Ok(())
    } else {
        Err(AuthError::WeakPassword)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is unreadable or does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
