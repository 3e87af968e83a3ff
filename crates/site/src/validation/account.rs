//! Account forms.

use serde::Deserialize;

use cse_motors_core::Email;

use super::ValidationErrors;
use crate::models::{Account, IdentityClaims};
use crate::services::auth::password_meets_requirements;

const INVALID_EMAIL: &str = "A valid email is required.";
const WEAK_PASSWORD: &str = "Password does not meet requirements.";

/// Registration submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: String,
    pub account_password: String,
}

/// A registration that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: Email,
}

impl RegisterForm {
    /// Text-only rules. Returns the parsed email when it is well formed.
    pub(crate) fn check(&self) -> (ValidationErrors, Option<Email>) {
        let mut errors = ValidationErrors::new();
        check_names(&mut errors, &self.account_firstname, &self.account_lastname);
        let email = check_email(&mut errors, &self.account_email);
        errors.check(
            "account_password",
            password_meets_requirements(&self.account_password),
            WEAK_PASSWORD,
        );
        (errors, email)
    }
}

/// Login submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub account_email: String,
    pub account_password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&mut errors, &self.account_email);
        errors.check(
            "account_password",
            !self.account_password.is_empty(),
            "Password is required.",
        );
        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

/// Name and email update submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountUpdateForm {
    pub account_id: String,
    pub account_firstname: String,
    pub account_lastname: String,
    pub account_email: String,
}

impl AccountUpdateForm {
    pub(crate) fn check(&self) -> (ValidationErrors, Option<Email>) {
        let mut errors = ValidationErrors::new();
        check_names(&mut errors, &self.account_firstname, &self.account_lastname);
        let email = check_email(&mut errors, &self.account_email);
        (errors, email)
    }
}

impl From<&Account> for AccountUpdateForm {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id.to_string(),
            account_firstname: account.account_firstname.clone(),
            account_lastname: account.account_lastname.clone(),
            account_email: account.account_email.to_string(),
        }
    }
}

impl From<&IdentityClaims> for AccountUpdateForm {
    fn from(claims: &IdentityClaims) -> Self {
        Self {
            account_id: claims.account_id.to_string(),
            account_firstname: claims.account_firstname.clone(),
            account_lastname: claims.account_lastname.clone(),
            account_email: claims.account_email.to_string(),
        }
    }
}

/// Password change submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub account_id: String,
    pub account_password: String,
}

impl PasswordForm {
    /// # Errors
    ///
    /// Returns the violated rule if the password is too weak.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            "account_password",
            password_meets_requirements(&self.account_password),
            WEAK_PASSWORD,
        );
        errors.finish(|| ())
    }
}

fn check_names(errors: &mut ValidationErrors, first: &str, last: &str) {
    errors.check(
        "account_firstname",
        !first.trim().is_empty(),
        "Please provide a first name.",
    );
    errors.check(
        "account_lastname",
        last.trim().chars().count() >= 2,
        "Please provide a last name.",
    );
}

fn check_email(errors: &mut ValidationErrors, raw: &str) -> Option<Email> {
    let email = Email::parse(raw).ok();
    errors.check("account_email", email.is_some(), INVALID_EMAIL);
    email
}
