//! Form validation.
//!
//! Each form is deserialized with every field as the raw submitted string so
//! a rejected submission can be echoed back verbatim. Validation either
//! produces the typed values a store call needs or a [`ValidationErrors`]
//! set, in which case the handler re-renders the originating form with the
//! submitted struct and the errors.
//!
//! Rules that only look at the submitted text live on the form types.
//! Rules that need the store (email or classification already taken) live on
//! [`Validator`] and run only when the field has no other errors.

pub mod account;
pub mod inventory;
pub mod review;

use thiserror::Error;

use cse_motors_core::Email;

use crate::db::{AccountStore, InventoryStore, RepositoryError};
use crate::models::AccountUpdate;

pub use account::{
    AccountUpdateForm, LoginForm, PasswordForm, RegisterForm, ValidRegistration,
};
pub use inventory::{ClassificationForm, InventoryDeleteForm, InventoryForm};
pub use review::{ReviewDeleteForm, ReviewForm, ValidReview};

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered `(field, message)` pairs for one submission. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record `message` against `field` unless `ok` holds. Returns `ok`.
    pub fn check(&mut self, field: &'static str, ok: bool, message: &str) -> bool {
        if !ok {
            self.push(field, message);
        }
        ok
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Messages in the order they were recorded.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }

    /// `Ok(value)` if nothing failed, otherwise the errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one rule failed.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Why a form could not be accepted.
#[derive(Debug, Error)]
pub enum FormError {
    /// The submission broke one or more rules.
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(ValidationErrors),

    /// A store lookup needed by a rule failed.
    #[error("validation lookup failed: {0}")]
    Store(#[from] RepositoryError),
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// Runs the rules that need store lookups.
pub struct Validator<'a> {
    accounts: &'a dyn AccountStore,
    inventory: &'a dyn InventoryStore,
}

impl<'a> Validator<'a> {
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountStore, inventory: &'a dyn InventoryStore) -> Self {
        Self {
            accounts,
            inventory,
        }
    }

    /// Validate a registration, including that the email is not taken.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Invalid` with every violated rule, or
    /// `FormError::Store` if the email lookup fails.
    pub async fn registration(&self, form: &RegisterForm) -> Result<ValidRegistration, FormError> {
        let (mut errors, email) = form.check();
        if let Some(email) = &email
            && self.accounts.check_existing_email(email).await?
        {
            errors.push(
                "account_email",
                "Email exists. Please log in or use different email",
            );
        }

        match email {
            Some(account_email) if errors.is_empty() => Ok(ValidRegistration {
                account_firstname: form.account_firstname.trim().to_string(),
                account_lastname: form.account_lastname.trim().to_string(),
                account_email,
            }),
            _ => Err(FormError::Invalid(errors)),
        }
    }

    /// Validate an account update for the account currently using
    /// `current_email`. The email is only checked for uniqueness if it changed.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Invalid` with every violated rule, or
    /// `FormError::Store` if the email lookup fails.
    pub async fn account_update(
        &self,
        form: &AccountUpdateForm,
        account_id: cse_motors_core::AccountId,
        current_email: &Email,
    ) -> Result<AccountUpdate, FormError> {
        let (mut errors, email) = form.check();
        if let Some(email) = &email
            && email != current_email
            && self.accounts.check_existing_email(email).await?
        {
            errors.push(
                "account_email",
                "Email exists. Please use a different email.",
            );
        }

        match email {
            Some(account_email) if errors.is_empty() => Ok(AccountUpdate {
                account_id,
                account_firstname: form.account_firstname.trim().to_string(),
                account_lastname: form.account_lastname.trim().to_string(),
                account_email,
            }),
            _ => Err(FormError::Invalid(errors)),
        }
    }

    /// Validate a new classification name, including that it is not taken.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Invalid` with every violated rule, or
    /// `FormError::Store` if the name lookup fails.
    pub async fn classification(&self, form: &ClassificationForm) -> Result<String, FormError> {
        let name = form.check()?;
        if self.inventory.check_existing_classification(&name).await? {
            let mut errors = ValidationErrors::new();
            errors.push(
                "classification_name",
                "Classification name already exists. Please choose a different name.",
            );
            return Err(FormError::Invalid(errors));
        }
        Ok(name)
    }
}
