//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! cse-cli account set-role -e manager@340jr.net -r employee
//! ```
//!
//! # Environment Variables
//!
//! - `CSE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use cse_motors_core::{AccountType, Email};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: client, employee, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email {0}: {1}")]
    InvalidEmail(String, cse_motors_core::EmailError),

    /// No account uses the email.
    #[error("No account found with email: {0}")]
    NotFound(String),
}

/// Parse the command arguments.
fn parse_args(email: &str, role: &str) -> Result<(Email, AccountType), AccountError> {
    let role: AccountType = role
        .parse()
        .map_err(|_| AccountError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| AccountError::InvalidEmail(email.to_owned(), e))?;
    Ok((email, role))
}

/// Change the role of the account using `email`.
///
/// The account picks up the new role at its next login, when a fresh
/// identity token is issued.
///
/// # Errors
///
/// Returns `AccountError` if the arguments are invalid, the database is
/// unreachable, or no account uses the email.
pub async fn set_role(email: &str, role: &str) -> Result<(), AccountError> {
    let (email, role) = parse_args(email, role)?;

    let database_url =
        super::database_url().ok_or(AccountError::MissingEnvVar("CSE_DATABASE_URL"))?;

    tracing::info!("Connecting to site database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let updated = sqlx::query("UPDATE account SET account_type = $1 WHERE account_email = $2")
        .bind(role)
        .bind(&email)
        .execute(&pool)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(AccountError::NotFound(email.into_inner()));
    }

    tracing::info!(%email, %role, "Account role updated");
    Ok(())
}
