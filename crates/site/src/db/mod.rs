//! Database operations for the dealership `PostgreSQL` store.
//!
//! # Tables
//!
//! - `account` - Site accounts with role and password hash
//! - `classification` - Vehicle categories
//! - `inventory` - Vehicles, each in one classification
//! - `review` - Vehicle reviews written by accounts
//! - `tower_sessions.session` - Flash notice storage
//!
//! Each table group sits behind a store trait so handlers can be driven by
//! in-memory stores in tests. Every operation is a single statement.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p cse-cli -- migrate
//! ```

pub mod accounts;
pub mod inventory;
pub mod reviews;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cse_motors_core::{AccountId, ClassificationId, Email, InventoryId, ReviewId};

use crate::models::{
    Account, AccountUpdate, AccountWithPassword, Classification, NewAccount, NewReview, Review,
    Vehicle, VehicleDraft,
};

pub use accounts::PgAccountStore;
pub use inventory::PgInventoryStore;
pub use reviews::PgReviewStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write matched no rows.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map constraint violations on a write to [`RepositoryError::Conflict`].
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(format!("{what}: {}", db_err.message()));
    }
    RepositoryError::Database(e)
}

/// Account table operations.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an account with its password hash for login.
    async fn get_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AccountWithPassword>, RepositoryError>;

    async fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Insert a new `Client` account.
    async fn register_account(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Replace name and email. Fails with `NotFound` if no row matched.
    async fn update_account(&self, update: AccountUpdate) -> Result<Account, RepositoryError>;

    /// Replace the password hash, returning the affected row count.
    async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<u64, RepositoryError>;

    async fn check_existing_email(&self, email: &Email) -> Result<bool, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Classification and inventory table operations.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All classifications ordered by name.
    async fn get_classifications(&self) -> Result<Vec<Classification>, RepositoryError>;

    async fn get_classification_by_id(
        &self,
        id: ClassificationId,
    ) -> Result<Option<Classification>, RepositoryError>;

    async fn get_inventory_by_classification_id(
        &self,
        id: ClassificationId,
    ) -> Result<Vec<Vehicle>, RepositoryError>;

    async fn get_inventory_by_id(&self, id: InventoryId)
    -> Result<Option<Vehicle>, RepositoryError>;

    async fn register_classification(
        &self,
        name: &str,
    ) -> Result<Classification, RepositoryError>;

    async fn register_inventory(&self, draft: VehicleDraft) -> Result<Vehicle, RepositoryError>;

    /// Replace every column of an inventory item. Fails with `NotFound` if no row matched.
    async fn update_inventory(
        &self,
        id: InventoryId,
        draft: VehicleDraft,
    ) -> Result<Vehicle, RepositoryError>;

    /// Delete an inventory item, returning the affected row count.
    async fn delete_inventory_item(&self, id: InventoryId) -> Result<u64, RepositoryError>;

    async fn check_existing_classification(&self, name: &str) -> Result<bool, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Review table operations.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn submit_review(&self, review: NewReview) -> Result<Review, RepositoryError>;

    /// Reviews for one vehicle, newest first.
    async fn get_reviews_by_inventory_id(
        &self,
        id: InventoryId,
    ) -> Result<Vec<Review>, RepositoryError>;

    async fn get_review_by_review_id(&self, id: ReviewId)
    -> Result<Option<Review>, RepositoryError>;

    /// Delete a review, returning the affected row count.
    async fn delete_review(&self, id: ReviewId) -> Result<u64, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;
}
