//! `PostgreSQL` account store.

use async_trait::async_trait;
use sqlx::PgPool;

use cse_motors_core::{AccountId, Email};

use super::{AccountStore, RepositoryError, map_write_error};
use crate::models::{Account, AccountUpdate, AccountWithPassword, NewAccount};

/// Account store backed by the `account` table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AccountWithPassword>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithPassword>(
            r"
            SELECT account_id, account_firstname, account_lastname, account_email,
                   account_type, account_password
            FROM account
            WHERE account_email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, Account>(
            r"
            SELECT account_id, account_firstname, account_lastname, account_email, account_type
            FROM account
            WHERE account_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn register_account(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, Account>(
            r"
            INSERT INTO account (account_firstname, account_lastname, account_email, account_password)
            VALUES ($1, $2, $3, $4)
            RETURNING account_id, account_firstname, account_lastname, account_email, account_type
            ",
        )
        .bind(&account.account_firstname)
        .bind(&account.account_lastname)
        .bind(&account.account_email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "account email already exists"))
    }

    async fn update_account(&self, update: AccountUpdate) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, Account>(
            r"
            UPDATE account
            SET account_firstname = $1, account_lastname = $2, account_email = $3
            WHERE account_id = $4
            RETURNING account_id, account_firstname, account_lastname, account_email, account_type
            ",
        )
        .bind(&update.account_firstname)
        .bind(&update.account_lastname)
        .bind(&update.account_email)
        .bind(update.account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "account email already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE account SET account_password = $1 WHERE account_id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn check_existing_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM account WHERE account_email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
