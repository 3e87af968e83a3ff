//! `PostgreSQL` review store.

use async_trait::async_trait;
use sqlx::PgPool;

use cse_motors_core::{InventoryId, ReviewId};

use super::{RepositoryError, ReviewStore, map_write_error};
use crate::models::{NewReview, Review};

/// Review store backed by the `review` table, joined to `account` for the
/// author's first name.
#[derive(Debug, Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn submit_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(
            r"
            WITH inserted AS (
                INSERT INTO review (review_text, review_rating, inv_id, account_id)
                VALUES ($1, $2, $3, $4)
                RETURNING review_id, review_text, review_rating, review_date, inv_id, account_id
            )
            SELECT r.review_id, r.review_text, r.review_rating, r.review_date,
                   r.inv_id, r.account_id, a.account_firstname
            FROM inserted AS r
            JOIN account AS a ON r.account_id = a.account_id
            ",
        )
        .bind(&review.review_text)
        .bind(review.review_rating)
        .bind(review.inv_id)
        .bind(review.account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "unknown vehicle or account"))
    }

    async fn get_reviews_by_inventory_id(
        &self,
        id: InventoryId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(
            r"
            SELECT r.review_id, r.review_text, r.review_rating, r.review_date,
                   r.inv_id, r.account_id, a.account_firstname
            FROM review AS r
            JOIN account AS a ON r.account_id = a.account_id
            WHERE r.inv_id = $1
            ORDER BY r.review_date DESC, r.review_id DESC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_review_by_review_id(
        &self,
        id: ReviewId,
    ) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, Review>(
            r"
            SELECT r.review_id, r.review_text, r.review_rating, r.review_date,
                   r.inv_id, r.account_id, a.account_firstname
            FROM review AS r
            JOIN account AS a ON r.account_id = a.account_id
            WHERE r.review_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_review(&self, id: ReviewId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM review WHERE review_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
