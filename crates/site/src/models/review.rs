//! Vehicle reviews.

use chrono::{DateTime, Utc};

use cse_motors_core::{AccountId, InventoryId, ReviewId};

/// A review joined with its author's first name.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Review {
    pub review_id: ReviewId,
    pub review_text: String,
    pub review_rating: i32,
    pub review_date: DateTime<Utc>,
    pub inv_id: InventoryId,
    pub account_id: AccountId,
    pub account_firstname: String,
}

impl Review {
    /// "March 4, 2025"
    #[must_use]
    pub fn date_display(&self) -> String {
        self.review_date.format("%B %-d, %Y").to_string()
    }

    /// Whether the given account wrote this review.
    #[must_use]
    pub fn is_authored_by(&self, account_id: AccountId) -> bool {
        self.account_id == account_id
    }
}

/// A validated review ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub review_text: String,
    pub review_rating: i32,
    pub inv_id: InventoryId,
    pub account_id: AccountId,
}
