//! Review route handlers.
//!
//! All review routes require a logged-in account. Deleting checks that the
//! caller wrote the review before the store is asked to do anything.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use cse_motors_core::{InventoryId, ReviewId};

use super::inventory::render_detail;
use super::parse_id;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireLogin;
use crate::middleware::auth::ACCOUNT_PATH;
use crate::models::{IdentityClaims, NewReview, Review};
use crate::routes::layout::{Layout, Page};
use crate::validation::{ReviewDeleteForm, ReviewForm};

const DELETE_DENIED: &str = "Deletion failed: Authorization denied or review not found.";

/// Review delete confirmation.
#[derive(Template, WebTemplate)]
#[template(path = "review/delete-confirm.html")]
pub struct DeleteConfirmTemplate {
    pub layout: Layout,
    pub review: Review,
}

fn detail_path(inv_id: InventoryId) -> String {
    format!("/inv/detail/{inv_id}")
}

/// Submit a review for a vehicle.
///
/// A rejected review re-renders the vehicle detail page with the submitted
/// text and rating in place.
#[instrument(skip_all)]
pub async fn submit(
    RequireLogin(claims): RequireLogin,
    page: Page,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let inv_id: InventoryId = parse_id(&form.inv_id, "Sorry, we couldn't find that vehicle.")?;

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            page.notice("Review submission failed. Please check your entries.")
                .await?;
            return render_detail(&page, inv_id, form, errors, StatusCode::BAD_REQUEST).await;
        }
    };

    let review = NewReview {
        review_text: valid.review_text,
        review_rating: valid.review_rating,
        inv_id,
        account_id: claims.account_id,
    };
    match page.state.reviews().submit_review(review).await {
        Ok(review) => {
            tracing::info!(review_id = %review.review_id, %inv_id, "Review submitted");
            page.notice("Review submitted successfully.").await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, %inv_id, "Review submission failed");
            page.notice("Sorry, review submission failed.").await?;
        }
    }
    Ok(Redirect::to(&detail_path(inv_id)).into_response())
}

/// How a review relates to the caller.
enum Ownership {
    Missing,
    Foreign(Review),
    Own(Review),
}

async fn review_ownership(page: &Page, claims: &IdentityClaims, raw_id: &str) -> Result<Ownership> {
    let Ok(id) = parse_id::<ReviewId>(raw_id, "") else {
        return Ok(Ownership::Missing);
    };
    let ownership = match page.state.reviews().get_review_by_review_id(id).await? {
        None => Ownership::Missing,
        Some(review) if review.is_authored_by(claims.account_id) => Ownership::Own(review),
        Some(review) => Ownership::Foreign(review),
    };
    Ok(ownership)
}

/// Display the delete confirmation for the caller's own review.
#[instrument(skip(page, claims))]
pub async fn delete_page(
    RequireLogin(claims): RequireLogin,
    page: Page,
    Path(review_id): Path<String>,
) -> Result<Response> {
    match review_ownership(&page, &claims, &review_id).await? {
        Ownership::Missing => {
            page.notice("Review not found.").await?;
            Ok(Redirect::to(ACCOUNT_PATH).into_response())
        }
        Ownership::Foreign(review) => {
            tracing::warn!(
                review_id = %review.review_id,
                account_id = %claims.account_id,
                "Review delete view denied"
            );
            page.notice("Access Denied. You can only delete your own reviews.")
                .await?;
            Ok(Redirect::to(&detail_path(review.inv_id)).into_response())
        }
        Ownership::Own(review) => Ok(DeleteConfirmTemplate {
            layout: page.layout("Delete Review").await?,
            review,
        }
        .into_response()),
    }
}

/// Delete the caller's own review.
#[instrument(skip_all)]
pub async fn delete(
    RequireLogin(claims): RequireLogin,
    page: Page,
    Form(form): Form<ReviewDeleteForm>,
) -> Result<Redirect> {
    let review = match review_ownership(&page, &claims, &form.review_id).await? {
        Ownership::Own(review) => review,
        denied => {
            tracing::warn!(
                review_id = %form.review_id,
                account_id = %claims.account_id,
                "Review delete denied"
            );
            page.notice(DELETE_DENIED).await?;
            let location = match denied {
                Ownership::Foreign(review) => detail_path(review.inv_id),
                _ => ACCOUNT_PATH.to_string(),
            };
            return Ok(Redirect::to(&location));
        }
    };

    match page.state.reviews().delete_review(review.review_id).await {
        Ok(rows) if rows > 0 => {
            tracing::info!(review_id = %review.review_id, "Review deleted");
            page.notice("Review was successfully deleted.").await?;
        }
        outcome => {
            if let Err(e) = outcome {
                tracing::warn!(error = %e, review_id = %review.review_id, "Review delete failed");
            }
            page.notice("Review deletion failed (Server error).").await?;
        }
    }
    Ok(Redirect::to(&detail_path(review.inv_id)))
}
