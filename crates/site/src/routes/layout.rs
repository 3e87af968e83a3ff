//! Shared page context.
//!
//! Every template extends `base.html`, which needs the classification nav,
//! any queued notices, and the current account for the header link. Handlers
//! take a [`Page`] extractor and call [`Page::layout`] to build that context.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::CurrentIdentity;
use crate::middleware::session::{push_notice, take_notices};
use crate::models::{Classification, Identity, IdentityClaims};
use crate::state::AppState;

/// Context rendered by `base.html`.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notices: Vec<String>,
    pub account: Option<IdentityClaims>,
}

impl Layout {
    /// Layout for pages rendered outside the normal handler flow.
    #[must_use]
    pub fn bare(title: impl Into<String>, nav: Vec<Classification>, identity: &Identity) -> Self {
        Self {
            title: title.into(),
            nav,
            notices: Vec::new(),
            account: identity.claims().cloned(),
        }
    }

    /// Whether the header should show the account links.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.account.is_some()
    }
}

/// Request context for rendering a page.
pub struct Page {
    pub state: AppState,
    pub session: Session,
    pub identity: Identity,
}

impl FromRequestParts<AppState> for Page {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;
        let Ok(CurrentIdentity(identity)) = CurrentIdentity::from_request_parts(parts, state).await;

        Ok(Self {
            state: state.clone(),
            session,
            identity,
        })
    }
}

impl Page {
    /// Queue a notice. It shows on the next page built with [`Page::layout`],
    /// which may be this one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be written.
    pub async fn notice(&self, message: impl Into<String>) -> Result<(), AppError> {
        push_notice(&self.session, message).await?;
        Ok(())
    }

    /// Build the layout, consuming queued notices.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the nav cannot be loaded.
    pub async fn layout(&self, title: impl Into<String>) -> Result<Layout, AppError> {
        let nav = self.state.inventory().get_classifications().await?;
        let notices = take_notices(&self.session).await?;

        Ok(Layout {
            title: title.into(),
            nav,
            notices,
            account: self.identity.claims().cloned(),
        })
    }

    /// Claims of the logged-in account, if any.
    #[must_use]
    pub const fn claims(&self) -> Option<&IdentityClaims> {
        self.identity.claims()
    }
}
