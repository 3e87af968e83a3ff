//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Converting an `AppError` into a
//! response captures server errors to Sentry and attaches an [`ErrorReport`]
//! extension; the error page middleware turns that into the site's uniform
//! error view.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::TokenError;
use crate::services::auth::AuthError;
use crate::validation::FormError;

/// Message shown for every server error.
pub const CRASH_MESSAGE: &str = "Oh no! There was a crash. Maybe try a different route?";

/// Message shown for unknown routes.
pub const LOST_PAGE_MESSAGE: &str = "Sorry, we appear to have lost that page.";

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Store(#[from] RepositoryError),

    /// Token could not be issued.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Authentication operation failed unexpectedly.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Page rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found; the message is shown to the user verbatim.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Store(e) => Self::Store(e),
            FormError::Invalid(errors) => {
                Self::Internal(format!("unhandled validation failure: {errors:?}"))
            }
        }
    }
}

/// What the error page needs to render a failed request.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    /// Internal detail, only ever shown in development.
    pub detail: Option<String>,
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let (message, detail) = match self {
            Self::NotFound(message) => (message, None),
            other => (CRASH_MESSAGE.to_string(), Some(error_chain(&other))),
        };

        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorReport {
            status,
            message,
            detail,
        });
        response
    }
}

/// Render an error and its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an account ID.
///
/// Called by the auth gate so errors are associated with the account.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
