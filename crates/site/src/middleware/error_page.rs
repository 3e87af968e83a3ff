//! Uniform error view.
//!
//! Any response carrying an [`ErrorReport`] is re-rendered as the site's
//! error page. This is the last stop for a failed request, so it never fails
//! itself: a nav lookup error yields an empty nav and a template error falls
//! back to the plain message.

use askama::Template;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::error::ErrorReport;
use crate::filters;
use crate::middleware::request_id::RequestId;
use crate::models::Identity;
use crate::routes::layout::Layout;
use crate::state::AppState;

/// Error page template.
#[derive(Template)]
#[template(path = "errors/error.html")]
pub struct ErrorTemplate {
    pub layout: Layout,
    pub message: String,
    pub detail: Option<String>,
    pub request_id: Option<String>,
}

fn title_for(status: StatusCode) -> String {
    if status == StatusCode::NOT_FOUND {
        status.as_u16().to_string()
    } else {
        "Server Error".to_string()
    }
}

/// Middleware rendering [`ErrorReport`] responses as HTML.
pub async fn error_page(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or_default();
    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());

    let response = next.run(request).await;
    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let nav = match state.inventory().get_classifications().await {
        Ok(nav) => nav,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load nav for error page");
            Vec::new()
        }
    };

    let template = ErrorTemplate {
        layout: Layout::bare(title_for(report.status), nav, &identity),
        message: report.message.clone(),
        detail: report
            .detail
            .filter(|_| state.config().environment.is_development()),
        request_id,
    };

    match template.render() {
        Ok(html) => (report.status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            (report.status, report.message).into_response()
        }
    }
}
