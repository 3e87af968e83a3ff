//! HTTP route handlers for the dealership site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Home page
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Readiness check (store ping)
//! GET  /static/*                           - Static files
//!
//! # Inventory
//! GET  /inv/type/{classification_id}       - Vehicles in a classification
//! GET  /inv/detail/{inv_id}                - Vehicle detail with reviews
//! GET  /inv/trigger-error                  - Intentional 500
//!
//! # Inventory management (employee or admin)
//! GET  /inv/                               - Management view
//! GET  /inv/add-classification             - New classification form
//! POST /inv/add-classification             - Create classification
//! GET  /inv/add-inventory                  - New vehicle form
//! POST /inv/add-inventory                  - Create vehicle
//! GET  /inv/getInventory/{classification_id} - Vehicles as JSON for the management table
//! GET  /inv/edit/{inv_id}                  - Edit vehicle form
//! POST /inv/update                         - Update vehicle
//! GET  /inv/delete/{inv_id}                - Delete confirmation
//! POST /inv/delete                         - Delete vehicle
//!
//! # Account
//! GET  /account/login                      - Login form
//! POST /account/login                      - Login action (sets the `jwt` cookie)
//! GET  /account/register                   - Registration form
//! POST /account/register                   - Registration action
//! GET  /account/logout                     - Clear the `jwt` cookie
//! GET  /account/                           - Account management (login)
//! GET  /account/update/{account_id}        - Update form (login, own account)
//! POST /account/update                     - Update name and email (login, own account)
//! POST /account/update-password            - Change password (login, own account)
//!
//! # Reviews (login)
//! POST /review/submit                      - Submit a review
//! GET  /review/delete/{review_id}          - Delete confirmation (author only)
//! POST /review/delete                      - Delete a review (author only)
//! ```

pub mod account;
pub mod home;
pub mod inventory;
pub mod layout;
pub mod review;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::error::{AppError, LOST_PAGE_MESSAGE};
use crate::middleware::{auth_gate, create_session_layer, error_page, request_id_middleware};
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// One `<option>` in a classification select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Build select options, marking the one whose id matches `selected`.
///
/// A submitted value matching no classification gets its own selected
/// option so a re-rendered form still shows it.
#[must_use]
pub fn classification_options(
    classifications: &[crate::models::Classification],
    selected: &str,
) -> Vec<ClassificationOption> {
    let wanted = selected.trim();
    let mut options: Vec<ClassificationOption> = classifications
        .iter()
        .map(|c| {
            let id = c.classification_id.to_string();
            ClassificationOption {
                selected: id == wanted,
                id,
                name: c.classification_name.clone(),
            }
        })
        .collect();
    if !wanted.is_empty() && !options.iter().any(|o| o.selected) {
        options.push(ClassificationOption {
            id: selected.to_string(),
            name: selected.to_string(),
            selected: true,
        });
    }
    options
}

/// Parse a path or form id, treating anything unparseable as missing.
///
/// # Errors
///
/// Returns `AppError::NotFound(not_found)` if `raw` is not a positive integer.
pub fn parse_id<T: From<i32>>(raw: &str, not_found: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(T::from)
        .ok_or_else(|| AppError::NotFound(not_found.to_string()))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inv/", get(inventory::management))
        .route("/inv/type/{classification_id}", get(inventory::by_classification))
        .route("/inv/detail/{inv_id}", get(inventory::detail))
        .route(
            "/inv/add-classification",
            get(inventory::add_classification_page).post(inventory::add_classification),
        )
        .route(
            "/inv/add-inventory",
            get(inventory::add_inventory_page).post(inventory::add_inventory),
        )
        .route(
            "/inv/getInventory/{classification_id}",
            get(inventory::inventory_json),
        )
        .route("/inv/edit/{inv_id}", get(inventory::edit_page))
        .route("/inv/update", post(inventory::update))
        .route("/inv/delete/{inv_id}", get(inventory::delete_page))
        .route("/inv/delete", post(inventory::delete))
        .route("/inv/trigger-error", get(inventory::trigger_error))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account/", get(account::management))
        .route(
            "/account/login",
            get(account::login_page).post(account::login),
        )
        .route(
            "/account/register",
            get(account::register_page).post(account::register),
        )
        .route("/account/logout", get(account::logout))
        .route("/account/update/{account_id}", get(account::update_page))
        .route("/account/update", post(account::update))
        .route("/account/update-password", post(account::update_password))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/review/submit", post(review::submit))
        .route("/review/delete/{review_id}", get(review::delete_page))
        .route("/review/delete", post(review::delete))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(inventory_routes())
        .merge(account_routes())
        .merge(review_routes())
}

/// Build the complete application router.
///
/// Page routes sit behind the session layer, the auth gate, and the error
/// page; health checks and static files do not. `session_store` holds flash
/// notices.
pub fn router<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config(), state.session_key());

    Router::new()
        .merge(routes())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), error_page))
        .layer(from_fn_with_state(state.clone(), auth_gate))
        .layer(session_layer)
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Unknown routes.
async fn not_found() -> AppError {
    AppError::NotFound(LOST_PAGE_MESSAGE.to_string())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if any store is unreachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let checks = tokio::join!(
        state.accounts().ping(),
        state.inventory().ping(),
        state.reviews().ping(),
    );
    match checks {
        (Ok(()), Ok(()), Ok(())) => StatusCode::OK,
        (a, i, r) => {
            for err in [a.err(), i.err(), r.err()].into_iter().flatten() {
                tracing::warn!(error = %err, "Readiness check failed");
            }
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
