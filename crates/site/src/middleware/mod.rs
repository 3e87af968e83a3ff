//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request, recorded on the span)
//! 4. Session layer (signed cookie, flash notices)
//! 5. Auth gate (identity from the `jwt` cookie)
//! 6. Error page (render `ErrorReport` responses)

pub mod auth;
pub mod error_page;
pub mod request_id;
pub mod session;

pub use auth::{CurrentIdentity, RequireEmployee, RequireLogin, SetCookie, auth_gate};
pub use error_page::error_page;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
