//! Session middleware configuration and flash notices.
//!
//! The session only carries one-shot notices between a redirect and the
//! page it lands on. Identity lives in the `jwt` cookie, not here.

use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cse_session";

/// Session key holding pending notices.
pub const NOTICES_KEY: &str = "notices";

/// Session expiry time in seconds (1 day).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over any session store, signing the cookie with `key`.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &SiteConfig,
    key: Key,
) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.secure_cookies())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_notice(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut notices: Vec<String> = session.get(NOTICES_KEY).await?.unwrap_or_default();
    notices.push(message.into());
    session.insert(NOTICES_KEY, notices).await
}

/// Remove and return every queued notice.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_notices(session: &Session) -> Result<Vec<String>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<String>>(NOTICES_KEY)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_notices_are_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push_notice(&session, "first").await.unwrap();
        push_notice(&session, "second").await.unwrap();

        assert_eq!(take_notices(&session).await.unwrap(), vec!["first", "second"]);
        assert!(take_notices(&session).await.unwrap().is_empty());
    }
}
