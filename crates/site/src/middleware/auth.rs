//! Authentication gate and extractors.
//!
//! The gate runs on every request. It reads the `jwt` cookie, verifies it,
//! and stores the resulting [`Identity`] in request extensions:
//!
//! 1. No cookie: anonymous, continue.
//! 2. Cookie verifies: logged in, continue.
//! 3. Cookie fails to verify: clear it, queue "Please log in.", redirect to
//!    the login page. The handler never runs.
//!
//! Route handlers then state their policy by extractor: [`RequireLogin`] or
//! [`RequireEmployee`]. Pages that only adapt to login state read
//! [`CurrentIdentity`] through the `Page` extractor. Extractors never touch
//! the store.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, IntoResponseParts, Redirect, Response, ResponseParts},
};
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use crate::middleware::session::push_notice;
use crate::models::{Identity, IdentityClaims};
use crate::services::{TokenService, VerificationError};
use crate::state::AppState;

/// Identity token cookie name.
pub const TOKEN_COOKIE_NAME: &str = "jwt";

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/account/login";

/// Where logged-in requests lacking a role are sent.
pub const ACCOUNT_PATH: &str = "/account/";

pub const LOGIN_NOTICE: &str = "Please log in.";
pub const EMPLOYEE_NOTICE: &str = "You do not have permission to access inventory management.";

// =============================================================================
// Cookie helpers
// =============================================================================

/// Read the identity token from the request's `Cookie` headers.
///
/// An empty value counts as absent.
#[must_use]
pub fn read_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == TOKEN_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Cookie carrying a freshly issued token.
#[must_use]
pub fn token_cookie(token: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE_NAME, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .build()
}

/// Cookie that tells the browser to drop the token.
#[must_use]
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = token_cookie(String::new(), 0, secure);
    cookie.make_removal();
    cookie
}

/// Response part appending one `Set-Cookie` header.
#[derive(Debug, Clone)]
pub struct SetCookie(pub Cookie<'static>);

impl SetCookie {
    /// Set the token cookie for `token` using the site's lifetime and `Secure` policy.
    #[must_use]
    pub fn token(state: &AppState, token: String) -> Self {
        Self(token_cookie(
            token,
            state.tokens().ttl_seconds(),
            state.config().secure_cookies(),
        ))
    }

    /// Clear the token cookie.
    #[must_use]
    pub fn removal(state: &AppState) -> Self {
        Self(removal_cookie(state.config().secure_cookies()))
    }
}

impl IntoResponseParts for SetCookie {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Ok(value) = HeaderValue::from_str(&self.0.to_string()) {
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}

// =============================================================================
// Gate
// =============================================================================

/// What the gate concluded from the presented cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Anonymous,
    Authenticated(IdentityClaims),
    Rejected(VerificationError),
}

/// Decide the request identity from an optional token.
#[must_use]
pub fn resolve_identity(tokens: &TokenService, token: Option<&str>) -> GateOutcome {
    match token {
        None => GateOutcome::Anonymous,
        Some(token) => match tokens.verify(token) {
            Ok(claims) => GateOutcome::Authenticated(claims),
            Err(err) => GateOutcome::Rejected(err),
        },
    }
}

/// Middleware establishing the request [`Identity`].
///
/// Requires the session layer to run first.
pub async fn auth_gate(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let token = read_token(request.headers());

    let identity = match resolve_identity(state.tokens(), token.as_deref()) {
        GateOutcome::Anonymous => Identity::Anonymous,
        GateOutcome::Authenticated(claims) => {
            crate::error::set_sentry_user(&claims.account_id, Some(claims.account_email.as_str()));
            Identity::Account(claims)
        }
        GateOutcome::Rejected(reason) => {
            tracing::debug!(%reason, "Rejected identity token");
            if let Err(e) = push_notice(&session, LOGIN_NOTICE).await {
                tracing::warn!(error = %e, "Failed to queue login notice");
            }
            return (SetCookie::removal(&state), Redirect::to(LOGIN_PATH)).into_response();
        }
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

// =============================================================================
// Guards
// =============================================================================

/// Access policy a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Any logged-in account.
    LoggedIn,
    /// An `Employee` or `Admin` account.
    Elevated,
}

/// Why a guard refused the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardFailure {
    NotLoggedIn,
    NotElevated,
}

/// Check an identity against a policy.
///
/// # Errors
///
/// Returns the [`GuardFailure`] explaining the refusal.
pub fn authorize(identity: &Identity, policy: Policy) -> Result<&IdentityClaims, GuardFailure> {
    match (identity, policy) {
        (Identity::Anonymous, _) => Err(GuardFailure::NotLoggedIn),
        (Identity::Account(claims), Policy::Elevated) if !claims.is_elevated() => {
            Err(GuardFailure::NotElevated)
        }
        (Identity::Account(claims), _) => Ok(claims),
    }
}

/// Error returned when a guard refuses the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in.
    RedirectToLogin,
    /// Logged in without the required role.
    RedirectToAccount,
}

impl From<GuardFailure> for AuthRejection {
    fn from(failure: GuardFailure) -> Self {
        match failure {
            GuardFailure::NotLoggedIn => Self::RedirectToLogin,
            GuardFailure::NotElevated => Self::RedirectToAccount,
        }
    }
}

impl AuthRejection {
    const fn notice(&self) -> &'static str {
        match self {
            Self::RedirectToLogin => LOGIN_NOTICE,
            Self::RedirectToAccount => EMPLOYEE_NOTICE,
        }
    }

    const fn location(&self) -> &'static str {
        match self {
            Self::RedirectToLogin => LOGIN_PATH,
            Self::RedirectToAccount => ACCOUNT_PATH,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(self.location()).into_response()
    }
}

fn identity(parts: &Parts) -> Identity {
    parts.extensions.get::<Identity>().cloned().unwrap_or_default()
}

/// Apply `policy`, queueing the matching notice on refusal.
async fn guard(parts: &Parts, policy: Policy) -> Result<IdentityClaims, AuthRejection> {
    let identity = identity(parts);
    match authorize(&identity, policy) {
        Ok(claims) => Ok(claims.clone()),
        Err(failure) => {
            let rejection = AuthRejection::from(failure);
            if let Some(session) = parts.extensions.get::<Session>()
                && let Err(e) = push_notice(session, rejection.notice()).await
            {
                tracing::warn!(error = %e, "Failed to queue guard notice");
            }
            Err(rejection)
        }
    }
}

/// Extractor that requires a logged-in account.
///
/// # Example
///
/// ```rust,ignore
/// async fn management(RequireLogin(claims): RequireLogin) -> impl IntoResponse {
///     format!("Welcome {}", claims.account_firstname)
/// }
/// ```
pub struct RequireLogin(pub IdentityClaims);

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, Policy::LoggedIn).await.map(Self)
    }
}

/// Extractor that requires an `Employee` or `Admin` account.
pub struct RequireEmployee(pub IdentityClaims);

impl<S> FromRequestParts<S> for RequireEmployee
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, Policy::Elevated).await.map(Self)
    }
}

/// Extractor for the current identity. Never rejects.
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(identity(parts)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use cse_motors_core::{AccountId, AccountType, Email};
    use secrecy::SecretString;

    use super::*;

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::from("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n"), 3600).unwrap()
    }

    fn claims(account_type: AccountType) -> IdentityClaims {
        IdentityClaims {
            account_id: AccountId::new(2),
            account_firstname: "Basic".to_string(),
            account_lastname: "Client".to_string(),
            account_email: Email::parse("basic@340jr.net").unwrap(),
            account_type,
        }
    }

    #[test]
    fn test_read_token_finds_jwt_among_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("cse_session=abc; jwt=tok.en.value"));
        assert_eq!(read_token(&headers).as_deref(), Some("tok.en.value"));
    }

    #[test]
    fn test_read_token_absent_or_empty() {
        let mut headers = HeaderMap::new();
        assert!(read_token(&headers).is_none());
        headers.insert(COOKIE, HeaderValue::from_static("jwt="));
        assert!(read_token(&headers).is_none());
    }

    #[test]
    fn test_token_cookie_attributes() {
        let cookie = token_cookie("t".to_string(), 3600, true).to_string();
        assert!(cookie.starts_with("jwt=t"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));

        let dev = token_cookie("t".to_string(), 3600, false).to_string();
        assert!(!dev.contains("Secure"));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie(false).to_string();
        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_resolve_identity_states() {
        let tokens = tokens();
        assert_eq!(resolve_identity(&tokens, None), GateOutcome::Anonymous);

        let token = tokens.issue(&claims(AccountType::Client)).unwrap();
        assert_eq!(
            resolve_identity(&tokens, Some(&token)),
            GateOutcome::Authenticated(claims(AccountType::Client))
        );

        let stale = tokens
            .issue_at(
                &claims(AccountType::Client),
                Utc::now() - chrono::Duration::hours(2),
            )
            .unwrap();
        assert_eq!(
            resolve_identity(&tokens, Some(&stale)),
            GateOutcome::Rejected(VerificationError::Expired)
        );
        assert!(matches!(
            resolve_identity(&tokens, Some("garbage")),
            GateOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_authorize_policies() {
        let anonymous = Identity::Anonymous;
        assert_eq!(
            authorize(&anonymous, Policy::LoggedIn),
            Err(GuardFailure::NotLoggedIn)
        );
        assert_eq!(
            authorize(&anonymous, Policy::Elevated),
            Err(GuardFailure::NotLoggedIn)
        );

        let client = Identity::Account(claims(AccountType::Client));
        assert!(authorize(&client, Policy::LoggedIn).is_ok());
        assert_eq!(
            authorize(&client, Policy::Elevated),
            Err(GuardFailure::NotElevated)
        );

        for role in [AccountType::Employee, AccountType::Admin] {
            let staff = Identity::Account(claims(role));
            assert!(authorize(&staff, Policy::Elevated).is_ok());
        }
    }

    #[test]
    fn test_rejection_destinations() {
        assert_eq!(AuthRejection::RedirectToLogin.location(), "/account/login");
        assert_eq!(AuthRejection::RedirectToAccount.location(), "/account/");
    }

    #[tokio::test]
    async fn test_current_identity_defaults_to_anonymous() {
        let (mut parts, ()) = axum::http::Request::new(()).into_parts();
        let Ok(CurrentIdentity(identity)) = CurrentIdentity::from_request_parts(&mut parts, &()).await;
        assert_eq!(identity, Identity::Anonymous);

        parts
            .extensions
            .insert(Identity::Account(claims(AccountType::Employee)));
        let Ok(CurrentIdentity(identity)) = CurrentIdentity::from_request_parts(&mut parts, &()).await;
        assert_eq!(identity.claims(), Some(&claims(AccountType::Employee)));
    }
}
