//! Signed identity tokens.
//!
//! Tokens are HS256 JWTs carrying [`IdentityClaims`] plus `iat`/`exp`. They
//! are the whole session: nothing about a login is stored server-side, so a
//! token stays valid until it expires or the cookie holding it is replaced.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SiteConfig};
use crate::models::IdentityClaims;

/// Errors that can occur while issuing a token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Why a presented token was refused.
///
/// Callers treat every variant the same way; the distinction is for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    SignatureMismatch,
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::SignatureMismatch,
            _ => Self::Malformed,
        }
    }
}

/// Wire format of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(flatten)]
    claims: IdentityClaims,
    iat: i64,
    exp: i64,
}

/// Issues and verifies identity tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if the secret is empty and
    /// `ConfigError::InvalidEnvVar` if the lifetime is not positive.
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Result<Self, ConfigError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(ConfigError::MissingEnvVar(
                "CSE_ACCESS_TOKEN_SECRET".to_string(),
            ));
        }
        if ttl_seconds <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "token lifetime".to_string(),
                format!("must be positive, got {ttl_seconds}"),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    /// Create a token service from site configuration.
    ///
    /// # Errors
    ///
    /// See [`TokenService::new`].
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Self::new(&config.access_token_secret, config.token_ttl_seconds)
    }

    /// Token lifetime in whole seconds.
    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, claims: &IdentityClaims) -> Result<String, TokenError> {
        self.issue_at(claims, Utc::now())
    }

    /// Issue a token as if at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(
        &self,
        claims: &IdentityClaims,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let envelope = Envelope {
            claims: claims.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &envelope, &self.encoding)?)
    }

    /// Check a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns a [`VerificationError`] describing why the token was refused.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, VerificationError> {
        let data = decode::<Envelope>(token, &self.decoding, &self.validation)?;
        Ok(data.claims.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cse_motors_core::{AccountId, AccountType, Email};

    use super::*;
    use crate::config::TOKEN_TTL_SECONDS;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret), TOKEN_TTL_SECONDS).unwrap()
    }

    fn claims() -> IdentityClaims {
        IdentityClaims {
            account_id: AccountId::new(4),
            account_firstname: "Happy".to_string(),
            account_lastname: "Employee".to_string(),
            account_email: Email::parse("emp@340jr.net").unwrap(),
            account_type: AccountType::Employee,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n");
        let token = tokens.issue(&claims()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), claims());
    }

    #[test]
    fn test_payload_carries_role_and_expiry_but_no_password() {
        let tokens = service("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n");
        let issued_at = Utc::now();
        let token = tokens.issue_at(&claims(), issued_at).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let payload = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n"),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(payload["account_type"], "Employee");
        assert_eq!(payload["account_email"], "emp@340jr.net");
        assert_eq!(
            payload["exp"].as_i64().unwrap() - payload["iat"].as_i64().unwrap(),
            3600
        );
        assert!(payload.get("account_password").is_none());
    }

    #[test]
    fn test_expired_token_is_refused() {
        let tokens = service("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n");
        let long_ago = Utc::now() - Duration::seconds(TOKEN_TTL_SECONDS * 2);
        let token = tokens.issue_at(&claims(), long_ago).unwrap();
        assert_eq!(tokens.verify(&token), Err(VerificationError::Expired));
    }

    #[test]
    fn test_foreign_signature_is_refused() {
        let ours = service("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n");
        let theirs = service("Zq8@wE3#rT5$yU7%iO9^pA1&sD2*fG4!");
        let token = theirs.issue(&claims()).unwrap();
        assert_eq!(ours.verify(&token), Err(VerificationError::SignatureMismatch));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n");
        assert_eq!(tokens.verify("not-a-token"), Err(VerificationError::Malformed));
        assert_eq!(tokens.verify(""), Err(VerificationError::Malformed));
    }

    #[test]
    fn test_empty_secret_is_a_config_error() {
        let err = TokenService::new(&SecretString::from(""), TOKEN_TTL_SECONDS).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_ttl_is_one_hour() {
        assert_eq!(service("k9$Lm2#pQ7&rT0*uW4^zC6!aB3@xY8%n").ttl_seconds(), 3600);
    }
}
