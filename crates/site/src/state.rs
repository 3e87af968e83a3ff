//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;

use crate::config::{ConfigError, SiteConfig};
use crate::db::{
    AccountStore, InventoryStore, PgAccountStore, PgInventoryStore, PgReviewStore, ReviewStore,
};
use crate::services::TokenService;
use crate::services::auth::AuthService;
use crate::validation::Validator;

/// The store handles the site reads and writes through.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub reviews: Arc<dyn ReviewStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountStore::new(pool.clone())),
            inventory: Arc::new(PgInventoryStore::new(pool.clone())),
            reviews: Arc::new(PgReviewStore::new(pool.clone())),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Nothing in it changes after
/// startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    tokens: TokenService,
    session_key: Key,
    stores: Stores,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the token secret is unusable or the session
    /// secret is too short to derive a cookie signing key.
    pub fn new(config: SiteConfig, stores: Stores) -> Result<Self, ConfigError> {
        let tokens = TokenService::from_config(&config)?;
        let session_key = Key::try_from(config.session_secret.expose_secret().as_bytes())
            .map_err(|e| {
                ConfigError::InsecureSecret("CSE_SESSION_SECRET".to_string(), e.to_string())
            })?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                tokens,
                session_key,
                stores,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the identity token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Key used to sign the session cookie.
    #[must_use]
    pub fn session_key(&self) -> Key {
        self.inner.session_key.clone()
    }

    #[must_use]
    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.stores.accounts.as_ref()
    }

    #[must_use]
    pub fn inventory(&self) -> &dyn InventoryStore {
        self.inner.stores.inventory.as_ref()
    }

    #[must_use]
    pub fn reviews(&self) -> &dyn ReviewStore {
        self.inner.stores.reviews.as_ref()
    }

    /// Rules that need store lookups.
    #[must_use]
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(self.accounts(), self.inventory())
    }

    /// Password authentication against the account store.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.accounts())
    }
}
