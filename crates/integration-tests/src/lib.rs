//! Integration tests for the CSE Motors site.
//!
//! Each test spawns the full site router on an ephemeral port, backed by
//! [`MemoryStores`] instead of `PostgreSQL`, and drives it over HTTP with a
//! cookie-keeping [`reqwest::Client`] that does not follow redirects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cse-motors-integration-tests
//! ```
//!
//! # Fixtures
//!
//! | Account                | Role     | Password            |
//! |------------------------|----------|---------------------|
//! | `basic@340jr.net`      | Client   | [`CLIENT_PASSWORD`]   |
//! | `happy@340jr.net`      | Employee | [`EMPLOYEE_PASSWORD`] |
//! | `manager@340jr.net`    | Admin    | [`ADMIN_PASSWORD`]    |
//!
//! Classifications are seeded as in the site migrations. One vehicle
//! ([`CAMARO_ID`], Sport) carries one review written by the client.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{LOCATION, SET_COOKIE};
use reqwest::{Client, Response, redirect::Policy};
use rust_decimal::Decimal;
use secrecy::SecretString;

use cse_motors_core::{
    AccountId, AccountType, ClassificationId, Email, InventoryId, ReviewId,
};
use cse_motors_site::config::{Environment, SiteConfig, TOKEN_TTL_SECONDS};
use cse_motors_site::db::{AccountStore, InventoryStore, RepositoryError, ReviewStore};
use cse_motors_site::models::{
    Account, AccountUpdate, AccountWithPassword, Classification, IdentityClaims, NewAccount,
    NewReview, Review, Vehicle, VehicleDraft,
};
use cse_motors_site::routes;
use cse_motors_site::services::TokenService;
use cse_motors_site::state::{AppState, Stores};

pub const CLIENT_EMAIL: &str = "basic@340jr.net";
pub const CLIENT_PASSWORD: &str = "I@mABas1cCl1ent";
pub const EMPLOYEE_EMAIL: &str = "happy@340jr.net";
pub const EMPLOYEE_PASSWORD: &str = "I@mAnEmpl0y33";
pub const ADMIN_EMAIL: &str = "manager@340jr.net";
pub const ADMIN_PASSWORD: &str = "I@mAnAdm!n1strat0r";

pub const CLIENT_ID: AccountId = AccountId::new(1);
pub const EMPLOYEE_ID: AccountId = AccountId::new(2);
pub const SPORT_ID: ClassificationId = ClassificationId::new(3);
pub const CAMARO_ID: InventoryId = InventoryId::new(1);
pub const CLIENT_REVIEW_ID: ReviewId = ReviewId::new(1);

/// Token signing secret shared with [`TestApp::tokens`].
pub const TOKEN_SECRET: &str = "q8Z!m2Kd#7vLp$R4xW9^tN6@bF3&hJ1*";
const SESSION_SECRET: &str =
    "Xk4#pL9!vR2@mQ7$wT5^zN8&cB3*hJ6%dF1(gY0)sA4-eU7+iO2=aK5~nM8?lP3;";

// =============================================================================
// In-memory stores
// =============================================================================

#[derive(Default)]
struct Tables {
    accounts: Vec<(Account, String)>,
    classifications: Vec<Classification>,
    inventory: Vec<(InventoryId, VehicleDraft)>,
    reviews: Vec<Review>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn vehicle(&self, id: InventoryId, draft: &VehicleDraft) -> Vehicle {
        let classification_name = self
            .classifications
            .iter()
            .find(|c| c.classification_id == draft.classification_id)
            .map(|c| c.classification_name.clone())
            .unwrap_or_default();
        Vehicle {
            inv_id: id,
            inv_make: draft.inv_make.clone(),
            inv_model: draft.inv_model.clone(),
            inv_year: draft.inv_year,
            inv_description: draft.inv_description.clone(),
            inv_image: draft.inv_image.clone(),
            inv_thumbnail: draft.inv_thumbnail.clone(),
            inv_price: draft.inv_price,
            inv_miles: draft.inv_miles,
            inv_color: draft.inv_color.clone(),
            classification_id: draft.classification_id,
            classification_name,
        }
    }
}

/// All three stores over shared in-memory tables, counting every call.
#[derive(Default)]
pub struct MemoryStores {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStores {
    /// Stores holding the fixture rows.
    #[must_use]
    pub fn seeded() -> Self {
        let stores = Self::default();
        {
            let mut t = stores.tables();
            for (id, name) in (1..).zip(["Custom", "Sedan", "Sport", "SUV", "Truck"]) {
                t.classifications.push(Classification {
                    classification_id: ClassificationId::new(id),
                    classification_name: name.to_string(),
                });
            }
            let accounts = [
                ("Basic", "Client", CLIENT_EMAIL, CLIENT_PASSWORD, AccountType::Client),
                ("Happy", "Employee", EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD, AccountType::Employee),
                ("Manager", "Admin", ADMIN_EMAIL, ADMIN_PASSWORD, AccountType::Admin),
            ];
            for (id, (first, last, email, password, role)) in (1..).zip(accounts) {
                t.accounts.push((
                    Account {
                        account_id: AccountId::new(id),
                        account_firstname: first.to_string(),
                        account_lastname: last.to_string(),
                        account_email: Email::parse(email).unwrap(),
                        account_type: role,
                    },
                    fast_hash(password),
                ));
            }
            t.inventory.push((CAMARO_ID, camaro()));
            t.reviews.push(Review {
                review_id: CLIENT_REVIEW_ID,
                review_text: "Fast and loud, just as promised.".to_string(),
                review_rating: 5,
                review_date: Utc::now(),
                inv_id: CAMARO_ID,
                account_id: CLIENT_ID,
                account_firstname: "Basic".to_string(),
            });
            t.next_id = 100;
        }
        stores
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn record(&self, name: &'static str) -> Result<(), RepositoryError> {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
        if *self.fail_writes.lock().unwrap() && is_write(name) {
            return Err(RepositoryError::Conflict("writes disabled".to_string()));
        }
        Ok(())
    }

    /// How many times the named store operation ran.
    #[must_use]
    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// Make every write operation fail from now on.
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Snapshot of a stored account.
    #[must_use]
    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.tables()
            .accounts
            .iter()
            .find(|(a, _)| a.account_id == id)
            .map(|(a, _)| a.clone())
    }

    /// Snapshot of a stored review.
    #[must_use]
    pub fn review(&self, id: ReviewId) -> Option<Review> {
        self.tables()
            .reviews
            .iter()
            .find(|r| r.review_id == id)
            .cloned()
    }

    /// Snapshot of a stored vehicle.
    #[must_use]
    pub fn vehicle(&self, id: InventoryId) -> Option<Vehicle> {
        let t = self.tables();
        t.inventory
            .iter()
            .find(|(vid, _)| *vid == id)
            .map(|(vid, draft)| t.vehicle(*vid, draft))
    }

    /// Names of every stored classification.
    #[must_use]
    pub fn classification_names(&self) -> Vec<String> {
        self.tables()
            .classifications
            .iter()
            .map(|c| c.classification_name.clone())
            .collect()
    }
}

fn is_write(name: &str) -> bool {
    name.starts_with("register")
        || name.starts_with("update")
        || name.starts_with("delete")
        || name == "submit_review"
}

/// Argon2id with tiny parameters so fixtures hash quickly. Verification
/// reads the parameters from the hash, so the site accepts these.
fn fast_hash(password: &str) -> String {
    let params = Params::new(1024, 1, 1, None).unwrap();
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// The fixture vehicle.
#[must_use]
pub fn camaro() -> VehicleDraft {
    VehicleDraft {
        classification_id: SPORT_ID,
        inv_make: "Chevy".to_string(),
        inv_model: "Camaro".to_string(),
        inv_year: 2018,
        inv_description: "If you want to look cool this is the car you need.".to_string(),
        inv_image: "/images/vehicles/camaro.jpg".to_string(),
        inv_thumbnail: "/images/vehicles/camaro-tn.jpg".to_string(),
        inv_price: Decimal::new(25_000, 0),
        inv_miles: 101_222,
        inv_color: "Silver".to_string(),
    }
}

#[async_trait]
impl AccountStore for MemoryStores {
    async fn get_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AccountWithPassword>, RepositoryError> {
        self.record("get_account_by_email")?;
        Ok(self
            .tables()
            .accounts
            .iter()
            .find(|(a, _)| &a.account_email == email)
            .map(|(account, hash)| AccountWithPassword {
                account: account.clone(),
                account_password: hash.clone(),
            }))
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        self.record("get_account_by_id")?;
        Ok(self.account(id))
    }

    async fn register_account(&self, new: NewAccount) -> Result<Account, RepositoryError> {
        self.record("register_account")?;
        let mut t = self.tables();
        if t.accounts.iter().any(|(a, _)| a.account_email == new.account_email) {
            return Err(RepositoryError::Conflict("account email".to_string()));
        }
        let account = Account {
            account_id: AccountId::new(t.next_id()),
            account_firstname: new.account_firstname,
            account_lastname: new.account_lastname,
            account_email: new.account_email,
            account_type: AccountType::Client,
        };
        t.accounts.push((account.clone(), new.password_hash));
        Ok(account)
    }

    async fn update_account(&self, update: AccountUpdate) -> Result<Account, RepositoryError> {
        self.record("update_account")?;
        let mut t = self.tables();
        let (account, _) = t
            .accounts
            .iter_mut()
            .find(|(a, _)| a.account_id == update.account_id)
            .ok_or(RepositoryError::NotFound)?;
        account.account_firstname = update.account_firstname;
        account.account_lastname = update.account_lastname;
        account.account_email = update.account_email;
        Ok(account.clone())
    }

    async fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
    ) -> Result<u64, RepositoryError> {
        self.record("update_password")?;
        let mut t = self.tables();
        Ok(t.accounts
            .iter_mut()
            .find(|(a, _)| a.account_id == id)
            .map_or(0, |(_, hash)| {
                *hash = password_hash.to_string();
                1
            }))
    }

    async fn check_existing_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        self.record("check_existing_email")?;
        Ok(self.tables().accounts.iter().any(|(a, _)| &a.account_email == email))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStores {
    async fn get_classifications(&self) -> Result<Vec<Classification>, RepositoryError> {
        self.record("get_classifications")?;
        let mut all = self.tables().classifications.clone();
        all.sort_by(|a, b| a.classification_name.cmp(&b.classification_name));
        Ok(all)
    }

    async fn get_classification_by_id(
        &self,
        id: ClassificationId,
    ) -> Result<Option<Classification>, RepositoryError> {
        self.record("get_classification_by_id")?;
        Ok(self
            .tables()
            .classifications
            .iter()
            .find(|c| c.classification_id == id)
            .cloned())
    }

    async fn get_inventory_by_classification_id(
        &self,
        id: ClassificationId,
    ) -> Result<Vec<Vehicle>, RepositoryError> {
        self.record("get_inventory_by_classification_id")?;
        let t = self.tables();
        Ok(t.inventory
            .iter()
            .filter(|(_, draft)| draft.classification_id == id)
            .map(|(vid, draft)| t.vehicle(*vid, draft))
            .collect())
    }

    async fn get_inventory_by_id(
        &self,
        id: InventoryId,
    ) -> Result<Option<Vehicle>, RepositoryError> {
        self.record("get_inventory_by_id")?;
        Ok(self.vehicle(id))
    }

    async fn register_classification(
        &self,
        name: &str,
    ) -> Result<Classification, RepositoryError> {
        self.record("register_classification")?;
        let mut t = self.tables();
        let classification = Classification {
            classification_id: ClassificationId::new(t.next_id()),
            classification_name: name.to_string(),
        };
        t.classifications.push(classification.clone());
        Ok(classification)
    }

    async fn register_inventory(&self, draft: VehicleDraft) -> Result<Vehicle, RepositoryError> {
        self.record("register_inventory")?;
        let mut t = self.tables();
        let id = InventoryId::new(t.next_id());
        let vehicle = t.vehicle(id, &draft);
        t.inventory.push((id, draft));
        Ok(vehicle)
    }

    async fn update_inventory(
        &self,
        id: InventoryId,
        draft: VehicleDraft,
    ) -> Result<Vehicle, RepositoryError> {
        self.record("update_inventory")?;
        let mut t = self.tables();
        let slot = t
            .inventory
            .iter_mut()
            .find(|(vid, _)| *vid == id)
            .ok_or(RepositoryError::NotFound)?;
        slot.1 = draft.clone();
        Ok(t.vehicle(id, &draft))
    }

    async fn delete_inventory_item(&self, id: InventoryId) -> Result<u64, RepositoryError> {
        self.record("delete_inventory_item")?;
        let mut t = self.tables();
        let before = t.inventory.len();
        t.inventory.retain(|(vid, _)| *vid != id);
        t.reviews.retain(|r| r.inv_id != id);
        Ok((before - t.inventory.len()) as u64)
    }

    async fn check_existing_classification(&self, name: &str) -> Result<bool, RepositoryError> {
        self.record("check_existing_classification")?;
        Ok(self
            .tables()
            .classifications
            .iter()
            .any(|c| c.classification_name.eq_ignore_ascii_case(name)))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStores {
    async fn submit_review(&self, new: NewReview) -> Result<Review, RepositoryError> {
        self.record("submit_review")?;
        let mut t = self.tables();
        let account_firstname = t
            .accounts
            .iter()
            .find(|(a, _)| a.account_id == new.account_id)
            .map(|(a, _)| a.account_firstname.clone())
            .ok_or_else(|| RepositoryError::Conflict("review account".to_string()))?;
        let review = Review {
            review_id: ReviewId::new(t.next_id()),
            review_text: new.review_text,
            review_rating: new.review_rating,
            review_date: Utc::now(),
            inv_id: new.inv_id,
            account_id: new.account_id,
            account_firstname,
        };
        t.reviews.push(review.clone());
        Ok(review)
    }

    async fn get_reviews_by_inventory_id(
        &self,
        id: InventoryId,
    ) -> Result<Vec<Review>, RepositoryError> {
        self.record("get_reviews_by_inventory_id")?;
        let mut reviews: Vec<Review> = self
            .tables()
            .reviews
            .iter()
            .filter(|r| r.inv_id == id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));
        Ok(reviews)
    }

    async fn get_review_by_review_id(
        &self,
        id: ReviewId,
    ) -> Result<Option<Review>, RepositoryError> {
        self.record("get_review_by_review_id")?;
        Ok(self
            .tables()
            .reviews
            .iter()
            .find(|r| r.review_id == id)
            .cloned())
    }

    async fn delete_review(&self, id: ReviewId) -> Result<u64, RepositoryError> {
        self.record("delete_review")?;
        let mut t = self.tables();
        let before = t.reviews.len();
        t.reviews.retain(|r| r.review_id != id);
        Ok((before - t.reviews.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Test application
// =============================================================================

/// A running site and a client pointed at it.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub stores: Arc<MemoryStores>,
}

impl TestApp {
    /// Spawn the site in development mode over freshly seeded stores.
    pub async fn spawn() -> Self {
        Self::spawn_in(Environment::Development).await
    }

    /// Spawn the site in `environment`.
    ///
    /// Production cookies are `Secure`, so the client will not send them
    /// back over plain HTTP.
    pub async fn spawn_in(environment: Environment) -> Self {
        let stores = Arc::new(MemoryStores::seeded());
        let config = SiteConfig {
            database_url: SecretString::from("postgres://unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            environment,
            access_token_secret: SecretString::from(TOKEN_SECRET),
            session_secret: SecretString::from(SESSION_SECRET),
            token_ttl_seconds: TOKEN_TTL_SECONDS,
            sentry_dsn: None,
        };
        let state = AppState::new(
            config,
            Stores {
                accounts: stores.clone(),
                inventory: stores.clone(),
                reviews: stores.clone(),
            },
        )
        .unwrap();
        let app = routes::router(state, tower_sessions::MemoryStore::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: new_client(),
            stores,
        }
    }

    /// Token service sharing the site's secret.
    #[must_use]
    pub fn tokens() -> TokenService {
        TokenService::new(&SecretString::from(TOKEN_SECRET), TOKEN_TTL_SECONDS).unwrap()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client.post(self.url(path)).form(form).send().await.unwrap()
    }

    /// GET `path` presenting `token` as the identity cookie.
    pub async fn get_with_token(&self, path: &str, token: &str) -> Response {
        self.client
            .get(self.url(path))
            .header("cookie", format!("jwt={token}"))
            .send()
            .await
            .unwrap()
    }

    /// Log in through the form and assert it succeeded.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        let response = self
            .post_form(
                "/account/login",
                &[("account_email", email), ("account_password", password)],
            )
            .await;
        assert_eq!(response.status(), 303, "login should redirect");
        assert_eq!(location(&response), "/account/");
        response
    }

    /// Follow a redirect by hand and return the page text.
    pub async fn follow(&self, response: &Response) -> String {
        self.page_text(&location(response)).await
    }

    /// GET `path` and return the page text.
    pub async fn page_text(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }
}

/// A cookie-keeping client that does not follow redirects.
#[must_use]
pub fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

/// The `Set-Cookie` header for the identity token, if any.
#[must_use]
pub fn jwt_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("jwt="))
        .map(str::to_string)
}

/// The token value carried by a `Set-Cookie: jwt=...` header.
#[must_use]
pub fn jwt_value(set_cookie: &str) -> String {
    set_cookie
        .trim_start_matches("jwt=")
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Claims for the client fixture.
#[must_use]
pub fn client_claims() -> IdentityClaims {
    IdentityClaims {
        account_id: CLIENT_ID,
        account_firstname: "Basic".to_string(),
        account_lastname: "Client".to_string(),
        account_email: Email::parse(CLIENT_EMAIL).unwrap(),
        account_type: AccountType::Client,
    }
}
