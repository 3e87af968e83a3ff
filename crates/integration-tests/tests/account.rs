//! Registration and account self-service.

#![allow(clippy::unwrap_used)]

use cse_motors_integration_tests::{
    CLIENT_EMAIL, CLIENT_ID, CLIENT_PASSWORD, EMPLOYEE_EMAIL, TOKEN_SECRET, TestApp,
    jwt_set_cookie, jwt_value, location,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

const NEW_PASSWORD: &str = "N3w!Passw0rdHere";

fn token_claims(set_cookie: &str) -> serde_json::Value {
    decode::<serde_json::Value>(
        &jwt_value(set_cookie),
        &DecodingKey::from_secret(TOKEN_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims
}

fn client_update(first: &str, email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("account_id", CLIENT_ID.to_string()),
        ("account_firstname", first.to_string()),
        ("account_lastname", "Client".to_string()),
        ("account_email", email.to_string()),
    ]
}

async fn post_update(app: &TestApp, form: &[(&'static str, String)]) -> reqwest::Response {
    app.client
        .post(app.url("/account/update"))
        .form(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_then_log_in() {
    let app = TestApp::spawn().await;
    let response = app
        .post_form(
            "/account/register",
            &[
                ("account_firstname", "Sam"),
                ("account_lastname", "Driver"),
                ("account_email", "Sam@Example.com"),
                ("account_password", NEW_PASSWORD),
            ],
        )
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/account/login");
    assert!(app.follow(&response).await.contains("registered Sam. Please log in."));

    let response = app.login("sam@example.com", NEW_PASSWORD).await;
    let claims = token_claims(&jwt_set_cookie(&response).unwrap());
    assert_eq!(claims["account_type"], "Client");
    assert_eq!(claims["account_email"], "sam@example.com");
}

#[tokio::test]
async fn test_invalid_registration_is_sticky_without_password() {
    let app = TestApp::spawn().await;
    let response = app
        .post_form(
            "/account/register",
            &[
                ("account_firstname", "Sam"),
                ("account_lastname", ""),
                ("account_email", "sam@example.com"),
                ("account_password", "short"),
            ],
        )
        .await;

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"value="Sam""#));
    assert!(body.contains(r#"value="sam@example.com""#));
    assert!(!body.contains(r#"value="short""#));
    assert!(body.contains("Please provide a last name."));
    assert!(body.contains("Password does not meet requirements."));
    assert_eq!(app.stores.calls("register_account"), 0);
}

#[tokio::test]
async fn test_registration_rejects_taken_email() {
    let app = TestApp::spawn().await;
    let response = app
        .post_form(
            "/account/register",
            &[
                ("account_firstname", "Basic"),
                ("account_lastname", "Again"),
                ("account_email", CLIENT_EMAIL),
                ("account_password", NEW_PASSWORD),
            ],
        )
        .await;

    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().contains("Email exists."));
    assert_eq!(app.stores.calls("register_account"), 0);
}

#[tokio::test]
async fn test_update_page_prefills_own_account() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let response = app.get(&format!("/account/update/{CLIENT_ID}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"value="Basic""#));
    assert!(body.contains(&format!(r#"value="{CLIENT_EMAIL}""#)));
}

#[tokio::test]
async fn test_update_page_for_another_account_is_refused() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let response = app.get("/account/update/2").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/account/");
    assert!(app.follow(&response).await.contains("Unauthorized access attempt."));
    assert_eq!(app.stores.calls("get_account_by_id"), 0);
}

#[tokio::test]
async fn test_update_reissues_token_with_new_name() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let response = post_update(&app, &client_update("Bashful", CLIENT_EMAIL)).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/account/");
    let claims = token_claims(&jwt_set_cookie(&response).unwrap());
    assert_eq!(claims["account_firstname"], "Bashful");

    let body = app.follow(&response).await;
    assert!(body.contains("Account details updated successfully."));
    assert!(body.contains("Welcome Bashful"));
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let form = client_update("Bashful", "bashful@340jr.net");
    assert_eq!(post_update(&app, &form).await.status(), 303);
    let first = app.stores.account(CLIENT_ID).unwrap();
    assert_eq!(post_update(&app, &form).await.status(), 303);
    let second = app.stores.account(CLIENT_ID).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.account_email.as_str(), "bashful@340jr.net");
}

#[tokio::test]
async fn test_update_rejects_email_of_another_account() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let response = post_update(&app, &client_update("Basic", EMPLOYEE_EMAIL)).await;
    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains("Email exists. Please use a different email."));
    assert!(body.contains(&format!(r#"value="{EMPLOYEE_EMAIL}""#)));
    assert_eq!(app.stores.calls("update_account"), 0);
}

#[tokio::test]
async fn test_update_with_foreign_account_id_is_refused() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let mut form = client_update("Mallory", "mallory@340jr.net");
    form[0].1 = "2".to_string();
    let response = post_update(&app, &form).await;

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/account/");
    assert!(jwt_set_cookie(&response).is_none());
    assert!(app.follow(&response).await.contains("Unauthorized access attempt."));
    assert_eq!(app.stores.calls("update_account"), 0);
}

#[tokio::test]
async fn test_password_change() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let response = app
        .post_form(
            "/account/update-password",
            &[("account_id", "1"), ("account_password", NEW_PASSWORD)],
        )
        .await;
    assert_eq!(response.status(), 303);
    assert!(jwt_set_cookie(&response).is_some());
    assert!(app.follow(&response).await.contains("Password updated successfully."));

    app.get("/account/logout").await;
    app.login(CLIENT_EMAIL, NEW_PASSWORD).await;
}

#[tokio::test]
async fn test_weak_password_change_is_refused() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;

    let response = app
        .post_form(
            "/account/update-password",
            &[("account_id", "1"), ("account_password", "password")],
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains("Password does not meet requirements."));
    assert!(body.contains(r#"value="Basic""#));
    assert_eq!(app.stores.calls("update_password"), 0);
}
