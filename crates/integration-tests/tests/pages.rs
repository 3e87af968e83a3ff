//! Public pages, health checks, and error handling.

#![allow(clippy::unwrap_used)]

use cse_motors_integration_tests::{CLIENT_EMAIL, CLIENT_PASSWORD, TestApp};
use cse_motors_site::config::Environment;

#[tokio::test]
async fn test_home_page_lists_classifications() {
    let app = TestApp::spawn().await;
    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    for name in ["Custom", "Sedan", "Sport", "SUV", "Truck"] {
        assert!(body.contains(name), "{name} missing from navigation");
    }
    assert!(body.contains("My Account"));
}

#[tokio::test]
async fn test_header_greets_logged_in_account() {
    let app = TestApp::spawn().await;
    app.login(CLIENT_EMAIL, CLIENT_PASSWORD).await;
    let body = app.page_text("/").await;
    assert!(body.contains("Welcome Basic"));
    assert!(!body.contains(">Management</a>"));
}

#[tokio::test]
async fn test_health_checks() {
    let app = TestApp::spawn().await;
    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
    assert_eq!(app.get("/health/ready").await.status(), 200);
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let app = TestApp::spawn().await;
    let response = app.get("/no/such/page").await;
    assert_eq!(response.status(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sorry, we appear to have lost that page."));
}

#[tokio::test]
async fn test_trigger_error_renders_crash_page() {
    let app = TestApp::spawn().await;
    let response = app.get("/inv/trigger-error").await;
    assert_eq!(response.status(), 500);
    let body = response.text().await.unwrap();
    assert!(body.contains("Oh no! There was a crash."));
    assert!(body.contains("error-detail"), "development shows error detail");
}

#[tokio::test]
async fn test_crash_page_hides_detail_in_production() {
    let app = TestApp::spawn_in(Environment::Production).await;
    let response = app.get("/inv/trigger-error").await;
    assert_eq!(response.status(), 500);
    let body = response.text().await.unwrap();
    assert!(body.contains("Oh no! There was a crash."));
    assert!(!body.contains("error-detail"));
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = TestApp::spawn().await;
    let response = app.get("/static/css/styles.css").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::spawn().await;
    let response = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = app.get("/").await;
    assert!(response.headers().contains_key("x-request-id"));
}
