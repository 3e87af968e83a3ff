//! Inventory browsing and management.

#![allow(clippy::unwrap_used)]

use cse_motors_integration_tests::{
    CAMARO_ID, EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD, SPORT_ID, TestApp, location,
};

async fn employee_app() -> TestApp {
    let app = TestApp::spawn().await;
    app.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD).await;
    app
}

#[tokio::test]
async fn test_classification_page_lists_vehicles() {
    let app = TestApp::spawn().await;
    let response = app.get(&format!("/inv/type/{SPORT_ID}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sport vehicles"));
    assert!(body.contains("Chevy Camaro"));
}

#[tokio::test]
async fn test_unknown_classification_is_not_found() {
    let app = TestApp::spawn().await;
    for path in ["/inv/type/999", "/inv/type/abc"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), 404, "{path}");
    }
}

#[tokio::test]
async fn test_detail_page_shows_vehicle_and_reviews() {
    let app = TestApp::spawn().await;
    let response = app.get(&format!("/inv/detail/{CAMARO_ID}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Chevy Camaro"));
    assert!(body.contains("$25,000.00"));
    assert!(body.contains("101,222"));
    assert!(body.contains("Fast and loud, just as promised."));
    assert!(body.contains("log in</a> to write a review"));
}

#[tokio::test]
async fn test_missing_vehicle_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app.get("/inv/detail/4242").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_invalid_classification_name_is_sticky() {
    let app = employee_app().await;
    let response = app
        .post_form(
            "/inv/add-classification",
            &[("classification_name", "Sport Cars")],
        )
        .await;

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"value="Sport Cars""#));
    assert!(body.contains("Classification name must not contain spaces or special characters."));
    assert_eq!(app.stores.calls("register_classification"), 0);
}

#[tokio::test]
async fn test_duplicate_classification_is_rejected() {
    let app = employee_app().await;
    let response = app
        .post_form("/inv/add-classification", &[("classification_name", "sport")])
        .await;

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains("Classification name already exists."));
    assert_eq!(app.stores.calls("register_classification"), 0);
}

#[tokio::test]
async fn test_add_classification_shows_in_navigation() {
    let app = employee_app().await;
    let response = app
        .post_form("/inv/add-classification", &[("classification_name", "Electric")])
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/inv/");
    let body = app.follow(&response).await;
    assert!(body.contains("Electric"));
    assert!(app.stores.classification_names().contains(&"Electric".to_string()));
}

#[tokio::test]
async fn test_invalid_vehicle_echoes_every_value() {
    let app = employee_app().await;
    let form = [
        ("classification_id", "3"),
        ("inv_make", "Ch"),
        ("inv_model", "Roadster"),
        ("inv_description", "Two seats and no roof"),
        ("inv_image", "not-a-path"),
        ("inv_thumbnail", "also-not-a-path"),
        ("inv_price", "-5"),
        ("inv_year", "1700"),
        ("inv_miles", "12abc"),
        ("inv_color", "Candy Red"),
    ];
    let response = app.post_form("/inv/add-inventory", &form).await;

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    for (_, value) in &form[1..] {
        assert!(body.contains(value), "{value} was not echoed");
    }
    assert!(body.contains(r#"<option value="3" selected>"#));
    assert!(body.contains("Please provide a vehicle make (min 3 characters)."));
    assert!(body.contains("Please provide a valid year."));
    assert!(body.contains("Miles must be a positive integer."));
    assert!(body.contains("Price must be greater than zero."));
    assert_eq!(app.stores.calls("register_inventory"), 0);
}

#[tokio::test]
async fn test_add_vehicle_success() {
    let app = employee_app().await;
    let response = app
        .post_form(
            "/inv/add-inventory",
            &[
                ("classification_id", "5"),
                ("inv_make", "Ford"),
                ("inv_model", "Ranger"),
                ("inv_description", "A small pickup that works hard."),
                ("inv_image", "/images/vehicles/no-image.png"),
                ("inv_thumbnail", "/images/vehicles/no-image-tn.png"),
                ("inv_price", "18500"),
                ("inv_year", "2020"),
                ("inv_miles", "30000"),
                ("inv_color", "Blue"),
            ],
        )
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/inv/");
    assert!(app.follow(&response).await.contains("Ford Ranger"));
    assert_eq!(app.stores.calls("register_inventory"), 1);
}

#[tokio::test]
async fn test_inventory_json_for_management_table() {
    let app = employee_app().await;
    let response = app.get(&format!("/inv/getInventory/{SPORT_ID}")).await;
    assert_eq!(response.status(), 200);
    let vehicles: serde_json::Value = response.json().await.unwrap();
    let vehicles = vehicles.as_array().unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0]["inv_make"], "Chevy");
    assert_eq!(vehicles[0]["inv_id"], 1);
}

#[tokio::test]
async fn test_edit_page_prefills_vehicle() {
    let app = employee_app().await;
    let response = app.get(&format!("/inv/edit/{CAMARO_ID}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Edit Chevy Camaro"));
    assert!(body.contains(r#"value="Silver""#));
    assert!(body.contains(r#"value="25000""#));
}

#[tokio::test]
async fn test_update_vehicle() {
    let app = employee_app().await;
    let response = app
        .post_form(
            "/inv/update",
            &[
                ("inv_id", "1"),
                ("classification_id", "3"),
                ("inv_make", "Chevy"),
                ("inv_model", "Camaro"),
                ("inv_description", "If you want to look cool this is the car you need."),
                ("inv_image", "/images/vehicles/camaro.jpg"),
                ("inv_thumbnail", "/images/vehicles/camaro-tn.jpg"),
                ("inv_price", "23999"),
                ("inv_year", "2018"),
                ("inv_miles", "101222"),
                ("inv_color", "Black"),
            ],
        )
        .await;

    assert_eq!(response.status(), 303);
    assert!(app.follow(&response).await.contains("was successfully updated."));
    let vehicle = app.stores.vehicle(CAMARO_ID).unwrap();
    assert_eq!(vehicle.inv_color, "Black");
    assert_eq!(vehicle.inv_price.to_string(), "23999");
}

#[tokio::test]
async fn test_invalid_update_is_sticky() {
    let app = employee_app().await;
    let response = app
        .post_form(
            "/inv/update",
            &[
                ("inv_id", "1"),
                ("classification_id", "3"),
                ("inv_make", "Chevy"),
                ("inv_model", "Camaro"),
                ("inv_description", "Cool"),
                ("inv_price", "abc"),
                ("inv_year", "2018"),
                ("inv_miles", "101222"),
                ("inv_color", "Black"),
            ],
        )
        .await;

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"value="abc""#));
    assert!(body.contains(r#"value="Black""#));
    assert!(body.contains("Price must be a number."));
    assert_eq!(app.stores.calls("update_inventory"), 0);
    assert_eq!(app.stores.vehicle(CAMARO_ID).unwrap().inv_color, "Silver");
}

#[tokio::test]
async fn test_delete_vehicle() {
    let app = employee_app().await;
    let response = app.get(&format!("/inv/delete/{CAMARO_ID}")).await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Delete Chevy Camaro"));

    let response = app.post_form("/inv/delete", &[("inv_id", "1")]).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/inv/");
    assert!(app.follow(&response).await.contains("The deletion was successful."));
    assert!(app.stores.vehicle(CAMARO_ID).is_none());
}

#[tokio::test]
async fn test_failed_delete_returns_to_confirmation() {
    let app = employee_app().await;
    let response = app.post_form("/inv/delete", &[("inv_id", "77")]).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/inv/delete/77");
}

#[tokio::test]
async fn test_store_failure_rerenders_with_not_implemented() {
    let app = employee_app().await;
    app.stores.fail_writes();
    let response = app
        .post_form("/inv/add-classification", &[("classification_name", "Electric")])
        .await;

    assert_eq!(response.status(), 501);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sorry, the registration failed."));
    assert!(body.contains(r#"value="Electric""#));
}

#[tokio::test]
async fn test_unknown_classification_choice_is_echoed() {
    let app = employee_app().await;
    let response = app
        .post_form(
            "/inv/add-inventory",
            &[("classification_id", "999"), ("inv_make", "Ford")],
        )
        .await;

    assert_eq!(response.status(), 400);
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"<option value="999" selected>999</option>"#));
    assert_eq!(app.stores.calls("register_inventory"), 0);
}
