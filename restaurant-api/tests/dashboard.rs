mod common;

use chrono::Days;
use common::TestApp;
use http::{Method, StatusCode, header};
use serde_json::json;

const ADMIN: &str = "/dashboard/admin/api/V1";
const CUSTOMER: &str = "/dashboard/customer/api/V1";

async fn reserve(app: &TestApp, token: &str, people: i32) {
    let date = app.state.today().checked_add_days(Days::new(1)).unwrap();
    let res = app
        .post(
            "/reservations/api/V1/reserve/",
            json!({ "date": date.format("%Y-%m-%d").to_string(), "time": "20:00", "people": people }),
            Some(token),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_dashboard_permissions() {
    let app = TestApp::new();
    let admin = app.create_user("chef@example.com", true, true).await;
    let customer = app.create_customer("guest@example.com").await;
    let admin = app.access_token(&admin);
    let customer = app.access_token(&customer);

    for path in ["reservations/", "users/"] {
        let url = format!("{ADMIN}/{path}");
        assert_eq!(app.get(&url, None).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.get(&url, Some(&customer)).await.status, StatusCode::FORBIDDEN);
        assert_eq!(app.get(&url, Some(&admin)).await.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_admin_sees_everything() {
    let app = TestApp::new();
    let admin = app.create_user("chef@example.com", true, true).await;
    let alice = app.create_customer("alice@example.com").await;
    let bob = app.create_customer("bob@example.com").await;
    let admin = app.access_token(&admin);
    reserve(&app, &app.access_token(&alice), 2).await;
    reserve(&app, &app.access_token(&bob), 5).await;

    let res = app.get(&format!("{ADMIN}/reservations/"), Some(&admin)).await;
    let reservations = res.body.as_array().unwrap();
    assert_eq!(reservations.len(), 2);

    let id = reservations[1]["id"].as_i64().unwrap();
    let res = app.get(&format!("{ADMIN}/reservations/{id}/"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], id);
    let res = app.get(&format!("{ADMIN}/reservations/99999/"), Some(&admin)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.get(&format!("{ADMIN}/users/"), Some(&admin)).await;
    let users = res.body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    let res = app.get(&format!("{ADMIN}/users/{}/", alice.id), Some(&admin)).await;
    assert_eq!(res.body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_dashboards_are_read_only() {
    let app = TestApp::new();
    let admin = app.create_user("chef@example.com", true, true).await;
    let admin = app.access_token(&admin);

    for url in [
        format!("{ADMIN}/reservations/"),
        format!("{ADMIN}/users/"),
        format!("{CUSTOMER}/my-profile/"),
        format!("{CUSTOMER}/reservations/"),
    ] {
        let res = app.request(Method::POST, &url, Some(json!({})), Some(&admin)).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED, "{url}");
        assert!(res.body["detail"].is_string());
    }
}

#[tokio::test]
async fn test_customer_dashboard() {
    let app = TestApp::new();
    let alice = app.create_customer("alice@example.com").await;
    let bob = app.create_customer("bob@example.com").await;
    let alice = app.access_token(&alice);
    reserve(&app, &alice, 3).await;
    reserve(&app, &app.access_token(&bob), 4).await;

    let res = app.get(&format!("{CUSTOMER}/my-profile/"), Some(&alice)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "alice@example.com");
    assert_eq!(res.body["phone_number"], "09123456789");

    let res = app.get(&format!("{CUSTOMER}/reservations/"), Some(&alice)).await;
    let list = res.body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["people"], 3);

    assert_eq!(
        app.get(&format!("{CUSTOMER}/my-profile/"), None).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_health_and_fallbacks() {
    let app = TestApp::new();

    let res = app.get("/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert!(res.headers.contains_key("x-request-id"));

    let res = app.get("/no/such/route/", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body["detail"].is_string());

    let res = app.request(Method::GET, "/accounts/api/V1/registration/", None, None).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(!res.headers.contains_key(header::LOCATION));
}
