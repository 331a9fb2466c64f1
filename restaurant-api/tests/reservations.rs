mod common;

use chrono::Days;
use common::TestApp;
use http::StatusCode;
use restaurant_api::email::EmailJob;
use serde_json::json;

const RESERVE: &str = "/reservations/api/V1/reserve/";

fn day(app: &TestApp, offset: i64) -> String {
    let today = app.state.today();
    let date = if offset >= 0 {
        today.checked_add_days(Days::new(offset as u64))
    } else {
        today.checked_sub_days(Days::new(offset.unsigned_abs()))
    };
    date.unwrap().format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn test_create_reservation() {
    let mut app = TestApp::new();
    let user = app.create_customer("guest@example.com").await;
    let token = app.access_token(&user);
    let date = day(&app, 1);

    let res = app
        .post(RESERVE, json!({ "date": date, "time": "13:00:00", "people": 4 }), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["email"], "guest@example.com");
    assert_eq!(res.body["date"], date);
    assert_eq!(res.body["time"], "13:00:00");
    assert_eq!(res.body["people"], 4);

    match app.next_email() {
        Some(EmailJob::ReservationConfirmed { to, people, .. }) => {
            assert_eq!(to, "guest@example.com");
            assert_eq!(people, 4);
        }
        other => panic!("expected reservation email, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reservation_today_at_closing_time_is_allowed() {
    let app = TestApp::new();
    let user = app.create_customer("guest@example.com").await;
    let token = app.access_token(&user);

    let res = app
        .post(RESERVE, json!({ "date": day(&app, 0), "time": "22:00", "people": 2 }), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reservation_slot_rules() {
    let app = TestApp::new();
    let user = app.create_customer("guest@example.com").await;
    let token = app.access_token(&user);

    let res = app
        .post(RESERVE, json!({ "date": day(&app, -1), "time": "13:00", "people": 2 }), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["non_field_errors"].as_array().unwrap().len(), 1);

    let res = app
        .post(RESERVE, json!({ "date": day(&app, 1), "time": "23:30", "people": 2 }), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["non_field_errors"].as_array().unwrap().len(), 1);

    // Both violations reported together
    let res = app
        .post(RESERVE, json!({ "date": day(&app, -1), "time": "09:00", "people": 2 }), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["non_field_errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reservation_party_size() {
    let app = TestApp::new();
    let user = app.create_customer("guest@example.com").await;
    let token = app.access_token(&user);

    for people in [0, 21] {
        let res = app
            .post(RESERVE, json!({ "date": day(&app, 1), "time": "13:00", "people": people }), Some(&token))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.body["people"].is_array());
    }
}

#[tokio::test]
async fn test_reservation_requires_phone_number() {
    let app = TestApp::new();
    let user = app.create_user("guest@example.com", true, false).await;
    let token = app.access_token(&user);

    let res = app
        .post(RESERVE, json!({ "date": day(&app, 1), "time": "13:00", "people": 2 }), Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reservation_requires_auth() {
    let app = TestApp::new();
    let res = app
        .post(RESERVE, json!({ "date": day(&app, 1), "time": "13:00", "people": 2 }), None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/reservations/api/V1/user-reservations/", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_reservations_lists_own_only() {
    let app = TestApp::new();
    let alice = app.create_customer("alice@example.com").await;
    let bob = app.create_customer("bob@example.com").await;
    let alice_token = app.access_token(&alice);
    let bob_token = app.access_token(&bob);

    for time in ["13:00", "19:30"] {
        let res = app
            .post(RESERVE, json!({ "date": day(&app, 2), "time": time, "people": 2 }), Some(&alice_token))
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    app.post(RESERVE, json!({ "date": day(&app, 3), "time": "14:00", "people": 6 }), Some(&bob_token))
        .await;

    let res = app
        .get("/reservations/api/V1/user-reservations/", Some(&alice_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let list = res.body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|r| r["email"] == "alice@example.com"));
    assert_eq!(list[0]["time"], "13:00:00");

    let res = app
        .get("/reservations/api/V1/user-reservations/?page_size=1", Some(&alice_token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 2);
    assert_eq!(res.body["results"].as_array().unwrap().len(), 1);
    assert!(res.body["next"].as_str().unwrap().contains("page=2"));
    assert!(res.body["previous"].is_null());
}

#[tokio::test]
async fn test_reservation_page_links_follow_request_path() {
    let app = TestApp::new();
    let user = app.create_customer("guest@example.com").await;
    let token = app.access_token(&user);
    for time in ["13:00", "19:30"] {
        app.post(RESERVE, json!({ "date": day(&app, 2), "time": time, "people": 2 }), Some(&token))
            .await;
    }

    for path in [RESERVE, "/reservations/api/V1/user-reservations/"] {
        let res = app.get(&format!("{path}?page_size=1"), Some(&token)).await;
        let next = app.link_path(res.body["next"].as_str().unwrap());
        assert!(next.starts_with(&format!("{path}?")), "{next}");

        let res = app.get(&next, Some(&token)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["results"][0]["time"], "19:30:00");
        assert!(res.body["next"].is_null());
    }
}
