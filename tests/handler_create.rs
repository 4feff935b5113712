mod common;

use linkgate::domain::clock::Clock;
use linkgate::domain::entities::Limit;
use linkgate::domain::repositories::RecordStore;
use serde_json::Value;
use std::time::Duration;

fn assert_bad_request(response: axum_test::TestResponse, message: &str) {
    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert_eq!(json["message"], message);
}

#[tokio::test]
async fn test_create_returns_token() {
    let app = common::test_app();

    let response = app
        .server
        .post("/create")
        .form(&[("long_url", "https://example.com/page")])
        .await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    let token = json["token"].as_str().unwrap();
    assert_eq!(token.len(), 8);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_create_stores_record_with_defaults() {
    let app = common::test_app();

    let token = common::create_link(&app.server, &[("long_url", "https://example.com")]).await;

    let record = app.store.get(&token).await.unwrap().unwrap();
    assert_eq!(record.token, token);
    assert_eq!(record.long_url, "https://example.com");
    assert_eq!(record.max_access, Limit::Unlimited);
    assert_eq!(record.max_per_hour, Limit::Unlimited);
    assert_eq!(record.current_access_count, 0);
    assert_eq!(record.hourly_access_count, 0);
    assert_eq!(record.age_duration, Duration::from_secs(3600));
    assert_eq!(record.created_at, app.clock.now());
    assert_eq!(
        app.store.expires_at(&token),
        Some(app.clock.now() + chrono::Duration::seconds(3600))
    );
}

#[tokio::test]
async fn test_create_with_all_limits() {
    let app = common::test_app();

    let token = common::create_link(
        &app.server,
        &[
            ("long_url", "https://example.com"),
            ("max_access", "10"),
            ("max_per_hour", "5"),
            ("max_age", "120"),
        ],
    )
    .await;

    let record = app.store.get(&token).await.unwrap().unwrap();
    assert_eq!(record.max_access, Limit::AtMost(10));
    assert_eq!(record.max_per_hour, Limit::AtMost(5));
    assert_eq!(record.age_duration, Duration::from_secs(120));
}

#[tokio::test]
async fn test_create_generates_distinct_tokens() {
    let app = common::test_app();

    let first = common::create_link(&app.server, &[("long_url", "https://example.com")]).await;
    let second = common::create_link(&app.server, &[("long_url", "https://example.com")]).await;

    assert_ne!(first, second);
    assert_eq!(app.store.live_count(), 2);
}

#[tokio::test]
async fn test_create_missing_long_url() {
    let app = common::test_app();

    let response = app.server.post("/create").form(&[("max_access", "3")]).await;

    assert_bad_request(response, "Missing long_url parameter");
    assert_eq!(app.store.live_count(), 0);
}

#[tokio::test]
async fn test_create_invalid_numbers() {
    let app = common::test_app();

    for (field, value) in [
        ("max_access", "many"),
        ("max_per_hour", "2.5"),
        ("max_per_hour", "-7"),
        ("max_age", "soon"),
    ] {
        let response = app
            .server
            .post("/create")
            .form(&[("long_url", "https://example.com"), (field, value)])
            .await;

        assert_bad_request(response, &format!("Invalid {field} parameter"));
    }

    assert_eq!(app.store.live_count(), 0);
}

#[tokio::test]
async fn test_create_max_age_out_of_range() {
    let app = common::test_app();

    for value in ["0", "-1", "31536001"] {
        let response = app
            .server
            .post("/create")
            .form(&[("long_url", "https://example.com"), ("max_age", value)])
            .await;

        assert_bad_request(response, "Invalid max_age parameter");
    }
}

#[tokio::test]
async fn test_create_max_age_upper_bound_accepted() {
    let app = common::test_app();

    let token = common::create_link(
        &app.server,
        &[("long_url", "https://example.com"), ("max_age", "31536000")],
    )
    .await;

    let record = app.store.get(&token).await.unwrap().unwrap();
    assert_eq!(record.age_duration, Duration::from_secs(31_536_000));
}

#[tokio::test]
async fn test_create_rejects_non_form_body() {
    let app = common::test_app();

    let response = app
        .server
        .post("/create")
        .json(&serde_json::json!({ "long_url": "https://example.com" }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<Value>();
    assert!(json["message"].as_str().unwrap().starts_with("Invalid form body"));
}
