//! HTTP surface tests that need no database
//!
//! The pool connects lazily, so only routes that never reach a query, or
//! requests rejected before one, are exercised here.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{body_json, body_text, get, lazy_app, request, token_for};

#[tokio::test]
async fn test_health_check() {
    let (_, app) = lazy_app();

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_calendar_page_for_january_2024() {
    let (_, app) = lazy_app();

    let response = app
        .oneshot(get("/v1/calendar?month_index=0&year=2024", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let weeks = body["weeks"].as_array().unwrap();
    assert_eq!(weeks.len(), 6);
    assert!(weeks.iter().all(|w| w.as_array().unwrap().len() == 7));

    assert_eq!(body["week_start"], "monday");
    assert_eq!(weeks[0][0]["date"], "2024-01-01");
    assert_eq!(weeks[5][6]["date"], "2024-02-11");
    assert_eq!(weeks[5][6]["in_month"], false);

    assert_eq!(body["previous"], serde_json::json!({"year": 2023, "month_index": 11}));
    assert_eq!(body["next"], serde_json::json!({"year": 2024, "month_index": 1}));
}

#[tokio::test]
async fn test_calendar_month_overflow() {
    let (_, app) = lazy_app();

    let response = app
        .oneshot(get("/v1/calendar?month_index=-1&year=2024", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["year"], 2023);
    assert_eq!(body["month_index"], 11);
}

#[tokio::test]
async fn test_calendar_defaults_to_current_month() {
    let (_, app) = lazy_app();

    let response = app.oneshot(get("/v1/calendar", None)).await.unwrap();
    let body = body_json(response).await;

    let today = Utc::now().date_naive();
    assert_eq!(body["year"], today.year());
    assert_eq!(body["month_index"], today.month0());

    let marked: Vec<NaiveDate> = body["weeks"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|w| w.as_array().unwrap().clone())
        .filter(|d| d["today"] == true)
        .map(|d| serde_json::from_value(d["date"].clone()).unwrap())
        .collect();
    assert_eq!(marked, vec![today]);
}

#[tokio::test]
async fn test_calendar_rejects_out_of_range_year() {
    let (_, app) = lazy_app();

    let response = app
        .oneshot(get("/v1/calendar?month_index=0&year=0", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_protected_routes_require_authorization() {
    let event_id = Uuid::new_v4();
    let cases = [
        ("GET", "/v1/account".to_string()),
        ("GET", "/v1/events".to_string()),
        ("GET", "/v1/events/driving".to_string()),
        ("GET", "/v1/events/managing".to_string()),
        ("GET", "/v1/events/team".to_string()),
        ("GET", "/v1/results/team".to_string()),
        ("GET", "/v1/championships".to_string()),
        ("GET", "/v1/users/drivers?q=a".to_string()),
        ("DELETE", format!("/v1/events/{event_id}")),
    ];

    for (method, uri) in cases {
        let (_, app) = lazy_app();
        let response = app.oneshot(request(method, &uri, None, None)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} without a token"
        );
    }
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_rejected() {
    let (_, app) = lazy_app();
    let token = token_for("not-the-secret", Uuid::new_v4(), "driver@pitwall.test");

    let response = app
        .oneshot(get("/v1/events/driving", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_authorization_header_is_rejected() {
    let (_, app) = lazy_app();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/v1/account")
                .header("Authorization", "Token abc")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (config, app) = lazy_app();
    let token = token_for(&config.jwt_secret, Uuid::new_v4(), "x@pitwall.test");

    let response = app
        .oneshot(request(
            "POST",
            "/v1/events/unknown",
            Some(&token),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert!(matches!(
        response.status(),
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
    ));
}
