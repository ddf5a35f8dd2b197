//! End-to-end flows against a migrated Postgres database
//!
//! Each test returns early unless `TEST_DATABASE_URL` points at a scratch
//! database.

mod common;

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{body_json, database_app, get, request, token_for};

struct Member {
    id: Uuid,
    token: String,
}

async fn onboard(app: &Router, secret: &str, roles: &[&str]) -> anyhow::Result<Member> {
    let id = Uuid::new_v4();
    let token = token_for(secret, id, &format!("{}@pitwall.test", id.simple()));

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/account/roles",
            Some(&token),
            Some(json!({ "roles": roles })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(Member { id, token })
}

fn event_ids(events: &Value) -> Vec<String> {
    events
        .as_array()
        .map(|events| {
            events
                .iter()
                .filter_map(|e| e["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_account_provisioned_and_roles_idempotent() -> anyhow::Result<()> {
    let Some((config, app, _pool)) = database_app().await? else {
        return Ok(());
    };
    let id = Uuid::new_v4();
    let token = token_for(&config.jwt_secret, id, "new.driver@pitwall.test");

    let response = app.clone().oneshot(get("/v1/account", Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["id"], json!(id.to_string()));
    assert_eq!(profile["onboarded"], json!(false));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/v1/account/roles",
                Some(&token),
                Some(json!({ "roles": ["driver"] })),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let profile = body_json(response).await;
        assert_eq!(profile["roles"], json!(["driver"]));
        assert_eq!(profile["onboarded"], json!(true));
    }

    Ok(())
}

#[tokio::test]
async fn test_driver_creates_and_edits_event() -> anyhow::Result<()> {
    let Some((config, app, _pool)) = database_app().await? else {
        return Ok(());
    };
    let driver = onboard(&app, &config.jwt_secret, &["driver"]).await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/events/one-off",
            Some(&driver.token),
            Some(json!({
                "date": "2024-03-15T18:00:00Z",
                "type": "endurance",
                "car": "Porsche 911 GT3 R",
                "track": "Spa-Francorchamps",
                "duration": 360
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = body_json(response).await;
    let event_id = event["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(event["type"], json!("endurance"));
    assert_eq!(event["drivers"][0]["id"], json!(driver.id.to_string()));
    // Not a manager, so no team is attached
    assert_eq!(event["team_id"], Value::Null);

    let response = app
        .clone()
        .oneshot(get(
            "/v1/events/driving?month_index=2&year=2024",
            Some(&driver.token),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(event_ids(&body_json(response).await), vec![event_id.clone()]);

    let response = app
        .clone()
        .oneshot(get(
            "/v1/events/driving?month_index=3&year=2024",
            Some(&driver.token),
        ))
        .await?;
    assert!(event_ids(&body_json(response).await).is_empty());

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/v1/events/{event_id}"),
            Some(&driver.token),
            Some(json!({ "track": "Monza" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let edited = body_json(response).await;
    assert_eq!(edited["track"], json!("Monza"));
    assert_eq!(edited["type"], json!("sprint"));

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/v1/events/{event_id}"),
            Some(&driver.token),
            None,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn test_team_feed_and_results() -> anyhow::Result<()> {
    let Some((config, app, pool)) = database_app().await? else {
        return Ok(());
    };
    let manager = onboard(&app, &config.jwt_secret, &["manager"]).await?;
    let first = onboard(&app, &config.jwt_secret, &["driver"]).await?;
    let second = onboard(&app, &config.jwt_secret, &["driver"]).await?;
    let outsider = onboard(&app, &config.jwt_secret, &["driver"]).await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/teams",
            Some(&manager.token),
            Some(json!({
                "name": "Pit Lane Racing",
                "driver_ids": [first.id, second.id]
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let team_id: Uuid = body_json(response).await["id"]
        .as_str()
        .unwrap_or_default()
        .parse()?;

    // A second team for the same manager is a conflict
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/teams",
            Some(&manager.token),
            Some(json!({ "name": "Another Team" })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let create = |token: &str, drivers: Vec<Uuid>| {
        request(
            "POST",
            "/v1/events/one-off",
            Some(token),
            Some(json!({
                "date": "2024-07-20T12:00:00Z",
                "car": "BMW M4 GT3",
                "track": "Silverstone",
                "duration": 45,
                "driver_ids": drivers
            })),
        )
    };

    let response = app.clone().oneshot(create(&first.token, vec![first.id])).await?;
    let solo = body_json(response).await["id"].as_str().unwrap_or_default().to_string();
    let response = app
        .clone()
        .oneshot(create(&first.token, vec![first.id, second.id]))
        .await?;
    let shared = body_json(response).await["id"].as_str().unwrap_or_default().to_string();

    // Tagged with the team but driven by an outsider
    let tagged = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO events (id, date, car, track, duration, team_id) \
         VALUES ($1, '2024-07-21T12:00:00Z', 'Audi R8 LMS', 'Silverstone', 45, $2)",
    )
    .bind(tagged)
    .bind(team_id)
    .execute(&pool)
    .await?;
    sqlx::query("INSERT INTO event_drivers (event_id, driver_id) VALUES ($1, $2)")
        .bind(tagged)
        .bind(outsider.id)
        .execute(&pool)
        .await?;

    let feed = |token: &str| get("/v1/events/team?month_index=6&year=2024", Some(token));

    let response = app.clone().oneshot(feed(&first.token)).await?;
    assert_eq!(event_ids(&body_json(response).await), vec![shared.clone()]);

    let response = app.clone().oneshot(feed(&second.token)).await?;
    let mut seen = event_ids(&body_json(response).await);
    seen.sort();
    let mut expected = vec![solo.clone(), shared.clone()];
    expected.sort();
    assert_eq!(seen, expected);
    assert!(!seen.contains(&tagged.to_string()));

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/v1/events/{solo}/result"),
            Some(&first.token),
            Some(json!({ "position": 3, "fastest_lap_ms": 118_204 })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(
            "/v1/results/team?month_index=6&year=2024&sort=position",
            Some(&manager.token),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    assert_eq!(event_ids(&results), vec![solo]);
    assert_eq!(results[0]["result"]["position"], json!(3));

    Ok(())
}
