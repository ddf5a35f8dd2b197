//! Event workflows through the public service API over the in-memory store

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use pitwall_auth::{AuthContext, AuthIdentity, Role};
use pitwall_common::Error;
use pitwall_events::{
    build_page, DateRange, EventDraft, EventEdit, EventService, EventType, InMemoryEventStore,
    ResultInput, ResultSort,
};
use uuid::Uuid;

fn principal(id: Uuid, roles: &[Role]) -> AuthContext {
    AuthContext::new(
        AuthIdentity {
            id,
            email: format!("{}@pitwall.test", id.simple()),
            name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        roles.iter().copied().collect(),
    )
}

fn draft(y: i32, m: u32, d: u32, driver_ids: Vec<Uuid>) -> EventDraft {
    EventDraft {
        title: None,
        date: Utc.with_ymd_and_hms(y, m, d, 18, 30, 0).unwrap(),
        event_type: None,
        car: "McLaren 720S GT3".to_string(),
        track: "Nürburgring".to_string(),
        duration: 90,
        manager_id: None,
        team_id: None,
        driver_ids,
    }
}

#[tokio::test]
async fn test_month_of_events_through_calendar_page() {
    let store = InMemoryEventStore::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    for (id, name) in [(a, "Ana"), (b, "Ben"), (c, "Cleo")] {
        store.add_user(id, name, None);
    }
    let service = EventService::new(Arc::new(store));

    let driver_a = principal(a, &[Role::Driver]);
    let driver_c = principal(c, &[Role::Driver]);

    let race = service
        .create_one_off_event(&driver_a, draft(2024, 3, 15, vec![a, b]))
        .await
        .unwrap();
    // The grid for March shows trailing April days
    service
        .create_one_off_event(&driver_a, draft(2024, 4, 2, vec![a]))
        .await
        .unwrap();

    let page = build_page(2, 2024, Weekday::Mon).unwrap();
    let month = page.month().range();

    let for_a = service.driving_events(&driver_a, month).await.unwrap();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].id, race.id);
    assert_eq!(for_a[0].event_type, EventType::Sprint);
    assert_eq!(
        page.position_of(for_a[0].date.date_naive()),
        Some((2, 4))
    );

    let whole_grid = service.driving_events(&driver_a, page.range()).await.unwrap();
    assert_eq!(whole_grid.len(), 2);

    assert!(service.driving_events(&driver_c, month).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_default_view_per_primary_role() {
    let store = InMemoryEventStore::new();
    let (team, manager) = (Uuid::new_v4(), Uuid::new_v4());
    let (social, a) = (Uuid::new_v4(), Uuid::new_v4());
    store.add_team(team, "Pit Lane", manager, Some(social));
    store.add_user(manager, "Mia", None);
    store.add_user(a, "Ana", Some(team));
    let service = EventService::new(Arc::new(store));

    let as_manager = principal(manager, &[Role::Manager]);
    let mut endurance = draft(2024, 5, 25, vec![a]);
    endurance.event_type = Some(EventType::Endurance);
    endurance.manager_id = Some(manager);
    let created = service
        .create_one_off_event(&as_manager, endurance)
        .await
        .unwrap();
    assert_eq!(created.team_id, Some(team));

    let may = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
    )
    .unwrap();

    let (_, managing) = service.visible_events(&as_manager, may).await.unwrap();
    assert_eq!(managing.len(), 1);

    let (_, driving) = service
        .visible_events(&principal(a, &[Role::Driver]), may)
        .await
        .unwrap();
    assert_eq!(driving.len(), 1);

    let (_, team_feed) = service
        .visible_events(&principal(social, &[Role::SocialMedia]), may)
        .await
        .unwrap();
    assert_eq!(team_feed.len(), 1);

    let (view, nothing) = service
        .visible_events(&principal(Uuid::new_v4(), &[]), may)
        .await
        .unwrap();
    assert!(view.is_none());
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn test_edit_record_and_review_results() {
    let store = InMemoryEventStore::new();
    let (team, manager, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    store.add_team(team, "Pit Lane", manager, None);
    store.add_user(a, "Ana", Some(team));
    store.add_user(b, "Ben", Some(team));
    let service = EventService::new(Arc::new(store));

    let driver_a = principal(a, &[Role::Driver]);
    let as_manager = principal(manager, &[Role::Manager]);

    let created = service
        .create_one_off_event(&driver_a, draft(2024, 6, 8, vec![a]))
        .await
        .unwrap();

    let edited = service
        .edit_event(
            &driver_a,
            created.id,
            EventEdit {
                driver_ids: Some(vec![a, b]),
                event_type: Some(EventType::Endurance),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.event_type, EventType::Endurance);
    assert_eq!(edited.drivers.len(), 2);

    let reset = service
        .edit_event(&driver_a, created.id, EventEdit::default())
        .await
        .unwrap();
    assert_eq!(reset.event_type, EventType::Sprint);

    // The manager is not on this event
    let denied = service
        .record_result(
            &as_manager,
            created.id,
            ResultInput {
                position: 1,
                fastest_lap_ms: None,
                notes: None,
            },
        )
        .await;
    assert!(matches!(denied, Err(Error::NotFound(_))));

    service
        .record_result(
            &driver_a,
            created.id,
            ResultInput {
                position: 2,
                fastest_lap_ms: Some(97_321),
                notes: Some("Tyre wear".to_string()),
            },
        )
        .await
        .unwrap();

    let june = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    )
    .unwrap();
    let results = service
        .team_results(&as_manager, june, ResultSort::Position)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result.as_ref().map(|r| r.position), Some(2));

    service.delete_event(&driver_a, created.id).await.unwrap();
    assert!(service
        .team_results(&as_manager, june, ResultSort::Date)
        .await
        .unwrap()
        .is_empty());
}
