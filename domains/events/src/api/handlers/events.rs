//! Event handlers
//!
//! Views are scoped by role: drivers see events they drive, managers the
//! events they manage, everyone with a team the team feed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use pitwall_auth::{AuthUser, DriverUser, ManagerUser};
use pitwall_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::EventsState;
use crate::api::query::RangeQuery;
use crate::domain::entities::{Event, EventType, MAX_EVENT_DURATION_MINUTES};
use crate::domain::scope::{DateRange, EventView};
use crate::service::{EventDraft, EventEdit};

/// Request for creating a one-off event
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    pub date: DateTime<Utc>,

    /// Defaults per endpoint: sprint for one-off, championship for rounds
    #[serde(rename = "type", default)]
    pub event_type: Option<EventType>,

    #[validate(length(min = 1, max = 100))]
    pub car: String,

    #[validate(length(min = 1, max = 100))]
    pub track: String,

    /// Minutes
    #[validate(range(min = 1, max = MAX_EVENT_DURATION_MINUTES))]
    pub duration: i32,

    pub manager_id: Option<Uuid>,

    /// Empty or absent: the caller drives
    #[serde(default)]
    pub driver_ids: Vec<Uuid>,
}

impl CreateEventRequest {
    fn into_draft(self, team_id: Option<Uuid>) -> EventDraft {
        EventDraft {
            title: self.title,
            date: self.date,
            event_type: self.event_type,
            car: self.car,
            track: self.track,
            duration: self.duration,
            manager_id: self.manager_id,
            team_id,
            driver_ids: self.driver_ids,
        }
    }
}

/// Request for creating a championship round
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChampionshipEventRequest {
    pub championship_id: Uuid,

    pub team_id: Option<Uuid>,

    #[serde(flatten)]
    #[validate(nested)]
    pub event: CreateEventRequest,
}

/// Partial event update
///
/// Omitting `type` stores a sprint. A `driver_ids` list replaces all drivers.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditEventRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "type", default)]
    pub event_type: Option<EventType>,

    #[validate(length(min = 1, max = 100))]
    pub car: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub track: Option<String>,

    #[validate(range(min = 1, max = MAX_EVENT_DURATION_MINUTES))]
    pub duration: Option<i32>,

    pub driver_ids: Option<Vec<Uuid>>,
}

impl From<EditEventRequest> for EventEdit {
    fn from(request: EditEventRequest) -> Self {
        EventEdit {
            title: request.title,
            date: request.date,
            event_type: request.event_type,
            car: request.car,
            track: request.track,
            duration: request.duration,
            driver_ids: request.driver_ids,
        }
    }
}

/// Events of the caller's default view
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// `null` when the caller has no role or no team to view
    pub view: Option<EventView>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub events: Vec<Event>,
}

fn requested_range(query: &RangeQuery) -> Result<DateRange> {
    query.range(Utc::now().date_naive())
}

/// GET /v1/events - Default view for the caller's primary role
pub async fn get_events(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<EventsResponse>> {
    let range = requested_range(&query)?;
    let (view, events) = state.service.visible_events(&ctx, range).await?;

    Ok(Json(EventsResponse {
        view,
        from: range.first_day(),
        to: range.last_day(),
        events,
    }))
}

/// GET /v1/events/driving - Events the caller drives in
pub async fn get_driving_events(
    DriverUser(ctx): DriverUser,
    State(state): State<EventsState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Event>>> {
    let range = requested_range(&query)?;
    let events = state.service.driving_events(&ctx, range).await?;
    Ok(Json(events))
}

/// GET /v1/events/managing - Events the caller manages
pub async fn get_managing_events(
    ManagerUser(ctx): ManagerUser,
    State(state): State<EventsState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Event>>> {
    let range = requested_range(&query)?;
    let events = state.service.managing_events(&ctx, range).await?;
    Ok(Json(events))
}

/// GET /v1/events/team - Team feed; empty without a team
pub async fn get_team_events(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Event>>> {
    let range = requested_range(&query)?;
    let events = state.service.team_events(&ctx, range).await?;
    Ok(Json(events))
}

/// POST /v1/events/championship - Add a championship round
pub async fn create_championship_event(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    ValidatedJson(request): ValidatedJson<CreateChampionshipEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let championship_id = request.championship_id;
    let draft = request.event.into_draft(request.team_id);

    let event = state
        .service
        .create_championship_event(&ctx, championship_id, draft)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /v1/events/one-off - Add a sprint or endurance event
pub async fn create_one_off_event(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state
        .service
        .create_one_off_event(&ctx, request.into_draft(None))
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// PATCH /v1/events/{id} - Edit an event the caller takes part in
pub async fn edit_event(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<EditEventRequest>,
) -> Result<Json<Event>> {
    let event = state.service.edit_event(&ctx, id, request.into()).await?;
    Ok(Json(event))
}

/// DELETE /v1/events/{id} - Delete an event the caller takes part in
pub async fn delete_event(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service.delete_event(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
