//! Result handlers
//!
//! - PUT /v1/events/{id}/result - Record or replace an event's result
//! - GET /v1/results/team - Team results for a month, by date or position

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use pitwall_auth::AuthUser;
use pitwall_common::{Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::EventsState;
use crate::api::query::TeamResultsQuery;
use crate::domain::entities::{Event, EventResult, ResultInput};

#[derive(Debug, Deserialize, Validate)]
pub struct RecordResultRequest {
    /// Finishing position, 1 for a win
    #[validate(range(min = 1, message = "Position must be at least 1"))]
    pub position: i32,

    #[validate(range(min = 1))]
    pub fastest_lap_ms: Option<i32>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<RecordResultRequest> for ResultInput {
    fn from(request: RecordResultRequest) -> Self {
        ResultInput {
            position: request.position,
            fastest_lap_ms: request.fastest_lap_ms,
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }
}

pub async fn record_result(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RecordResultRequest>,
) -> Result<Json<EventResult>> {
    let result = state.service.record_result(&ctx, id, request.into()).await?;
    Ok(Json(result))
}

pub async fn get_team_results(
    AuthUser(ctx): AuthUser,
    State(state): State<EventsState>,
    Query(query): Query<TeamResultsQuery>,
) -> Result<Json<Vec<Event>>> {
    let range = query.range(Utc::now().date_naive())?;
    let events = state.service.team_results(&ctx, range, query.sort).await?;
    Ok(Json(events))
}
