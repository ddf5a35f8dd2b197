//! Championship handlers

use axum::{extract::State, http::StatusCode, Json};
use pitwall_auth::{AuthUser, ManagerUser};
use pitwall_common::{Result, ValidatedJson};
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::EventsState;
use crate::domain::entities::Championship;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChampionshipRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub organizer: String,
}

/// POST /v1/championships - Managers register a championship series
pub async fn create_championship(
    ManagerUser(ctx): ManagerUser,
    State(state): State<EventsState>,
    ValidatedJson(request): ValidatedJson<CreateChampionshipRequest>,
) -> Result<(StatusCode, Json<Championship>)> {
    let championship = state
        .service
        .create_championship(&ctx, &request.name, &request.organizer)
        .await?;

    Ok((StatusCode::CREATED, Json(championship)))
}

/// GET /v1/championships - All championships, by name
pub async fn list_championships(
    AuthUser(_ctx): AuthUser,
    State(state): State<EventsState>,
) -> Result<Json<Vec<Championship>>> {
    let championships = state.service.list_championships().await?;
    Ok(Json(championships))
}
