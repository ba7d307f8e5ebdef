use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::coach_dto::{CoachPayload, CoachReply},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/ai/coach",
    responses(
        (status = 200, description = "Coach reply", body = Json<CoachReply>),
        (status = 400, description = "Empty message")
    )
)]
#[axum::debug_handler]
pub async fn ask_coach(
    State(state): State<AppState>,
    Json(payload): Json<CoachPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reply = state
        .coach_service
        .ask(payload.username.trim(), &payload.message)
        .await?;
    Ok(Json(CoachReply { reply }))
}
