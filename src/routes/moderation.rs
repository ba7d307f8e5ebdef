use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::moderation_dto::{BlockPayload, BlockStatusQuery, ReportPayload},
    error::Result,
    services::moderation_service::BlockStatus,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/block",
    responses(
        (status = 200, description = "User blocked (idempotent)"),
        (status = 400, description = "Missing fields or self-block")
    )
)]
#[axum::debug_handler]
pub async fn block(
    State(state): State<AppState>,
    Json(payload): Json<BlockPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .moderation_service
        .block(&payload.blocker, &payload.blocked)
        .await?;
    Ok(Json(json!({ "message": "User blocked" })))
}

#[utoipa::path(
    delete,
    path = "/api/block",
    responses(
        (status = 200, description = "User unblocked")
    )
)]
#[axum::debug_handler]
pub async fn unblock(
    State(state): State<AppState>,
    Json(payload): Json<BlockPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .moderation_service
        .unblock(&payload.blocker, &payload.blocked)
        .await?;
    Ok(Json(json!({ "message": "User unblocked" })))
}

#[utoipa::path(
    get,
    path = "/api/block/status",
    params(
        ("userA" = String, Query, description = "Viewing user"),
        ("userB" = String, Query, description = "Other user")
    ),
    responses(
        (status = 200, description = "Block relationship seen from userA", body = Json<BlockStatus>)
    )
)]
#[axum::debug_handler]
pub async fn block_status(
    State(state): State<AppState>,
    Query(query): Query<BlockStatusQuery>,
) -> Result<impl IntoResponse> {
    let status = state
        .moderation_service
        .status(&query.user_a, &query.user_b)
        .await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/report",
    responses(
        (status = 201, description = "Report recorded"),
        (status = 400, description = "Missing fields")
    )
)]
#[axum::debug_handler]
pub async fn report(
    State(state): State<AppState>,
    Json(payload): Json<ReportPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let report = state
        .moderation_service
        .report(&payload.reporter, &payload.target, &payload.reason, payload.chat_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Report submitted", "reportId": report.id })),
    ))
}
