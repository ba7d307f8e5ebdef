use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::chat_dto::UsernameQuery,
    dto::notification_dto::{MarkAllReadPayload, MarkAllReadResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(
        ("username" = String, Query, description = "Recipient username")
    ),
    responses(
        (status = 200, description = "Notifications, newest first")
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let notifications = state
        .notification_service
        .list(query.username.trim())
        .await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read"),
        (status = 404, description = "Notification not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let notification = state.notification_service.mark_read(id).await?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/api/notifications/mark-read",
    responses(
        (status = 200, description = "All notifications of the user marked read", body = Json<MarkAllReadResponse>)
    )
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Json(payload): Json<MarkAllReadPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state
        .notification_service
        .mark_all_read(payload.username.trim())
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
