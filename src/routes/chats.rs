use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::read_form;
use crate::{
    dto::chat_dto::{
        CreateChatPayload, EditMessagePayload, MarkReadResponse, UsernamePayload, UsernameQuery,
    },
    error::{Error, Result},
    models::message::Attachment,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/chats",
    params(
        ("username" = String, Query, description = "Participant username")
    ),
    responses(
        (status = 200, description = "Chats of the user, most recently active first"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn list_chats(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let chats = state.chat_service.list_chats(query.username.trim()).await?;
    Ok(Json(chats))
}

#[utoipa::path(
    post,
    path = "/api/chats/create",
    responses(
        (status = 200, description = "Existing or newly created chat"),
        (status = 400, description = "Missing participants or self-chat"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn create_chat(
    State(state): State<AppState>,
    Json(payload): Json<CreateChatPayload>,
) -> Result<impl IntoResponse> {
    let (a, b) = payload.participants().ok_or_else(|| {
        Error::BadRequest("Two participant usernames are required".to_string())
    })?;
    let chat = state
        .chat_service
        .get_or_create_chat(a, b, payload.job_id, payload.application_id)
        .await?;
    Ok(Json(chat))
}

#[utoipa::path(
    get,
    path = "/api/chats/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Chat ID")
    ),
    responses(
        (status = 200, description = "Messages, oldest first"),
        (status = 404, description = "Chat not found")
    )
)]
#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let messages = state.chat_service.list_messages(id).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    post,
    path = "/api/chats/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Chat ID")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "username, optional content and an optional `file`"),
    responses(
        (status = 201, description = "Message sent"),
        (status = 400, description = "Empty message or sender not in chat"),
        (status = 403, description = "Messaging is blocked"),
        (status = 404, description = "Chat not found")
    )
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(multipart, "file").await?;
    let username = form.required("username")?;

    let attachment = match &form.file {
        Some(upload) => Some(Attachment::from(state.storage.save_upload(upload).await?)),
        None => None,
    };
    let message = state
        .chat_service
        .send_message(id, &username, form.text("content"), attachment)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": message }))))
}

#[utoipa::path(
    post,
    path = "/api/chats/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Chat ID")
    ),
    responses(
        (status = 200, description = "Messages marked read", body = Json<MarkReadResponse>),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UsernamePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state.chat_service.mark_read(id, payload.username.trim()).await?;
    Ok(Json(MarkReadResponse { chat_id: id, updated }))
}

#[utoipa::path(
    patch,
    path = "/api/messages/{id}",
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message edited"),
        (status = 403, description = "Not the sender"),
        (status = 404, description = "Message not found")
    )
)]
#[axum::debug_handler]
pub async fn edit_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state
        .chat_service
        .edit_message(id, payload.username.trim(), &payload.content)
        .await?;
    Ok(Json(json!({ "data": message })))
}

#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 403, description = "Not the sender"),
        (status = 404, description = "Message not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UsernamePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .chat_service
        .delete_message(id, payload.username.trim())
        .await?;
    Ok(Json(json!({ "message": "Message deleted", "messageId": id })))
}
