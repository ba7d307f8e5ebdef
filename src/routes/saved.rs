use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::chat_dto::UsernameQuery,
    dto::job_dto::SaveJobPayload,
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/saved",
    params(
        ("username" = String, Query, description = "Seeker username")
    ),
    responses(
        (status = 200, description = "Saved jobs, most recently saved first"),
        (status = 400, description = "Not a job seeker")
    )
)]
#[axum::debug_handler]
pub async fn list_saved(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.saved_service.list(query.username.trim()).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    post,
    path = "/api/saved",
    responses(
        (status = 201, description = "Job saved"),
        (status = 200, description = "Job was already saved"),
        (status = 400, description = "Not a job seeker"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn save_job(
    State(state): State<AppState>,
    Json(payload): Json<SaveJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    match state
        .saved_service
        .save(payload.username.trim(), payload.job_id)
        .await
    {
        Ok(_) => Ok((StatusCode::CREATED, Json(json!({ "message": "Saved" })))),
        Err(Error::DuplicateSave) => Ok((StatusCode::OK, Json(json!({ "message": "Already saved" })))),
        Err(e) => Err(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/saved/{job_id}",
    params(
        ("job_id" = Uuid, Path, description = "Job ID"),
        ("username" = String, Query, description = "Seeker username")
    ),
    responses(
        (status = 200, description = "Bookmark removed"),
        (status = 400, description = "Not a job seeker")
    )
)]
#[axum::debug_handler]
pub async fn remove_saved(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    state
        .saved_service
        .remove(query.username.trim(), job_id)
        .await?;
    Ok(Json(json!({ "message": "Removed" })))
}
