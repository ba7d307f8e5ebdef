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
    dto::job_dto::{CreateJobPayload, JobCreatedResponse, JobSearchQuery, ProviderJobsQuery},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs",
    responses(
        (status = 201, description = "Job posted", body = Json<JobCreatedResponse>),
        (status = 400, description = "Invalid payload or not a job provider")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobCreatedResponse {
            message: "Job added successfully".to_string(),
            job,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("username" = String, Query, description = "Provider username")
    ),
    responses(
        (status = 200, description = "Jobs posted by the provider, newest first"),
        (status = 400, description = "Not a job provider")
    )
)]
#[axum::debug_handler]
pub async fn list_provider_jobs(
    State(state): State<AppState>,
    Query(query): Query<ProviderJobsQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_for_provider(query.username.trim()).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/all-jobs",
    params(
        ("q" = Option<String>, Query, description = "Title search"),
        ("jobType" = Option<String>, Query, description = "job | internship"),
        ("workMode" = Option<String>, Query, description = "onsite | remote | hybrid"),
        ("category" = Option<String>, Query, description = "Category substring"),
        ("location" = Option<String>, Query, description = "Location substring"),
        ("remoteOnly" = Option<bool>, Query, description = "Only remote jobs"),
        ("minStipend" = Option<String>, Query, description = "Minimum stipend"),
        ("durationMax" = Option<i32>, Query, description = "Maximum duration in weeks"),
        ("startFrom" = Option<String>, Query, description = "Earliest start date"),
        ("skills" = Option<String>, Query, description = "Comma-separated skills, all required"),
        ("perks" = Option<String>, Query, description = "Comma-separated perks, all required")
    ),
    responses(
        (status = 200, description = "Matching jobs, newest first"),
        (status = 400, description = "Invalid filter value")
    )
)]
#[axum::debug_handler]
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobSearchQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.into_filter()?;
    let jobs = state.job_service.search(&filter).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/recommendations",
    params(
        ("username" = String, Query, description = "Seeker username")
    ),
    responses(
        (status = 200, description = "Scored job recommendations"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.recommend(query.username.trim()).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job and its applications deleted"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(id).await?;
    Ok(Json(json!({ "message": "Job deleted" })))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Applications for the job, newest first"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applications = state.application_service.list_for_job(id).await?;
    Ok(Json(applications))
}
