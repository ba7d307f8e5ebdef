use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::chat_dto::UsernameQuery,
    dto::interview_dto::{InterviewScheduled, ScheduleInterviewPayload},
    error::Result,
    services::interview_service::ScheduleInterview,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/interviews",
    responses(
        (status = 201, description = "Interview scheduled", body = Json<InterviewScheduled>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Interviewer is not the job provider"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let request = ScheduleInterview::try_from(payload)?;
    let interview = state.interview_service.schedule(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewScheduled {
            message: "Interview scheduled".to_string(),
            interview,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/interviews",
    params(
        ("username" = String, Query, description = "Interviewer or applicant username")
    ),
    responses(
        (status = 200, description = "Interviews involving the user")
    )
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let interviews = state.interview_service.list(&query.username).await?;
    Ok(Json(interviews))
}
