use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use super::{read_form, Form};
use crate::{
    dto::application_dto::{ApplicationSubmitted, SelectionResponse},
    dto::chat_dto::UsernameQuery,
    error::{Error, Result},
    models::application::ApplicantDetails,
    AppState,
};

fn applicant_details(form: &Form) -> Result<ApplicantDetails> {
    let age = form
        .text("age")
        .map(|raw| raw.parse::<i32>())
        .transpose()
        .map_err(|_| Error::BadRequest("age must be a whole number".to_string()))?;
    Ok(ApplicantDetails {
        applicant_name: form.text("applicantName"),
        age,
        address: form.text("address"),
        contact_no: form.text("contactNo"),
        email: form.text("email"),
    })
}

#[utoipa::path(
    post,
    path = "/api/apply",
    request_body(content = String, content_type = "multipart/form-data", description = "jobId, username, applicant fields and an optional `resume` file"),
    responses(
        (status = 201, description = "Application submitted", body = Json<ApplicationSubmitted>),
        (status = 400, description = "Missing fields or not a job seeker"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already applied to this job")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(multipart, "resume").await?;
    let job_id = form
        .required("jobId")?
        .parse::<Uuid>()
        .map_err(|_| Error::BadRequest("jobId must be a UUID".to_string()))?;
    let username = form.required("username")?;
    let details = applicant_details(&form)?;

    let application = state
        .application_service
        .apply(job_id, &username, details, form.file)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationSubmitted {
            message: "Application submitted".to_string(),
            application,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/my-applications",
    params(
        ("username" = String, Query, description = "Seeker username")
    ),
    responses(
        (status = 200, description = "The seeker's applications with their jobs"),
        (status = 400, description = "Not a job seeker")
    )
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_applicant(query.username.trim())
        .await?;
    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application with job and applicant"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(id).await?;
    Ok(Json(application))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/select",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Applicant selected, chat ready", body = Json<SelectionResponse>),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn select_applicant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (application, chat) = state.application_service.select_applicant(id).await?;
    Ok(Json(SelectionResponse {
        message: "Applicant selected".to_string(),
        application_id: application.id,
        chat_id: chat.id,
    }))
}
