use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{LoginPayload, LoginResponse, ProfileResponse, SignupPayload, UpdateProfilePayload},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/signup",
    responses(
        (status = 201, description = "User registered"),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Username already exists")
    )
)]
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .auth_service
        .signup(&payload.username, &payload.password, payload.role, payload.profile)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    responses(
        (status = 200, description = "Credentials accepted", body = Json<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        role: user.role,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile updated", body = Json<ProfileResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .auth_service
        .update_profile(&payload.username, payload.profile)
        .await?;
    Ok(Json(ProfileResponse {
        message: "Profile updated".to_string(),
        user,
    }))
}
