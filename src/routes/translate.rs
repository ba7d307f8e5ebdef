use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::translate_dto::{TranslatePayload, Translation},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/translate",
    responses(
        (status = 200, description = "Translated text", body = Json<Translation>),
        (status = 400, description = "text and target are required"),
        (status = 502, description = "Translation unavailable")
    )
)]
#[axum::debug_handler]
pub async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslatePayload>,
) -> Result<impl IntoResponse> {
    let translation = state
        .translation_service
        .translate(&payload.text, &payload.target)
        .await?;
    Ok(Json(translation))
}
