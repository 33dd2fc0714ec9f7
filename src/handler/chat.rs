use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::post;
use axum::Router;
use tracing::instrument;

use crate::AppState;
use crate::dtos::{ChatRequestDto, ChatResponseDto};
use crate::error::{ErrorMessage, HttpError};
use crate::service::chat;

pub fn chat_handler() -> Router<AppState> {
    Router::new().route("/", post(ask))
}

/// Answer a question about the community using the whole database as context
#[instrument(skip(app_state, body))]
pub async fn ask(
    State(app_state): State<AppState>,
    Json(body): Json<ChatRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    let prompt = chat::validate_prompt(&body.prompt)?;

    let snapshot = app_state.db_client.snapshot().await.map_err(|e| {
        tracing::error!("DB error, taking snapshot: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let collections = snapshot.collections().map_err(|e| {
        tracing::error!("Snapshot serialization error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let full_prompt = chat::build_prompt(prompt, &chat::render_context(&collections));
    tracing::debug!(chars = full_prompt.chars().count(), "Sending prompt to Gemini");

    let response = app_state
        .http_client
        .generate_content(
            &app_state.env.gemini_url,
            &app_state.env.gemini_model,
            &app_state.env.gemini_api_key,
            &full_prompt,
        )
        .await?;

    tracing::info!("chat successful");
    Ok(Json(ChatResponseDto {
        status: "success".to_string(),
        response,
    }))
}
