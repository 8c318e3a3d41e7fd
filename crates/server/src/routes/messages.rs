use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::words::Ack;
use super::AppState;
use crate::errors::ApiError;
use crate::observability::{self, MESSAGES_RECORDED_TOTAL};

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /messages`
pub async fn post_message(
    State(state): State<AppState>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> Result<(StatusCode, Json<Ack>), ApiError> {
    let Json(input) = payload?;
    let raw = input.message.unwrap_or_default();

    state.wall.record_message(&raw).await.map_err(|e| {
        observability::record_failure("record_message", &e);
        ApiError::from(e)
    })?;
    MESSAGES_RECORDED_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(Ack::ok("Message posted successfully"))))
}

/// `GET /messages`: newest first, at most fifty.
pub async fn recent_messages(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    state.wall.recent_messages().await.map(Json).map_err(|e| {
        observability::record_failure("recent_messages", &e);
        e.into()
    })
}
