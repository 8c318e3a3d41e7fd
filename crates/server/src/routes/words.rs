use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::wall::DEFAULT_TOP_LIMIT;
use service::{TallyTable, WallStats};
use tracing::warn;

use super::AppState;
use crate::errors::ApiError;
use crate::observability::{self, WORDS_RECORDED_TOTAL};

/// Upper bound for `GET /stats?limit=`.
const MAX_TOP_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct NewWord {
    #[serde(default)]
    pub word: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: &str) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub limit: Option<usize>,
}

/// `POST /words`
pub async fn post_word(
    State(state): State<AppState>,
    payload: Result<Json<NewWord>, JsonRejection>,
) -> Result<(StatusCode, Json<Ack>), ApiError> {
    let Json(input) = payload?;
    let raw = input.word.unwrap_or_default();

    match state.wall.record_word(&raw).await {
        Ok(_) => {
            WORDS_RECORDED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(Ack::ok("Word added successfully"))))
        }
        Err(e) => {
            observability::record_failure("record_word", &e);
            Err(e.into())
        }
    }
}

/// `GET /word-counts`
pub async fn word_counts(State(state): State<AppState>) -> Result<Json<TallyTable>, ApiError> {
    match state.wall.snapshot().await {
        Ok(table) => Ok(Json(table)),
        Err(e) => {
            observability::record_failure("snapshot", &e);
            if state.empty_snapshot_on_store_error {
                warn!(operation = "snapshot", error = %e, "serving empty snapshot after store error");
                Ok(Json(TallyTable::new()))
            } else {
                Err(e.into())
            }
        }
    }
}

/// `GET /stats?limit=N`
pub async fn stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<WallStats>, ApiError> {
    let Query(q) = query?;
    let limit = q.limit.unwrap_or(DEFAULT_TOP_LIMIT).min(MAX_TOP_LIMIT);
    state.wall.stats(limit).await.map(Json).map_err(|e| {
        observability::record_failure("stats", &e);
        e.into()
    })
}
