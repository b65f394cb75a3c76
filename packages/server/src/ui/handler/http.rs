//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{ErrorResponseDto, HistoryQuery, MessageDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the most recent messages, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageDto>>, (StatusCode, Json<ErrorResponseDto>)> {
    match state.get_recent_messages_usecase.execute(query.limit).await {
        Ok(messages) => {
            // Domain Model から DTO への変換
            Ok(Json(messages.iter().map(MessageDto::from).collect()))
        }
        Err(e) => {
            tracing::error!("Failed to fetch recent messages: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponseDto {
                    error: "failed to fetch messages".to_string(),
                }),
            ))
        }
    }
}
