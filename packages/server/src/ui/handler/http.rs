//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{conversion::directory_dto, http::DirectoryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current directory, for debugging
pub async fn debug_directory(State(state): State<Arc<AppState>>) -> Json<DirectoryDto> {
    let view = state.get_directory_usecase.execute().await;
    Json(directory_dto(&view.users, view.open_connections))
}
