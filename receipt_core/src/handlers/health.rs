//! Root and health check handlers

use crate::{models::ApiResponse, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::warn;

pub async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(serde_json::json!({
        "app": state.app_name,
        "version": state.version,
        "message": "Receipt search and analytics API",
        "endpoints": {
            "health": "/health",
            "receipts": "/api/receipts",
            "receipt": "/api/receipts/{id}",
            "search": "/api/search",
            "sort": "/api/analytics/sort",
            "aggregate": "/api/analytics/aggregate",
            "statistics": "/api/analytics/statistics",
            "algorithms": "/api/analytics/algorithms",
            "export_json": "/api/export/json",
            "export_csv": "/api/export/csv"
        }
    })))
}

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.repository.count().await {
        Ok(receipt_count) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().timestamp(),
                "receipt_count": receipt_count,
                "version": state.version,
            }))),
        ),
        Err(e) => {
            warn!("Health check could not reach the receipt store: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::success(serde_json::json!({
                    "status": "unhealthy",
                    "timestamp": chrono::Utc::now().timestamp(),
                    "version": state.version,
                }))),
            )
        }
    }
}
