//! Receipt CRUD handlers

use crate::{
    error::{AppError, Result},
    extractors::ValidatedJson,
    models::{ApiResponse, CreateReceiptRequest},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use tracing::info;

pub async fn handle_list_receipts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let receipts = state.repository.list_all().await?;
    info!("GET /api/receipts - {} receipts", receipts.len());
    Ok(Json(ApiResponse::success(receipts)))
}

pub async fn handle_get_receipt(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    info!("GET /api/receipts/{}", id);

    if id == 0 {
        return Err(AppError::BadRequest("Invalid receipt ID".to_string()));
    }

    let receipt = state.repository.get(id).await?;
    Ok(Json(ApiResponse::success(receipt)))
}

pub async fn handle_create_receipt(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReceiptRequest>,
) -> Result<impl IntoResponse> {
    info!("POST /api/receipts - vendor: {}", payload.vendor);

    let receipt = state.repository.insert(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}

pub async fn handle_update_receipt(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(updates): Json<Map<String, Value>>,
) -> Result<impl IntoResponse> {
    info!("PATCH /api/receipts/{} - fields: {:?}", id, updates.keys().collect::<Vec<_>>());

    if updates.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let receipt = state.repository.update_fields(id, &updates).await?;
    Ok(Json(ApiResponse::success(receipt)))
}

pub async fn handle_delete_receipt(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    info!("DELETE /api/receipts/{}", id);

    state.repository.delete(id).await?;
    Ok(Json(ApiResponse::with_message(
        serde_json::json!({ "id": id }),
        format!("Receipt {} deleted successfully", id),
    )))
}
