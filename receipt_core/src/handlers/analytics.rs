//! Search, sort and aggregation handlers

use crate::{
    error::Result,
    extractors::ValidatedJson,
    models::{AggregateRequest, ApiResponse, SearchRequest, SortRequest},
    AppState,
};
use axum::{extract::State, response::IntoResponse, Json};

pub async fn handle_search(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SearchRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state.analytics.search(&request).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn handle_sort(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SortRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state.analytics.sort(&request).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn handle_aggregate(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AggregateRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state.analytics.aggregate(&request).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn handle_statistics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let statistics = state.analytics.statistics().await?;
    Ok(Json(ApiResponse::success(statistics)))
}

pub async fn handle_algorithms(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.analytics.algorithm_info()))
}
