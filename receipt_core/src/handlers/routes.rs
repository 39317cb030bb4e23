//! Route table for the receipt API

use crate::{
    handlers::{analytics, export, health, receipts},
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::handle_root))
        .route("/health", get(health::handle_health))
        .route(
            "/api/receipts",
            get(receipts::handle_list_receipts).post(receipts::handle_create_receipt),
        )
        .route(
            "/api/receipts/:id",
            get(receipts::handle_get_receipt)
                .patch(receipts::handle_update_receipt)
                .delete(receipts::handle_delete_receipt),
        )
        .route("/api/search", post(analytics::handle_search))
        .route("/api/analytics/sort", post(analytics::handle_sort))
        .route("/api/analytics/aggregate", post(analytics::handle_aggregate))
        .route("/api/analytics/statistics", get(analytics::handle_statistics))
        .route("/api/analytics/algorithms", get(analytics::handle_algorithms))
        .route("/api/export/json", get(export::handle_export_json))
        .route("/api/export/csv", get(export::handle_export_csv))
}
