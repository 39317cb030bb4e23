//! Bulk export of every stored receipt

use crate::{
    error::{AppError, Result},
    models::Receipt,
    AppState,
};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use tracing::info;

const CSV_HEADER: [&str; 9] = [
    "id",
    "vendor",
    "transaction_date",
    "amount",
    "currency",
    "category",
    "confidence_score",
    "file_name",
    "upload_timestamp",
];

pub async fn handle_export_json(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let receipts = state.repository.list_all().await?;
    info!("Exporting {} receipts as JSON", receipts.len());

    let body = serde_json::to_string_pretty(&receipts)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=receipts.json"),
        ],
        body,
    ))
}

pub async fn handle_export_csv(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let receipts = state.repository.list_all().await?;
    info!("Exporting {} receipts as CSV", receipts.len());

    let body = receipts_to_csv(&receipts)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=receipts.csv"),
        ],
        body,
    ))
}

pub fn receipts_to_csv(receipts: &[Receipt]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for receipt in receipts {
        writer.write_record([
            receipt.id.to_string(),
            receipt.vendor.clone(),
            receipt.transaction_date.clone(),
            receipt.amount.to_string(),
            receipt.currency.clone(),
            receipt.category.clone(),
            receipt.confidence_score.to_string(),
            receipt.file_name.clone(),
            receipt.upload_timestamp.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
}
