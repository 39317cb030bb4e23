//! Receipt persistence: the repository seam and its in-memory implementation

use crate::error::{AppError, Result};
use crate::models::request::validate_iso_date;
use crate::models::{CreateReceiptRequest, Receipt};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Receipt>>;
    async fn get(&self, id: u64) -> Result<Receipt>;
    async fn insert(&self, request: CreateReceiptRequest) -> Result<Receipt>;
    async fn update_fields(&self, id: u64, updates: &Map<String, Value>) -> Result<Receipt>;
    async fn delete(&self, id: u64) -> Result<()>;
    async fn count(&self) -> Result<usize>;
}

#[derive(Clone)]
pub struct ReceiptStore {
    receipts: Arc<RwLock<BTreeMap<u64, Receipt>>>,
    next_id: Arc<RwLock<u64>>,
}

impl ReceiptStore {
    pub fn new() -> Self {
        Self::from_receipts(Vec::new())
    }

    pub fn from_receipts(receipts: Vec<Receipt>) -> Self {
        let next_id = receipts.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let receipts: BTreeMap<u64, Receipt> = receipts.into_iter().map(|r| (r.id, r)).collect();

        Self {
            receipts: Arc::new(RwLock::new(receipts)),
            next_id: Arc::new(RwLock::new(next_id)),
        }
    }

    /// Loads a JSON array of receipts.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let receipts: Vec<Receipt> = serde_json::from_str(&contents)?;
        info!("Loaded {} receipts from {}", receipts.len(), path.display());
        Ok(Self::from_receipts(receipts))
    }

    fn not_found(id: u64) -> AppError {
        AppError::NotFound(format!("Receipt with id {} not found", id))
    }
}

impl Default for ReceiptStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the recognised keys of `updates`. Unknown keys are ignored.
fn apply_updates(receipt: &mut Receipt, updates: &Map<String, Value>) -> Result<()> {
    for (key, value) in updates {
        match key.as_str() {
            "vendor" => {
                let vendor = required_text(key, value)?;
                if vendor.is_empty() {
                    return Err(AppError::Validation("vendor cannot be empty".to_string()));
                }
                receipt.vendor = vendor;
            }
            "amount" => {
                receipt.amount = value
                    .as_f64()
                    .ok_or_else(|| AppError::Validation("amount must be a number".to_string()))?;
            }
            "category" => receipt.category = required_text(key, value)?,
            "currency" => receipt.currency = required_text(key, value)?,
            "transaction_date" => {
                let date = required_text(key, value)?;
                validate_iso_date(&date)
                    .map_err(|_| AppError::Validation("transaction_date must use YYYY-MM-DD".to_string()))?;
                receipt.transaction_date = date;
            }
            other => debug!("Ignoring non-updatable field '{}'", other),
        }
    }
    Ok(())
}

fn required_text(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AppError::Validation(format!("{} must be a string", key)))
}

#[async_trait]
impl ReceiptRepository for ReceiptStore {
    async fn list_all(&self) -> Result<Vec<Receipt>> {
        Ok(self.receipts.read().values().cloned().collect())
    }

    async fn get(&self, id: u64) -> Result<Receipt> {
        self.receipts.read().get(&id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn insert(&self, request: CreateReceiptRequest) -> Result<Receipt> {
        let mut receipts = self.receipts.write();
        let mut next_id = self.next_id.write();

        let id = *next_id;
        *next_id += 1;

        let mut receipt = Receipt::new(id, request.vendor, request.transaction_date, request.amount)
            .with_items(request.items)
            .with_upload_timestamp(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());
        if let Some(currency) = request.currency {
            receipt.currency = currency;
        }
        if let Some(category) = request.category {
            receipt.category = category;
        }
        receipt.confidence_score = request.confidence_score.unwrap_or(1.0);
        receipt.extracted_text = request.extracted_text.unwrap_or_default();
        receipt.file_name = request.file_name.unwrap_or_default();

        receipts.insert(id, receipt.clone());
        Ok(receipt)
    }

    async fn update_fields(&self, id: u64, updates: &Map<String, Value>) -> Result<Receipt> {
        let mut receipts = self.receipts.write();
        let receipt = receipts.get_mut(&id).ok_or_else(|| Self::not_found(id))?;

        // Work on a copy so a rejected value leaves the stored receipt untouched.
        let mut updated = receipt.clone();
        apply_updates(&mut updated, updates)?;
        *receipt = updated.clone();

        Ok(updated)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.receipts.write().remove(&id).map(|_| ()).ok_or_else(|| Self::not_found(id))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.receipts.read().len())
    }
}
