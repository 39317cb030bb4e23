//! Receipt records as produced by the extraction pipeline

use crate::models::field::{FieldAccess, FieldValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: u64,
    pub vendor: String,
    pub transaction_date: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub category: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub upload_timestamp: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Fields a caller may name for search, sort and aggregation requests.
pub const SEARCHABLE_FIELDS: &[&str] = &[
    "vendor",
    "transaction_date",
    "amount",
    "category",
    "confidence_score",
];

/// Fields a receipt update may touch.
pub const UPDATABLE_FIELDS: &[&str] = &["vendor", "amount", "category", "currency", "transaction_date"];

impl Receipt {
    pub fn new(id: u64, vendor: impl Into<String>, transaction_date: impl Into<String>, amount: f64) -> Self {
        Self {
            id,
            vendor: vendor.into(),
            transaction_date: transaction_date.into(),
            amount,
            currency: default_currency(),
            category: "Other".to_string(),
            confidence_score: 0.0,
            extracted_text: String::new(),
            items: Vec::new(),
            file_name: String::new(),
            upload_timestamp: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_confidence(mut self, confidence_score: f64) -> Self {
        self.confidence_score = confidence_score;
        self
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_upload_timestamp(mut self, upload_timestamp: impl Into<String>) -> Self {
        self.upload_timestamp = upload_timestamp.into();
        self
    }
}

impl FieldAccess for Receipt {
    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => FieldValue::Number(self.id as f64),
            "vendor" => FieldValue::Text(self.vendor.clone()),
            "transaction_date" => FieldValue::Text(self.transaction_date.clone()),
            "amount" => FieldValue::Number(self.amount),
            "currency" => FieldValue::Text(self.currency.clone()),
            "category" => FieldValue::Text(self.category.clone()),
            "confidence_score" => FieldValue::Number(self.confidence_score),
            "extracted_text" => FieldValue::Text(self.extracted_text.clone()),
            "file_name" => FieldValue::Text(self.file_name.clone()),
            "upload_timestamp" => FieldValue::Text(self.upload_timestamp.clone()),
            "item_count" => FieldValue::Number(self.items.len() as f64),
            _ => return None,
        };
        Some(value)
    }

    fn record_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}
