//! Request and response models

use crate::models::receipt::{LineItem, SEARCHABLE_FIELDS};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 500, message = "Query must not exceed 500 characters"))]
    pub query: String,

    /// Falls back to the configured default strategy when omitted.
    pub algorithm: Option<String>,

    #[serde(default = "default_search_field")]
    #[validate(custom(function = "validate_searchable_field"))]
    pub field: String,

    #[validate(range(min = 0.0, max = 1.0, message = "Threshold must be between 0 and 1"))]
    pub threshold: Option<f64>,

    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub min_value: Option<f64>,

    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub max_value: Option<f64>,

    #[validate(length(max = 500, message = "Pattern must not exceed 500 characters"))]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SortRequest {
    #[validate(custom(function = "validate_searchable_field"))]
    pub field: String,

    #[serde(default = "default_sort_order")]
    #[validate(custom(function = "validate_sort_order"))]
    pub order: String,

    /// Falls back to the configured default algorithm when omitted.
    pub algorithm: Option<String>,
}

impl SortRequest {
    pub fn is_descending(&self) -> bool {
        self.order == "desc"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AggregateRequest {
    pub function: String,

    #[serde(default = "default_aggregate_field")]
    #[validate(custom(function = "validate_searchable_field"))]
    pub field: String,

    #[validate(custom(function = "validate_time_field"))]
    pub time_field: Option<String>,

    pub window: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Bins must be between 1 and 100"))]
    pub bins: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReceiptRequest {
    #[validate(length(min = 1, max = 255, message = "Vendor must be between 1 and 255 characters"))]
    pub vendor: String,

    #[validate(custom(function = "validate_iso_date"))]
    pub transaction_date: String,

    pub amount: f64,

    #[validate(length(min = 3, max = 3, message = "Currency must be a three letter code"))]
    pub currency: Option<String>,

    pub category: Option<String>,

    #[validate(range(min = 0.0, max = 1.0, message = "Confidence score must be between 0 and 1"))]
    pub confidence_score: Option<f64>,

    #[serde(default)]
    pub items: Vec<LineItem>,

    pub extracted_text: Option<String>,

    pub file_name: Option<String>,
}

fn default_search_field() -> String {
    "vendor".to_string()
}

fn default_aggregate_field() -> String {
    "amount".to_string()
}

fn default_sort_order() -> String {
    "asc".to_string()
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_searchable_field(field: &str) -> Result<(), ValidationError> {
    if SEARCHABLE_FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(invalid(
            "unsupported_field",
            format!("Field must be one of: {}", SEARCHABLE_FIELDS.join(", ")),
        ))
    }
}

fn validate_sort_order(order: &str) -> Result<(), ValidationError> {
    match order {
        "asc" | "desc" => Ok(()),
        _ => Err(invalid("invalid_order", "Order must be 'asc' or 'desc'".to_string())),
    }
}

fn validate_time_field(field: &str) -> Result<(), ValidationError> {
    match field {
        "transaction_date" | "upload_timestamp" => Ok(()),
        _ => Err(invalid(
            "invalid_time_field",
            "Time field must be 'transaction_date' or 'upload_timestamp'".to_string(),
        )),
    }
}

pub fn validate_iso_date(date: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid("invalid_date", "Date must use the YYYY-MM-DD format".to_string()))
}

/// Range bounds arrive either as JSON numbers or as numeric strings.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", s))),
        Some(other) => Err(serde::de::Error::custom(format!("expected a number, got {}", other))),
    }
}
