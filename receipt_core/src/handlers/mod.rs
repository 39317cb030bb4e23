pub mod analytics;
pub mod export;
pub mod health;
pub mod receipts;
pub mod routes;
