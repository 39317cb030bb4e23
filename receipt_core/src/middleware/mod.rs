//! Middleware layers applied to the router

pub mod cors;
pub mod logging;

pub use cors::cors_layer_from_config;
pub use logging::with_request_tracing;
