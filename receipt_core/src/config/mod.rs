pub mod settings;

pub use settings::{AnalyticsConfig, AppConfig, CorsConfig, DataConfig, ServerConfig};
