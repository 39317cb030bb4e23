use crate::aggregate::TimeWindow;
use crate::search::SearchStrategy;
use crate::sort::SortAlgorithm;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub analytics: AnalyticsConfig,
    pub data: DataConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub default_search_strategy: SearchStrategy,
    pub default_sort_algorithm: SortAlgorithm,
    pub fuzzy_threshold: f64,
    pub histogram_bins: usize,
    pub time_field: String,
    pub time_window: TimeWindow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of receipts loaded at startup.
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_any_origin: bool,
    pub max_age_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_search_strategy: SearchStrategy::Linear,
            default_sort_algorithm: SortAlgorithm::Adaptive,
            fuzzy_threshold: 0.7,
            histogram_bins: 10,
            time_field: "transaction_date".to_string(),
            time_window: TimeWindow::Monthly,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:8501".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            allow_any_origin: false,
            max_age_seconds: 3600,
        }
    }
}

impl AppConfig {
    /// Defaults, then `config.toml` when present, then `APP_` variables
    /// (`APP_SERVER__PORT`, `APP_ANALYTICS__FUZZY_THRESHOLD`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.analytics.fuzzy_threshold) {
            return Err(ConfigError::Message(
                "Fuzzy threshold must be between 0 and 1".to_string(),
            ));
        }

        if self.analytics.histogram_bins == 0 {
            return Err(ConfigError::Message(
                "Histogram bins must be greater than 0".to_string(),
            ));
        }

        if self.analytics.time_field.is_empty() {
            return Err(ConfigError::Message("Time field cannot be empty".to_string()));
        }

        if let Some(seed_file) = &self.data.seed_file {
            if !seed_file.exists() {
                tracing::warn!("Seed file {} does not exist, starting empty", seed_file.display());
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
