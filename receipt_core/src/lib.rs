//! Core library for the receipt search and analytics server: record models,
//! the search, sort and aggregation engines, and the HTTP surface over them.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod search;
pub mod services;
pub mod sort;
pub mod store;

pub use aggregate::{AggregateFunction, AggregateOutput, AggregateParams, AggregationEngine, TimeWindow};
pub use config::AppConfig;
pub use error::{AppError, EngineError, Result};
pub use handlers::routes::create_routes;
pub use models::{FieldAccess, FieldValue, LineItem, Receipt};
pub use search::{SearchEngine, SearchMatch, SearchParams, SearchStrategy};
pub use services::AnalyticsService;
pub use sort::{SortAlgorithm, SortEngine};
pub use store::{ReceiptRepository, ReceiptStore};

use axum::Router;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub repository: Arc<dyn ReceiptRepository>,
    pub analytics: AnalyticsService,
}

impl AppState {
    pub fn new(repository: Arc<dyn ReceiptRepository>, config: &AppConfig) -> Self {
        Self {
            app_name: "Receipt Analytics Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            analytics: AnalyticsService::from_config(repository.clone(), &config.analytics),
            repository,
        }
    }

    /// Builds the state over a store seeded from `data.seed_file` when configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = match &config.data.seed_file {
            Some(path) if path.exists() => ReceiptStore::from_seed_file(path)?,
            _ => ReceiptStore::new(),
        };
        Ok(Self::new(Arc::new(store), config))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(ReceiptStore::new()), &AppConfig::default())
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &AppConfig::default())
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    let router = create_routes()
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_seconds)))
        .layer(middleware::cors_layer_from_config(&config.cors));

    middleware::with_request_tracing(router).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
