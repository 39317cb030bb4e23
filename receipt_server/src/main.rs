//! Main entry point for the receipt analytics server binary

use anyhow::Result;
use receipt_core::{create_app_with_config, run_server, AppConfig, AppState};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let state = AppState::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialise receipt store: {}", e))?;

    let receipt_count = state.repository.count().await?;
    info!("App: {} v{}", state.app_name, state.version);
    match &config.data.seed_file {
        Some(path) => info!("Serving {} receipts seeded from {}", receipt_count, path.display()),
        None => info!("Serving an empty in-memory receipt store"),
    }
    info!(
        "Defaults: search={}, sort={}, window={}",
        config.analytics.default_search_strategy,
        config.analytics.default_sort_algorithm,
        config.analytics.time_window
    );

    let app = create_app_with_config(state, &config);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "receipt_server=debug,receipt_core=debug,tower_http=debug".into()
        } else {
            "receipt_server=info,receipt_core=info,tower_http=info".into()
        }
    });

    let json_output = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_line_number(true).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_line_number(true).pretty())
            .init();
    }
}
