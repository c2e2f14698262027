mod config;
mod error;
mod rate_limit;
mod roi;
mod routes;
mod server;
mod settings;
mod state;

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{AppConfig, CliArgs};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Keep the guard alive for the whole run so buffered file logs flush.
    let (file_layer, _log_guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "roi-comparator.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                ),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roi_comparator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    info!("Starting roi-comparator v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = args.data_dir.clone().unwrap_or_else(config::default_data_dir);
    let settings_file = settings::settings_path(&data_dir);
    let settings = settings::load_settings(&settings_file);
    let config = AppConfig::from_args(args, &settings);
    let port = config.port;

    info!("Data dir: {:?}", config.data_dir);
    info!(
        "Rate limit: {} attempts / {} ms window, {} ms block",
        config.rate_limit.max_attempts,
        config.rate_limit.window_ms,
        config.rate_limit.block_duration_ms
    );

    let state = match AppState::open(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to open login attempt database: {}", e);
            return Err(e);
        }
    };

    let router = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
