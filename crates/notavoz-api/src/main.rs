//! notavoz API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use notavoz_api::{app, identity::HttpIdentityService, rate_limiter_from_config, AppState};
use notavoz_core::AppConfig;
use notavoz_db::{Database, HttpBucketStore};
use notavoz_inference::{ChatTitleGenerator, PollingTranscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "notavoz_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notavoz_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notavoz-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Read the whole configuration exactly once
    let config = AppConfig::from_env()?;

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if config.server.rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        config.server.rate_limit_requests,
        config.server.rate_limit_period.as_secs()
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Periodic pool health logging
    let metrics_pool = db.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            notavoz_db::log_pool_metrics(&metrics_pool);
        }
    });

    // Create rate limiter if enabled
    let rate_limiter = rate_limiter_from_config(&config.server);

    // Create app state
    let state = AppState {
        identity: Arc::new(HttpIdentityService::new(&config.identity)),
        audio_store: Arc::new(HttpBucketStore::new(&config.storage)),
        transcriber: Arc::new(PollingTranscriber::new(&config.transcription)),
        titles: Arc::new(ChatTitleGenerator::new(&config.titles)),
        notes: Arc::new(db.notes.clone()),
        rate_limiter,
    };

    // Build router and start server
    let router = app(state);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
