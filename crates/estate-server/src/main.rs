use anyhow::{Context, Result};
use estate_db::{create_pool, run_migrations};
use estate_server::config::load_config;
use estate_server::media::{CloudinaryHost, ImageHost};
use estate_server::state::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting estate server");

    // Load configuration
    let config_path =
        std::env::var("ESTATE_CONFIG").unwrap_or_else(|_| "server-config.yaml".to_string());
    tracing::info!("Loading config from: {}", config_path);
    let config = load_config(&config_path)?;

    // Create database pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.db.url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;

    let images: Option<Arc<dyn ImageHost>> = match &config.media {
        Some(media) => {
            tracing::info!("Image uploads go to cloud '{}'", media.cloud_name);
            Some(Arc::new(CloudinaryHost::new(media.clone())))
        }
        None => {
            tracing::warn!("No media config; image uploads are disabled");
            None
        }
    };

    if !config.listings.enforce_update_ownership {
        tracing::warn!("Listing updates are not restricted to their owner");
    }

    let listen = config.listen.clone();
    let state = AppState::new(pool, config, images);
    let app = estate_server::web::build_router(state);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind to {}", listen))?;

    tracing::info!("Server listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping...");
}
