use anyhow::{Context, Result};
use std::sync::Arc;
use vantage_db::{MemoryUserStore, PgUserStore, UserStore, create_pool, run_migrations};
use vantage_server::config::load_config;
use vantage_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Vantage server");

    // Load configuration
    let config_path =
        std::env::var("VANTAGE_CONFIG").unwrap_or_else(|_| "server-config.yaml".to_string());

    tracing::info!("Loading config from: {}", config_path);

    let config = load_config(&config_path)?;

    tracing::info!("Config loaded successfully ({:?} profile)", config.profile);

    let users: Arc<dyn UserStore> = match &config.db {
        Some(db) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(&db.url, db.max_connections)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Running database migrations...");
            run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;

            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            Arc::new(MemoryUserStore::new())
        }
    };

    let listen = config.listen.clone();

    // Fails fast when the signing secret is missing
    let state = AppState::new(users, config).context("Invalid auth configuration")?;

    state
        .seed_initial_admin()
        .await
        .context("Failed to seed initial admin")?;

    // Build router
    let app = vantage_server::web::build_router(state);

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
