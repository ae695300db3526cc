use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use onboard_core::gateway::memory::InMemoryGateway;
use onboard_core::gateway::DocumentStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onboard_api::config::{ServerConfig, StoreBackend};
use onboard_api::router::build_app_router;
use onboard_api::sessions::{start_session_sweeper, WizardSessions};
use onboard_api::state::AppState;
use onboard_db::{DbPool, PgDocumentStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "onboard_api=debug,onboard_core=debug,onboard_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = %config.store_backend,
        "Loaded server configuration"
    );

    // --- Document store ---
    let (store, pool) = connect_store(config.store_backend).await;

    // --- App state ---
    let sessions = Arc::new(WizardSessions::new());
    let state = AppState {
        store,
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        sessions: Arc::clone(&sessions),
    };

    let app = build_app_router(state, &config);

    // --- Background tasks ---
    let sweeper_handle = start_session_sweeper(
        Arc::clone(&sessions),
        Duration::from_secs(config.session_idle_timeout_secs),
        Duration::from_secs(config.session_sweep_interval_secs),
    );
    tracing::info!(
        idle_timeout_secs = config.session_idle_timeout_secs,
        "Wizard session sweeper started"
    );

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_handle.abort();
    tracing::info!("Wizard session sweeper stopped");

    let open_sessions = sessions.count().await;
    tracing::info!(open_sessions, "Discarding open wizard sessions");

    if let Some(pool) = pool {
        let timeout = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(timeout, pool.close()).await.is_err() {
            tracing::warn!(?timeout, "Timed out closing database pool");
        } else {
            tracing::info!("Database pool closed");
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Build the configured document store.
///
/// The postgres backend connects, checks and migrates the database before
/// returning; any failure there aborts startup.
async fn connect_store(backend: StoreBackend) -> (Arc<dyn DocumentStore>, Option<DbPool>) {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory document store; data is lost on restart");
            let store: Arc<dyn DocumentStore> = Arc::new(InMemoryGateway::new());
            (store, None)
        }
        StoreBackend::Postgres => {
            let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

            let pool = onboard_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            onboard_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            onboard_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool.clone()));
            (store, Some(pool))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
