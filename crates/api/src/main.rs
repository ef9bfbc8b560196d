use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sentinel_db::store::{
    MemorySessionStore, MemoryUserDirectory, PgSessionStore, PgUserDirectory, SessionStore,
    UserDirectory,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_api::background::session_sweep;
use sentinel_api::config::{ServerConfig, StorageBackend, StorageConfig};
use sentinel_api::router::build_app_router;
use sentinel_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.storage.backend,
        session_ttl_hours = config.session.ttl.num_hours(),
        "Loaded server configuration"
    );

    // --- Stores ---
    let (users, sessions) = build_stores(&config.storage).await;

    // --- App state ---
    let state = AppState::new(config.clone(), users, Arc::clone(&sessions))
        .expect("Failed to initialise token codec");

    // --- Session sweep ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = config.sweep_interval.map(|period| {
        tokio::spawn(session_sweep::run(
            Arc::clone(&sessions),
            period,
            sweep_cancel.clone(),
        ))
    });

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    if let Some(handle) = sweep_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Session sweep stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sentinel_api=debug,sentinel_db=info,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect the configured backend, applying migrations for Postgres.
async fn build_stores(
    storage: &StorageConfig,
) -> (Arc<dyn UserDirectory>, Arc<dyn SessionStore>) {
    match storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory stores; sessions and users are lost on restart");
            let users: Arc<dyn UserDirectory> = Arc::new(MemoryUserDirectory::new());
            let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
            (users, sessions)
        }
        StorageBackend::Postgres => {
            let database_url = storage
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            let primary = sentinel_db::create_pool(database_url, storage.max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            sentinel_db::health_check(&primary)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            sentinel_db::run_migrations(&primary)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let replica = match storage.replica_url.as_deref() {
                Some(url) => {
                    let pool = sentinel_db::create_pool(url, storage.max_connections)
                        .await
                        .expect("Failed to connect to read replica");
                    tracing::info!("Read replica pool created");
                    Some(pool)
                }
                None => None,
            };

            let pools = sentinel_db::DbPools::new(primary, replica);
            let users: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(pools.clone()));
            let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pools));
            (users, sessions)
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
