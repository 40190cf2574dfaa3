mod app;
mod auth;
mod config;
mod db_migrations;
mod db_rows;
mod db_sqlx;
mod policy;
mod routes;
mod services;
mod state;

extern crate self as sqlx;
pub use crate::db_sqlx::{
    Error, FromRow, PgPool, PgRow, Postgres, QueryBuilder, Row, postgres, query, query_as,
    query_scalar,
};

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(value) => value,
        Err(_) => {
            tracing::error!("DATABASE_URL is required to run clanhall-server");
            return;
        }
    };
    let db_max_connections = config::db_max_connections();
    tracing::info!(db_max_connections, "Connecting to PostgreSQL...");
    let db = match PgPoolOptions::new()
        .max_connections(db_max_connections)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to PostgreSQL");
            return;
        }
    };
    if let Err(e) = db_migrations::run(&db).await {
        tracing::error!(error = %e, "failed to run migrations");
        return;
    }
    tracing::info!("Database connected and migrations applied");

    if config::admin_token().is_none() {
        tracing::warn!("ADMIN_TOKEN is not set; admin refresh capability is disabled");
    }
    if let Err(e) = config::sheet_csv_url() {
        tracing::warn!("Roster sync is not configured: {e}");
    }

    let state = AppState::new(Some(db));

    if let Some(pool) = state.db.as_ref() {
        match sqlx::query_scalar::<_, Option<chrono::DateTime<chrono::Utc>>>(
            "SELECT MAX(updated_at) FROM clan_members",
        )
        .fetch_one(pool)
        .await
        {
            Ok(Some(at)) => {
                let mut last = state.last_sync_at.write().await;
                *last = Some(at);
                tracing::info!("Initialized refresh cooldown from last roster write at {at}");
            }
            Ok(None) => {
                tracing::info!("No roster rows yet; refresh cooldown starts clear");
            }
            Err(e) => {
                tracing::warn!("Failed to read last roster write time: {e}");
            }
        }
    }

    // Spawn background services
    tokio::spawn(services::sheet_sync::run(state.clone()));
    tokio::spawn(services::player_cache_evictor::run(state.clone()));

    let app = app::build_app(state);

    let addr = format!("0.0.0.0:{}", config::SERVER_PORT);
    tracing::info!("Clan Hall server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
