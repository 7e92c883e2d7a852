//! # Todo API Server
//!
//! HTTP JSON API for signup, login and creating to-do items.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) DATABASE_URL=postgresql://localhost/todo \
//!     cargo run -p todo-api
//! ```

use std::sync::Arc;
use todo_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StoreBackend},
};
use todo_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::postgres::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Todo API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let bind_address = config.bind_address();

    let (state, pool) = match config.store.backend {
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;

            let pool = create_pool(DatabaseConfig {
                url,
                max_connections: config.store.max_connections,
                ..Default::default()
            })
            .await?;
            run_migrations(&pool).await?;

            let store = Arc::new(PgStore::new(pool.clone()));
            (AppState::new(store.clone(), store, config)?, Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (AppState::in_memory(config)?, None)
        }
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "todo_api=debug,todo_shared=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
