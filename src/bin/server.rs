//! Bookshelf HTTP server.
//!
//! Reads settings from the environment (and `.env` if present), opens the
//! configured store and serves until Ctrl-C.

use bookshelf_api::{app, init_tracing, AppState, Database, MemoryBookStore, Settings, StoreBackend};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_tracing(&settings.logging);
    tracing::info!(environment = ?settings.environment, store = ?settings.store, "starting");

    let (state, database) = match settings.store {
        StoreBackend::Postgres => {
            let db = Database::connect(&settings.database).await?;
            (AppState::new(Arc::new(db.book_store())), Some(db))
        }
        StoreBackend::Memory => (AppState::new(Arc::new(MemoryBookStore::new())), None),
    };

    let router = app(state, settings.server.body_limit);
    let listener = TcpListener::bind(settings.server.addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
