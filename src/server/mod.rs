//! HTTP Server Module
//!
//! The serving side of a worker process: a listener bound on the shared port,
//! the axum router, and the per-process `UserStore` injected into it.
//!
//! ## Submodules
//! - **`listener`**: Port-sharing TCP listener setup.
//! - **`router`**: Route table and request-level middleware (tracing, panic capture).

pub mod listener;
pub mod router;

pub use listener::bind_listener;
pub use router::router;

use crate::config::ServerConfig;
use crate::users::store::UserStore;

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves the router over `listener` until the process goes away.
pub async fn serve(listener: TcpListener, store: Arc<UserStore>) -> Result<()> {
    axum::serve(listener, router(store)).await?;

    Ok(())
}

/// Entry point of the worker role: seed a private store, bind, serve.
pub async fn run_worker(config: &ServerConfig, worker_id: usize) -> Result<()> {
    let store = UserStore::with_bootstrap_data();
    let listener = bind_listener(config.bind_addr())?;
    let port = listener.local_addr()?.port();

    tracing::info!(
        "Worker {} started. Listening on port {} (worker #{}, {} seeded users)",
        std::process::id(),
        port,
        worker_id,
        store.len()
    );

    serve(listener, store).await
}
