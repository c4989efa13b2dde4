#![allow(missing_docs)]
use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod errors;
mod routes;
mod state;

pub mod products;

pub use self::products::Seed;
pub use self::routes::PRODUCTS_PATH;
use self::routes::app_router;
use self::state::AppState;

/// Binds `addr` and serves products until `ctrl-c`.
///
/// # Errors
///
/// Fails if the address cannot be bound or the server stops on an I/O error.
pub async fn run(addr: SocketAddr, seed: Seed) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let local_addr = listener.local_addr().context("reading local address")?;
    info!("Serving products on http://{local_addr}{PRODUCTS_PATH}");

    serve(listener, seed, shutdown_signal()).await
}

/// Serves the seeded catalogue on `listener` until the task is aborted.
///
/// # Errors
///
/// Fails if the server stops on an I/O error.
pub async fn launch(listener: TcpListener) -> anyhow::Result<()> {
    serve(listener, Seed::Catalogue, std::future::pending()).await
}

async fn serve<F>(listener: TcpListener, seed: Seed, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::new(seed).context("creating state")?;
    let app = app_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving products")
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "cannot listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
