//! Health and readiness HTTP endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use role_directory::RoleStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Upper bound for the directory probe behind each endpoint.
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn router(store: Arc<dyn RoleStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(store)
}

async fn health(State(store): State<Arc<dyn RoleStore>>) -> (StatusCode, String) {
    match store.ping(PROBE_TIMEOUT).await {
        Ok(()) => (StatusCode::OK, "HEALTHY".to_string()),
        Err(e) => {
            error!(error = ?e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, format!("UNHEALTHY: {e}"))
        }
    }
}

async fn ready(State(store): State<Arc<dyn RoleStore>>) -> (StatusCode, String) {
    match store.ping(PROBE_TIMEOUT).await {
        Ok(()) => (StatusCode::OK, "READY".to_string()),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("NOT READY: {e}")),
    }
}

/// Serve the health endpoints on `0.0.0.0:port` until `shutdown` flips to true.
pub(crate) async fn serve(
    port: u16,
    store: Arc<dyn RoleStore>,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Health server listening");

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    info!("Health server stopped");
    Ok(())
}
