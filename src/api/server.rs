use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{get_resource, health},
    state::AppState,
};
use crate::config::Config;
use crate::resource::Resolver;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub fn router(state: AppState) -> Router {
    let max_concurrent = state.config.server.max_concurrent_requests;

    Router::new()
        .route("/resource", get(get_resource))
        .route("/health", get(health))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until Ctrl+C or SIGTERM
///
/// `address` overrides `server.bind_addr`.
pub async fn run(config: Config, address: Option<SocketAddr>) -> Result<(), AnyError> {
    let address = address.unwrap_or(config.server.bind_addr);

    info!(backend = ?config.cache.backend, path = %config.cache.path.display(), "Building resolver");
    let resolver = Resolver::from_config(&config)?;
    let app = router(AppState::new(config, resolver));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "linkcache API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
