mod api;
mod config;
mod error;
mod metrics;
mod routeros;
mod snapshot;

use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use api::rest::{create_api_router, create_healthcheck_router, create_metrics_router, AppState};
use config::Config;
use metrics::Metrics;
use routeros::client::TcpRouterClient;
use snapshot::builder::SnapshotBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize logging; RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        "RouterOS BGP View {} starting",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "Router {} ({:?} commands, peer filter {:?})",
        config.router.address,
        config.command_set,
        config.peer_filter
    );

    let namespace = config.command_set.namespace(config.address_list.clone());
    let builder = SnapshotBuilder::new(namespace, config.peer_filter);
    let metrics = Metrics::new()?;
    let state = Arc::new(AppState::new(
        Arc::new(TcpRouterClient::new()),
        builder,
        config.router.clone(),
        config.asn,
        metrics.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(&config.healthcheck_address).await?;
    tracing::info!("Healthcheck listening on http://{}/healthcheck", config.healthcheck_address);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, create_healthcheck_router()).await {
            tracing::error!("Healthcheck server failed: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.metrics_address).await?;
    tracing::info!("Metrics listening on http://{}/metrics", config.metrics_address);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, create_metrics_router(metrics)).await {
            tracing::error!("Metrics server failed: {}", e);
        }
    });

    // Build application router
    let app = create_api_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_address).await?;
    tracing::info!("Server listening on http://{}", config.listen_address);
    tracing::info!("  GET  http://{}/", config.listen_address);
    tracing::info!("  GET  http://{}/api/router", config.listen_address);
    tracing::info!("  GET  http://{}/healthcheck", config.listen_address);
    tracing::info!("  GET  http://{}/metrics", config.listen_address);

    axum::serve(listener, app).await?;
    Ok(())
}
