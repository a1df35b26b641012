// REST API endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use super::{view, ErrorResponse, RouterView};
use crate::error::CollectError;
use crate::metrics::Metrics;
use crate::routeros::{RouterClient, RouterTarget};
use crate::snapshot::builder::SnapshotBuilder;

pub struct AppState {
    pub client: Arc<dyn RouterClient>,
    pub builder: SnapshotBuilder,
    pub target: RouterTarget,
    /// Configured local AS; `None` trusts the router's own AS
    pub asn: Option<u32>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        client: Arc<dyn RouterClient>,
        builder: SnapshotBuilder,
        target: RouterTarget,
        asn: Option<u32>,
        metrics: Metrics,
    ) -> Self {
        AppState {
            client,
            builder,
            target,
            asn,
            metrics,
        }
    }

    /// Collect a fresh snapshot; every call opens its own session
    async fn collect(&self) -> Result<RouterView, CollectError> {
        self.metrics.snapshots_total.inc();
        let timer = self.metrics.snapshot_duration_seconds.start_timer();

        let snapshot = self
            .builder
            .fetch(self.client.as_ref(), &self.target, self.asn)
            .await
            .inspect_err(|e| {
                self.metrics.record_failure(e);
                tracing::error!(
                    "Failed to collect router information from {}: {}",
                    self.target.address,
                    e
                )
            });
        timer.observe_duration();
        let snapshot = snapshot?;

        Ok(RouterView {
            snapshot,
            collected_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

const STYLE_CSS: &str = include_str!("../../static/style.css");

pub fn create_api_router(state: Arc<AppState>) -> Router {
    let metrics = create_metrics_router(state.metrics.clone());

    Router::new()
        .route("/", get(index))
        .route("/api/router", get(get_router))
        .route("/healthcheck", get(healthcheck))
        .route("/static/style.css", get(stylesheet))
        .with_state(state)
        .merge(metrics)
}

/// Router serving only the health check, for a separate listener
pub fn create_healthcheck_router() -> Router {
    Router::new().route("/healthcheck", get(healthcheck))
}

/// Router serving only Prometheus metrics, for a separate listener
pub fn create_metrics_router(metrics: Metrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

async fn healthcheck() -> &'static str {
    "ok"
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn metrics_handler(State(metrics): State<Metrics>) -> Response {
    match metrics.encode() {
        Ok((content_type, buffer)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], buffer).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, (StatusCode, &'static str)> {
    match state.collect().await {
        Ok(router) => Ok(Html(view::render_index(&router))),
        Err(_) => Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")),
    }
}

async fn get_router(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RouterView>, (StatusCode, Json<ErrorResponse>)> {
    match state.collect().await {
        Ok(router) => Ok(Json(router)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.code().to_string(),
                message: e.user_message(),
            }),
        )),
    }
}
