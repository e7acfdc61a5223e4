// src/api.rs
//! Small status listener: health, Prometheus metrics, per-feed baseline state.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::service::{FeedService, FeedStatus};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FeedService>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/metrics", get(metrics))
        .route("/feeds", get(feeds))
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(h) => (StatusCode::OK, h.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

async fn feeds(State(state): State<AppState>) -> Json<Vec<FeedStatus>> {
    Json(state.service.status())
}

/// Bind and serve until the task is aborted.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "status listener up");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
