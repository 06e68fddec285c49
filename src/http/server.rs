//! Health endpoint server.
//!
//! # Responsibilities
//! - Serve the latest published report on `GET /health`
//! - Run tag-filtered checks on demand on `GET /health/{tag}`
//! - Map report status to HTTP status

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::health::{HealthCheckService, HealthReport, HealthStatus, LatestReport};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<HealthCheckService>,
    pub latest: LatestReport,
}

/// HTTP server exposing health reports.
pub struct HealthServer {
    router: Router,
}

impl HealthServer {
    pub fn new(service: Arc<HealthCheckService>, latest: LatestReport) -> Self {
        let router = Self::build_router(AppState { service, latest });
        Self { router }
    }

    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(latest_report))
            .route("/health/{tag}", get(tagged_report))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until a shutdown message arrives.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Health endpoint listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Health endpoint shutting down");
            })
            .await
    }
}

/// 200 for Healthy/Degraded, 503 for Unhealthy.
pub fn status_code_for(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn report_response(report: &HealthReport) -> Response {
    (status_code_for(report.status), Json(report)).into_response()
}

async fn latest_report(State(state): State<AppState>) -> Response {
    match state.latest.load() {
        Some(report) => report_response(&report),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": HealthStatus::Unhealthy, "description": "no report yet" })),
        )
            .into_response(),
    }
}

async fn tagged_report(State(state): State<AppState>, Path(tag): Path<String>) -> Response {
    let report = state.service.check_health_tagged(&tag).await;
    report_response(&report)
}
