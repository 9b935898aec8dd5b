use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::{debug, instrument};

/// Shared by the probe handlers; `ready` flips once the service finished starting.
#[derive(Clone, Debug)]
pub struct HealthState {
    pub service: &'static str,
    pub version: &'static str,
    pub ready: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new(service: &'static str, version: &'static str) -> Self {
        Self {
            service,
            version,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[instrument(name = "root_handler", skip_all)]
pub async fn root_handler(State(state): State<HealthState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service,
        "version": state.version,
        "status": "ok"
    }))
}

#[instrument(name = "health_handler", skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

#[instrument(name = "ready_handler", skip_all)]
pub async fn ready_handler(State(state): State<HealthState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        debug!("readiness probe before startup completed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

#[instrument(name = "not_found_handler", skip_all)]
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
