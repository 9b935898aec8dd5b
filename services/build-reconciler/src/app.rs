use axum::Router;
use http_common::{handlers::HealthState, router::base_routes};
use tower_http::trace::TraceLayer;

/// Probe endpoints only; the controller has no other HTTP surface.
pub fn app(health: HealthState) -> Router {
    Router::new()
        .merge(base_routes(health))
        .layer(TraceLayer::new_for_http())
}
