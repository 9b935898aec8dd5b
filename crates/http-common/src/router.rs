use axum::{Router, routing::get};

use crate::handlers::{
    HealthState, health_handler, not_found_handler, ready_handler, root_handler,
};

pub fn base_routes<S>(state: HealthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .fallback(not_found_handler)
        .with_state(state)
}
