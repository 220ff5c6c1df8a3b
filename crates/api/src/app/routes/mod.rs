use axum::{Router, routing::get};

pub mod actions;
pub mod alerts;
pub mod dashboard;
pub mod settings;
pub mod system;

/// Router for every dashboard endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .merge(dashboard::router())
        .nest("/actions", actions::router())
        .nest("/alerts", alerts::router())
        .nest("/settings", settings::router())
}

pub fn health_router() -> Router {
    Router::new().route("/health", get(system::health))
}
