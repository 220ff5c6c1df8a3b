//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the shared session, engine, alert rules and action sink
//! - `routes/`: HTTP routes + handlers (one file per dashboard area)
//! - `dto.rs`: request/response DTOs and query-string parsing
//! - `errors.rs`: consistent `{error, message}` responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use carestock_infra::RowSource;

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    build_app_with_source(config, None)
}

/// Like [`build_app`], with an already-open row source that takes precedence
/// over the configured data file.
pub fn build_app_with_source(
    config: &AppConfig,
    source: Option<Arc<dyn RowSource>>,
) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config, source)?);
    Ok(router(services))
}

pub fn router(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .merge(routes::health_router())
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
