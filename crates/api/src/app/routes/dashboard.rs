//! Read-only views over the derived table.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use carestock_infra::{PRIORITY_EXPORT_FILE_NAME, priority_actions_csv};
use carestock_inventory::{
    ImpactEstimate, StockHealthSummary, at_risk, days_of_cover_grid, life_saving_at_risk,
    location_risk_ranking, status_distribution,
};

use crate::app::dto;
use crate::app::services::{AppServices, ServiceError};

pub fn router() -> Router {
    Router::new()
        .route("/rows", get(list_rows))
        .route("/summary", get(summary))
        .route("/analytics", get(analytics))
        .route("/export/priority.csv", get(export_priority_csv))
}

pub async fn list_rows(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::RowFilterQuery>,
) -> axum::response::Response {
    let rows = match services.derived_rows() {
        Ok(rows) => query.to_filter().apply(&rows),
        Err(e) => return e.into_response(),
    };
    let names = match services.session() {
        Ok(session) => session.location_names().clone(),
        Err(e) => return e.into_response(),
    };

    Json(dto::RowsResponse {
        data: services.origin().clone(),
        rows: dto::row_views(&rows, &names),
    })
    .into_response()
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::RowFilterQuery>,
) -> axum::response::Response {
    let rows = match services.derived_rows() {
        Ok(rows) => query.to_filter().apply(&rows),
        Err(e) => return e.into_response(),
    };
    let names = match services.session() {
        Ok(session) => session.location_names().clone(),
        Err(e) => return e.into_response(),
    };

    Json(dto::SummaryResponse {
        data: services.origin().clone(),
        health: StockHealthSummary::from_rows(&rows),
        at_risk: dto::row_views(at_risk(&rows), &names),
        life_saving_at_risk: dto::row_views(life_saving_at_risk(&rows), &names),
    })
    .into_response()
}

pub async fn analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::RowFilterQuery>,
) -> axum::response::Response {
    let rows = match services.derived_rows() {
        Ok(rows) => query.to_filter().apply(&rows),
        Err(e) => return e.into_response(),
    };
    let assumptions = *services.impact_assumptions();

    Json(dto::AnalyticsResponse {
        status_distribution: status_distribution(&rows),
        location_risk: location_risk_ranking(&rows),
        days_of_cover: days_of_cover_grid(&rows),
        impact: ImpactEstimate::compute(&rows, &assumptions),
        assumptions,
    })
    .into_response()
}

pub async fn export_priority_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::RowFilterQuery>,
) -> axum::response::Response {
    let csv = services.derived_rows().and_then(|rows| {
        priority_actions_csv(&query.to_filter().apply(&rows)).map_err(ServiceError::from)
    });

    match csv {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{PRIORITY_EXPORT_FILE_NAME}\""),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "priority export failed");
            e.into_response()
        }
    }
}
