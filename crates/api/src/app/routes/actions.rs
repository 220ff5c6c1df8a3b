use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use carestock_inventory::RecordActionRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_actions).post(record_action))
}

/// Most recent actions first.
pub async fn list_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ActionsQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(dto::DEFAULT_ACTIONS_LIMIT);

    let entries = match services.sink().recent(limit) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "action sink unreadable; serving session log");
            match services.session() {
                Ok(session) => session.action_log().recent(limit),
                Err(e) => return e.into_response(),
            }
        }
    };

    Json(serde_json::json!({ "actions": entries })).into_response()
}

pub async fn record_action(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RecordActionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let receipt = match services.record_action(request) {
        Ok(receipt) => receipt,
        Err(e) => return e.into_response(),
    };

    let names = match services.session() {
        Ok(session) => session.location_names().clone(),
        Err(e) => return e.into_response(),
    };
    let row = dto::RowView::new(services.derive(&receipt.row), &names);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "entry": receipt.entry,
            "row": row,
        })),
    )
        .into_response()
}
