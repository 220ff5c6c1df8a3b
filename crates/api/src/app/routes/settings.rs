use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, put},
};

use carestock_inventory::NotificationSettings;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/notifications", get(get_notifications).put(update_notifications))
        .route("/locations", get(list_locations))
        .route("/locations/:code", put(rename_location))
}

pub async fn get_notifications(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.session() {
        Ok(session) => Json(session.notifications().clone()).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_notifications(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NotificationSettings>, JsonRejection>,
) -> axum::response::Response {
    let Json(settings) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let mut session = match services.session() {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = session.update_notifications(settings) {
        tracing::warn!(error = %e, "rejected notification settings; keeping previous");
        return errors::domain_error_to_response(e);
    }
    Json(session.notifications().clone()).into_response()
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.session() {
        Ok(session) => Json(session.location_names().clone()).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn rename_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
    body: Result<Json<dto::RenameLocationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let mut session = match services.session() {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = session.rename_location(&code, &request.display_name) {
        return errors::domain_error_to_response(e);
    }

    Json(serde_json::json!({
        "code": code,
        "display_name": session.location_names().display_name(&code),
    }))
    .into_response()
}
