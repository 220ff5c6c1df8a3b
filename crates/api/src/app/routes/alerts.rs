use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;

use carestock_inventory::{AlertRuleSet, AlertSummary, evaluate_alerts};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/rules", put(update_rules).get(get_rules))
}

/// A fresh evaluation on every call; alerts are not stored.
pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AlertsQuery>,
) -> axum::response::Response {
    let filter = match query.to_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    let now = Utc::now();
    let today = now.date_naive();
    let (subjects, rules) = match (services.alert_subjects(today), services.alert_rules()) {
        (Ok(subjects), Ok(rules)) => (subjects, rules),
        (Err(e), _) | (_, Err(e)) => return e.into_response(),
    };

    let alerts = filter.apply(&evaluate_alerts(&subjects, &rules, today, now));

    Json(dto::AlertsResponse {
        summary: AlertSummary::from_alerts(&alerts),
        alerts,
    })
    .into_response()
}

pub async fn get_rules(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.alert_rules() {
        Ok(rules) => Json(rules_response(&rules)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_rules(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::UpdateAlertRulesRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let updated = services.update_alert_rules(|rules| {
        if let Some(default_rule) = request.default_rule {
            rules.set_default(default_rule)?;
        }
        if let Some(overrides) = request.overrides {
            rules.replace_overrides(overrides)?;
        }
        Ok(())
    });

    match updated {
        Ok(rules) => Json(rules_response(&rules)).into_response(),
        Err(e) => e.into_response(),
    }
}

fn rules_response(rules: &AlertRuleSet) -> dto::AlertRulesResponse {
    dto::AlertRulesResponse {
        default_rule: *rules.default_rule(),
        overrides: rules.overrides(),
    }
}
