use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use carestock_core::DomainError;

use crate::app::services::ServiceError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Poisoned(what) => {
            tracing::error!(state = what, "state lock poisoned");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                format!("{what} state is unavailable"),
            )
        }
        ServiceError::Sink(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "action_log_error", e.to_string())
        }
        ServiceError::Export(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_error", e.to_string())
        }
    }
}

/// Malformed JSON bodies get the same `{error, message}` shape as everything else.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        service_error_to_response(self)
    }
}
