//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use reports::ReportError;
use serde_json::json;

use crate::envelope::Envelope;

/// API-level error type that maps to enveloped HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Order workflow error.
    Order(OrderError),
    /// Report query error.
    Report(ReportError),
    /// Missing or malformed credentials.
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data, message) = match self {
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Report(err) => report_error_to_response(err),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                None,
                Some("Authentication credentials were not provided.".to_string()),
            ),
        };

        let body = Envelope {
            status: "error",
            data,
            message,
        };
        (status, Json(body)).into_response()
    }
}

fn order_error_to_response(
    err: OrderError,
) -> (StatusCode, Option<serde_json::Value>, Option<String>) {
    if let Some(tag) = err.field_tag() {
        return (
            StatusCode::BAD_REQUEST,
            Some(json!({ tag: err.to_string() })),
            None,
        );
    }

    match err {
        OrderError::Forbidden => (
            StatusCode::FORBIDDEN,
            None,
            Some("You do not have permission to perform this action.".to_string()),
        ),
        OrderError::OrderNotFound { .. }
        | OrderError::CustomerNotFound { .. }
        | OrderError::RestaurantNotFound { .. } => (
            StatusCode::NOT_FOUND,
            None,
            Some("Not found.".to_string()),
        ),
        OrderError::Store(err) => {
            tracing::error!(error = %err, retryable = err.is_retryable(), "storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                Some("Internal Server Error".to_string()),
            )
        }
        // Field-tagged validation errors returned above.
        other => (
            StatusCode::BAD_REQUEST,
            Some(json!({ "detail": other.to_string() })),
            None,
        ),
    }
}

fn report_error_to_response(
    err: ReportError,
) -> (StatusCode, Option<serde_json::Value>, Option<String>) {
    if let Some(tag) = err.field_tag() {
        return (
            StatusCode::BAD_REQUEST,
            Some(json!({ tag: err.to_string() })),
            None,
        );
    }

    match err {
        ReportError::Store(err) => {
            tracing::error!(error = %err, "storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                Some("Internal Server Error".to_string()),
            )
        }
        other => (
            StatusCode::BAD_REQUEST,
            Some(json!({ "detail": other.to_string() })),
            None,
        ),
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}
