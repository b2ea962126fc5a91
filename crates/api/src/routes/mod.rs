//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod reports;

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::envelope::Envelope;

/// Fallback for unmatched URLs.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::error_message("URL Not Found.")),
    )
}
