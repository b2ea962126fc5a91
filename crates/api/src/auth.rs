//! Bearer identity extraction.
//!
//! Authentication itself is the identity collaborator's concern; this
//! extractor consumes its output, a bearer credential resolving to the
//! authenticated customer id, and rejects requests that carry none.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use common::CustomerId;
use uuid::Uuid;

use crate::error::ApiError;

/// The authenticated customer extracted from `Authorization: Bearer <id>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthCustomer(pub CustomerId);

impl<S> FromRequestParts<S> for AuthCustomer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
        let uuid = Uuid::parse_str(token.trim()).map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthCustomer(CustomerId::from_uuid(uuid)))
    }
}
