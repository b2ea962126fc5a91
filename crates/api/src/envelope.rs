//! Response envelope shared by every endpoint.
//!
//! Success responses carry `data` with a null `message`; validation errors
//! carry field-tagged `data`; framework-level errors (auth, permission,
//! not-found, internal) carry a human-readable `message` with null `data`.
//! Shaping happens only at this boundary, never inside the domain layer.

use serde::Serialize;

/// The `{status, data, message}` wrapper on every response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Wraps a successful payload.
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<serde_json::Value> {
    /// An error envelope with field-tagged detail data.
    pub fn error_data(data: serde_json::Value) -> Self {
        Self {
            status: "error",
            data: Some(data),
            message: None,
        }
    }

    /// An error envelope with a human-readable message.
    pub fn error_message(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            data: None,
            message: Some(message.into()),
        }
    }
}
