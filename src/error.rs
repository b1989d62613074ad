//! API error taxonomy shared by the HTTP wrapper and every view model.
//!
//! DESIGN
//! ======
//! The wrapper classifies each failed response exactly once. Only the
//! `Unauthorized` class has a global side effect (forced logout, handled in
//! `net::client`); every other class is returned to the caller, which turns
//! it into an inline, form-scoped message.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

use crate::net::normalize::error_message;

/// Substring the backend puts in `detail` when a bearer token is rejected.
pub const TOKEN_INVALID_MARKER: &str = "Given token not valid for any token type";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", .detail.as_deref().unwrap_or("Authentication required."))]
    Unauthorized { detail: Option<String> },
    #[error("{message}")]
    Validation { message: String, body: Value },
    #[error("{message}")]
    NotFound { message: String },
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: u16, body: &Value) -> Self {
        if is_auth_failure(status, body) {
            return Self::Unauthorized { detail: detail(body) };
        }
        match status {
            400 => Self::Validation { message: error_message(body, "Invalid request."), body: body.clone() },
            404 => Self::NotFound { message: error_message(body, "Not found.") },
            _ => Self::Server { status, message: error_message(body, "Unexpected server error.") },
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Backend-provided text when the error carries one the user should see.
    ///
    /// Validation and auth messages come from the backend; transport and
    /// server failures fall back to the caller's generic wording.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthorized { detail: Some(message) } | Self::Validation { message, .. } => message.clone(),
            _ => fallback.to_owned(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// True when a response must trigger the global logout-and-redirect.
#[must_use]
pub fn is_auth_failure(status: u16, body: &Value) -> bool {
    status == 401 || detail(body).is_some_and(|d| d.contains(TOKEN_INVALID_MARKER))
}

fn detail(body: &Value) -> Option<String> {
    body.get("detail").and_then(Value::as_str).map(str::to_owned)
}
