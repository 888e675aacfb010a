// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`ConciergeError`] to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use concierge_core::ConciergeError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error. Wraps [`ConciergeError`] so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(pub ConciergeError);

impl From<ConciergeError> for ApiError {
    fn from(e: ConciergeError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ConciergeError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ConciergeError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ConciergeError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = ApiError::from(ConciergeError::empty_query());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.0.to_string(), "Query cannot be empty.");

        let err = ApiError::from(ConciergeError::Unauthorized("Unauthorized".into()));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let err = ApiError::from(ConciergeError::Storage {
            source: "locked".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
