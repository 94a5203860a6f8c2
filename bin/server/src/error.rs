//! HTTP error responses.
//!
//! Every error leaving a handler renders as `{"detail": "..."}` with the
//! matching status code. Internal failures keep their detail out of the
//! response body; the full text goes to the log instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Error response for the HTTP API.
#[derive(Debug)]
pub enum ApiError {
    /// The request was understood but rejected.
    BadRequest { detail: String },
    /// Credentials did not match a registered guest.
    Unauthorized { detail: String },
    /// The addressed resource does not exist.
    NotFound { detail: String },
    /// Something failed server-side; detail is logged, not returned.
    Internal { detail: String },
}

impl ApiError {
    /// Internal error wrapping any displayable failure.
    pub fn internal(source: impl fmt::Display) -> Self {
        Self::Internal {
            detail: source.to_string(),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest { detail }
            | Self::Unauthorized { detail }
            | Self::NotFound { detail }
            | Self::Internal { detail } => f.write_str(detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::Internal { detail } => {
                tracing::error!(detail = %detail, "internal server error");
                "Internal server error".to_string()
            }
            Self::BadRequest { detail }
            | Self::Unauthorized { detail }
            | Self::NotFound { detail } => detail,
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        let err = ApiError::NotFound {
            detail: "Conversation not found".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::Unauthorized {
            detail: "Invalid credentials".to_string(),
        };
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_detail_stays_out_of_the_body() {
        let response = ApiError::internal("connection refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
