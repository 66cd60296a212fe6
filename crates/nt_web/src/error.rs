use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Failure of one request, rendered as a JSON `{error}` body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    InvalidRequest(String),
    /// A blocked target site. The body keeps the empty search result shape.
    BlockedDomain(String),
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BlockedDomain(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidRequest(msg) | ApiError::BlockedDomain(msg) | ApiError::InternalError(msg) => msg,
        }
    }

    pub fn to_body(&self) -> Value {
        match self {
            ApiError::BlockedDomain(msg) => json!({
                "error": msg,
                "articles": [],
                "count": 0,
            }),
            _ => json!({ "error": self.message() }),
        }
    }

    pub fn missing(param: &str) -> Self {
        ApiError::InvalidRequest(format!("Missing required parameter: {}", param))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<nt_core::Error> for ApiError {
    fn from(err: nt_core::Error) -> Self {
        match err {
            nt_core::Error::BlockedDomain(_) => ApiError::BlockedDomain(err.to_string()),
            e if e.is_client_error() => ApiError::InvalidRequest(e.to_string()),
            e => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
