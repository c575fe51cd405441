//! API error types with IntoResponse
//!
//! Errors become JSON bodies carrying status, error kind, message, timestamp,
//! and the request path. The path is only known to middleware, so
//! [`attach_request_path`] fills it in after the handler returns.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::DbError;
use crate::error::Error;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Unreadable request: bad JSON, bad query string (400)
    BadRequest { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Datastore failure (500, logged)
    Persistence(DbError),
}

/// JSON error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorDetails {
    fn new(status: StatusCode, error: &str, message: String) -> Self {
        Self {
            status: status.as_u16(),
            error: error.to_owned(),
            message,
            timestamp: Utc::now().to_rfc3339(),
            path: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match self {
            Self::Validation(e) => ErrorDetails::new(status, "validation_error", e.to_string()),
            Self::BadRequest { message } => ErrorDetails::new(status, "bad_request", message),
            Self::NotFound { resource, id } => ErrorDetails::new(
                status,
                "not_found",
                format!("{} '{}' not found", resource, id),
            ),
            Self::Persistence(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                ErrorDetails::new(
                    status,
                    "internal_error",
                    "an internal error occurred".to_owned(),
                )
            }
        };

        let mut response = (status, Json(details.clone())).into_response();
        response.extensions_mut().insert(details);
        response
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Error::from(e).into()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound { resource, id } => Self::NotFound {
                resource,
                id: id.to_string(),
            },
            Error::Validation(e) => Self::Validation(e),
            Error::Persistence(e) => Self::Persistence(e),
        }
    }
}

/// Rewrite error bodies to include the path of the request that failed.
pub async fn attach_request_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    match response.extensions().get::<ErrorDetails>().cloned() {
        Some(mut details) => {
            details.path = Some(path);
            let status = response.status();
            (status, Json(details)).into_response()
        }
        None => response,
    }
}
