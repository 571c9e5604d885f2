//! Error Types for the Stockroom API
//!
//! This module defines error handling for the service layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! Not-found conditions carry the stable machine-readable payload the wire
//! contract promises (`code: 3`, `message: "errors.good.notFound"`); all
//! other failures are returned as opaque errors without store detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use stockroom_core::{CacheError, EventError, RepoError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents a
/// category of error that can occur while serving a goods operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Target good does not exist under the given project
    GoodNotFound,

    /// Referenced parent project does not exist
    ProjectNotFound,

    // ========================================================================
    // Server Errors (500, 503, 504)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Relational, cache, or analytical store is unavailable
    StoreUnavailable,

    /// Orchestration-level deadline exceeded
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::GoodNotFound | ErrorCode::ProjectNotFound => StatusCode::NOT_FOUND,

            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::GoodNotFound => "errors.good.notFound",
            ErrorCode::ProjectNotFound => "errors.project.notFound",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StoreUnavailable => "Store temporarily unavailable",
            ErrorCode::Timeout => "Operation timed out",
        }
    }

    /// Stable numeric code included in the error body.
    ///
    /// `3` is the published not-found code; other categories share `0`
    /// (clients are expected to branch on HTTP status for those).
    pub fn wire_code(&self) -> i32 {
        match self {
            ErrorCode::GoodNotFound | ErrorCode::ProjectNotFound => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// Error code categorizing the error
    #[serde(skip)]
    pub code: ErrorCode,

    /// Stable numeric code for machine consumption
    #[serde(rename = "code")]
    pub wire_code: i32,

    /// Human-readable message or message key
    pub message: String,

    /// Optional additional details
    pub details: serde_json::Value,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            wire_code: code.wire_code(),
            message: message.into(),
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create a GoodNotFound error with the stable wire payload.
    pub fn good_not_found() -> Self {
        Self::from_code(ErrorCode::GoodNotFound)
    }

    /// Create a ProjectNotFound error with the stable wire payload.
    pub fn project_not_found() -> Self {
        Self::from_code(ErrorCode::ProjectNotFound)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a StoreUnavailable error.
    pub fn store_unavailable() -> Self {
        Self::from_code(ErrorCode::StoreUnavailable)
    }

    /// Create a Timeout error.
    pub fn timeout(operation: &str) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Operation '{}' timed out", operation),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN AND STORE ERRORS
// ============================================================================

/// Translate repository errors into wire errors. Not-found kinds keep their
/// stable payload; store failures are logged here and surfaced opaquely.
impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::ProjectNotFound { .. } => ApiError::project_not_found(),
            RepoError::GoodNotFound { .. } => ApiError::good_not_found(),
            RepoError::UpdateFailed { id } => {
                tracing::error!(good_id = id, "update failed after existence check");
                ApiError::internal_error("Update failed")
            }
            RepoError::Store { reason } => {
                tracing::error!(%reason, "repository store error");
                ApiError::store_unavailable()
            }
        }
    }
}

/// A `Miss` reaching this conversion is a bug in the caller: the read path
/// must branch on it before translating errors.
impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Miss => ApiError::internal_error("Unhandled cache miss"),
            CacheError::Backend { reason } => {
                tracing::error!(%reason, "cache backend error");
                ApiError::store_unavailable()
            }
        }
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        tracing::error!(error = %err, "analytical store error");
        ApiError::store_unavailable()
    }
}

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!("database error: {:?}", err);
        ApiError::store_unavailable()
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("connection pool error: {:?}", err);
        ApiError::store_unavailable()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
