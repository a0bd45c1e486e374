// Error handling module for the catalog endpoints
// Provides the crate-level error type and its HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::pricing::PricingError;
use crate::query::QueryError;

/// Error type for the room and hotel search endpoints
///
/// Each variant maps to a specific HTTP status code. Module errors with their
/// own response format (calendars, promo codes) do not go through this type.
#[derive(Debug)]
pub enum ApiError {
    /// Body validation errors
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Malformed query string parameter
    /// Maps to HTTP 400 Bad Request
    InvalidQuery(String),

    /// Empty, inverted or half-specified stay range
    /// Maps to HTTP 400 Bad Request
    InvalidRange(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),
}

/// JSON body of every `ApiError` response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub detail: String,

    /// Field-level validation errors, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, detail: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            detail: detail.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert to HTTP status code and response body
    ///
    /// Client errors are logged at debug level, server errors at error level.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        let body = match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                ErrorResponse {
                    details: Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                    ..ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                }
            }
            ApiError::InvalidQuery(message) => {
                debug!("Invalid query parameter: {}", message);
                ErrorResponse::new("INVALID_QUERY", message.clone())
            }
            ApiError::InvalidRange(message) => {
                debug!("Invalid stay range: {}", message);
                ErrorResponse::new("INVALID_RANGE", message.clone())
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id))
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred")
            }
        };
        (status, body)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_)
            | ApiError::InvalidQuery(_)
            | ApiError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

impl From<QueryError> for ApiError {
    fn from(error: QueryError) -> Self {
        ApiError::InvalidQuery(error.to_string())
    }
}

impl From<PricingError> for ApiError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::InvalidRange { .. }
            | PricingError::StayTooLong { .. }
            | PricingError::IncompleteRange => ApiError::InvalidRange(error.to_string()),
            PricingError::RoomNotFound(id) => ApiError::NotFound {
                resource: "Room".to_string(),
                id: id.to_string(),
            },
            PricingError::DatabaseError(e) => ApiError::DatabaseError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidQuery("page".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound {
                resource: "Hotel".into(),
                id: "1".into()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pricing_error_conversion() {
        let range = PricingError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        };
        assert!(matches!(ApiError::from(range), ApiError::InvalidRange(_)));

        let missing = ApiError::from(PricingError::RoomNotFound(4));
        assert!(matches!(missing, ApiError::NotFound { ref id, .. } if id == "4"));
    }

    #[test]
    fn test_database_error_is_not_leaked() {
        let (status, body) =
            ApiError::DatabaseError(sqlx::Error::PoolTimedOut).to_error_response();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_code, "DATABASE_ERROR");
        assert_eq!(body.detail, "A database error occurred");
        assert!(body.details.is_none());
    }
}
