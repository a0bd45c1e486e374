use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;

/// Error types for stay pricing and catalog rollups
///
/// Rooms that are not fully covered for a stay are filtered out by callers;
/// that outcome is never an error.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid date range: check-out {end} must be after check-in {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Stay of {nights} nights exceeds the maximum of {max} nights")]
    StayTooLong { nights: i64, max: i64 },

    #[error("Incomplete date range: both date_range_after and date_range_before are required")]
    IncompleteRange,

    #[error("Room not found: {0}")]
    RoomNotFound(i32),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl PricingError {
    fn error_code(&self) -> &'static str {
        match self {
            PricingError::InvalidRange { .. }
            | PricingError::StayTooLong { .. }
            | PricingError::IncompleteRange => "INVALID_RANGE",
            PricingError::RoomNotFound(_) => "NOT_FOUND",
            PricingError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PricingError::InvalidRange { .. }
            | PricingError::StayTooLong { .. }
            | PricingError::IncompleteRange => StatusCode::BAD_REQUEST,
            PricingError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            PricingError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            PricingError::DatabaseError(e) => {
                tracing::error!("Database error while pricing: {:?}", e);
                "A database error occurred".to_string()
            }
            other => {
                tracing::debug!("Pricing request rejected: {}", other);
                other.to_string()
            }
        };

        let body = Json(json!({
            "error_code": self.error_code(),
            "detail": detail,
        }));

        (status, body).into_response()
    }
}
