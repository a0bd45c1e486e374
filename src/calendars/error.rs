use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::query::QueryError;

/// Error types for pricing calendar management
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Hotel with id {0} not found")]
    HotelNotFound(i32),

    #[error("Pricing period with id {period_id} not found for hotel {hotel_id}")]
    PeriodNotFound { hotel_id: i32, period_id: i32 },

    #[error("Request validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    #[error("Room {0} appears more than once in calendar_prices")]
    DuplicateRoom(i32),

    #[error("Room {room_id} does not belong to hotel {hotel_id}")]
    RoomNotInHotel { room_id: i32, hotel_id: i32 },

    #[error("Could not update pricing")]
    UpdateFailed(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl CalendarError {
    fn error_code(&self) -> &'static str {
        match self {
            CalendarError::HotelNotFound(_) | CalendarError::PeriodNotFound { .. } => "NOT_FOUND",
            CalendarError::ValidationError(_)
            | CalendarError::DuplicateRoom(_)
            | CalendarError::RoomNotInHotel { .. } => "VALIDATION_ERROR",
            CalendarError::InvalidQuery(_) => "INVALID_QUERY",
            CalendarError::UpdateFailed(_) => "UPDATE_FAILED",
            CalendarError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CalendarError::HotelNotFound(_) | CalendarError::PeriodNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            CalendarError::ValidationError(_)
            | CalendarError::InvalidQuery(_)
            | CalendarError::DuplicateRoom(_)
            | CalendarError::RoomNotInHotel { .. } => StatusCode::BAD_REQUEST,
            CalendarError::UpdateFailed(_) | CalendarError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CalendarError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (detail, details) = match &self {
            CalendarError::ValidationError(errors) => {
                tracing::debug!("Calendar validation error: {:?}", errors);
                (self.to_string(), serde_json::to_value(errors).ok())
            }
            CalendarError::UpdateFailed(e) => {
                tracing::error!("Nightly price replacement rolled back: {:?}", e);
                (self.to_string(), None)
            }
            CalendarError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                ("A database error occurred".to_string(), None)
            }
            other => {
                tracing::debug!("Calendar request rejected: {}", other);
                (other.to_string(), None)
            }
        };

        let mut body = json!({
            "error_code": self.error_code(),
            "detail": detail,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}
