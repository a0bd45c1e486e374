use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::promocodes::models::PromoTarget;

/// Reasons a promo code cannot be redeemed
#[derive(Debug, thiserror::Error)]
pub enum PromoError {
    #[error("Provide exactly one of tour_id or hotel_id.")]
    AmbiguousTarget,

    #[error("Promo code not found.")]
    NotFound,

    #[error("Promo code is expired or inactive.")]
    Expired,

    #[error("Promo code does not apply to this {0}.")]
    NotEligible(PromoTarget),

    #[error("Tour with id {0} not found")]
    TourNotFound(i32),

    #[error("Request validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl PromoError {
    fn error_code(&self) -> &'static str {
        match self {
            PromoError::AmbiguousTarget => "AMBIGUOUS_TARGET",
            PromoError::NotFound => "PROMO_NOT_FOUND",
            PromoError::Expired => "PROMO_EXPIRED",
            PromoError::NotEligible(_) => "PROMO_NOT_ELIGIBLE",
            PromoError::TourNotFound(_) => "NOT_FOUND",
            PromoError::ValidationError(_) => "VALIDATION_ERROR",
            PromoError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PromoError::TourNotFound(_) => StatusCode::NOT_FOUND,
            PromoError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PromoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (detail, details) = match &self {
            PromoError::ValidationError(errors) => {
                (self.to_string(), serde_json::to_value(errors).ok())
            }
            PromoError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                ("A database error occurred".to_string(), None)
            }
            other => {
                tracing::debug!("Promo code rejected: {}", other);
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
