use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::promocodes::error::PromoError;
use crate::validation::validate_non_negative_amount;

/// A promo code together with the tours and hotels it applies to
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct PromoCode {
    pub id: i32,
    #[schema(example = "SUMMER10")]
    pub code: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-08-31")]
    pub end_date: NaiveDate,
    #[schema(value_type = String, example = "0.10")]
    pub discount_amount: Decimal,
    pub is_active: bool,
    pub tour_ids: Vec<i32>,
    pub hotel_ids: Vec<i32>,
}

impl PromoCode {
    /// Active and `today` within `[start_date, end_date]`
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.is_active && self.start_date <= today && today <= self.end_date
    }

    pub fn applies_to(&self, target: PromoTarget) -> bool {
        match target {
            PromoTarget::Tour(id) => self.tour_ids.contains(&id),
            PromoTarget::Hotel(id) => self.hotel_ids.contains(&id),
        }
    }
}

/// What a promo code is being redeemed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoTarget {
    Tour(i32),
    Hotel(i32),
}

impl std::fmt::Display for PromoTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromoTarget::Tour(_) => write!(f, "tour"),
            PromoTarget::Hotel(_) => write!(f, "hotel"),
        }
    }
}

/// Request body of `POST /api/promocodes/check`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct PromoCodeCheckRequest {
    #[validate(length(min = 1, max = 20, message = "promo_code must be 1-20 characters"))]
    #[schema(example = "SUMMER10")]
    pub promo_code: String,
    #[schema(example = 7)]
    pub tour_id: Option<i32>,
    pub hotel_id: Option<i32>,
    /// Already computed price of the booking, used for hotel targets
    #[validate(custom = "validate_non_negative_amount")]
    #[schema(value_type = Option<String>, example = "100000.00")]
    pub price: Option<Decimal>,
}

impl PromoCodeCheckRequest {
    /// Exactly one of `tour_id` and `hotel_id` must be given
    pub fn target(&self) -> Result<PromoTarget, PromoError> {
        match (self.tour_id, self.hotel_id) {
            (Some(tour_id), None) => Ok(PromoTarget::Tour(tour_id)),
            (None, Some(hotel_id)) => Ok(PromoTarget::Hotel(hotel_id)),
            _ => Err(PromoError::AmbiguousTarget),
        }
    }
}

/// Outcome of a successful promo code check
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PromoCodeCheckResponse {
    #[schema(value_type = String, example = "0.10")]
    pub discount_amount: Decimal,
    /// Price of the tour before the promo code
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "100000.00")]
    pub tour_price: Option<Decimal>,
    /// Price after the promo code, ancillary charges excluded
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "90000.00")]
    pub total_price: Option<Decimal>,
}
