use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::pricing::{RoomKey, RoomPrice, StayOutcome, StayRange};
use crate::query::{normalize_string, parse_int_list, split_list, QueryError};

/// A hotel room as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 3)]
    pub hotel_id: i32,
    #[schema(example = "Standard")]
    pub category: String,
    #[schema(example = 2)]
    pub number_of_adults: i32,
    #[schema(example = 1)]
    pub number_of_children: i32,
}

impl Room {
    pub fn key(&self) -> RoomKey {
        RoomKey::new(self.id, self.hotel_id)
    }
}

/// Room filters of `GET /api/rooms`
///
/// The guest counts take comma-separated lists, matching any of the values.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RoomFilterQuery {
    /// Only rooms of this hotel
    pub hotel_id: Option<i32>,
    /// Room categories, comma-separated, case-insensitive
    pub category: Option<String>,
    /// Accepted numbers of adults, e.g. `1,2`
    pub number_of_adults: Option<String>,
    /// Accepted numbers of children, e.g. `0,1`
    pub number_of_children: Option<String>,
}

/// Validated room filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomFilters {
    pub hotel_id: Option<i32>,
    pub categories: Vec<String>,
    pub adults: Vec<i32>,
    pub children: Vec<i32>,
}

impl RoomFilterQuery {
    pub fn validate(self) -> Result<RoomFilters, QueryError> {
        Ok(RoomFilters {
            hotel_id: self.hotel_id,
            categories: split_list(normalize_string(self.category).as_deref()),
            adults: parse_int_list("number_of_adults", self.number_of_adults.as_deref())?,
            children: parse_int_list("number_of_children", self.number_of_children.as_deref())?,
        })
    }
}

/// A room, annotated with stay prices when a date range was requested
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomResponse {
    #[serde(flatten)]
    pub room: Room,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "12000.00")]
    pub price_without_discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "6000.00")]
    pub price_with_discount: Option<Decimal>,
    /// Nights of the stay; a listed room covers all of them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
}

impl RoomResponse {
    pub fn plain(room: Room) -> Self {
        Self {
            room,
            price_without_discount: None,
            price_with_discount: None,
            nights: None,
        }
    }

    pub fn priced(room: Room, price: &RoomPrice, range: &StayRange) -> Self {
        Self {
            room,
            price_without_discount: Some(price.prices.plain),
            price_with_discount: Some(price.prices.discounted),
            nights: Some(range.night_count()),
        }
    }
}

/// Result of quoting a single room for a stay
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StayQuoteResponse {
    pub room_id: i32,
    #[schema(value_type = String, example = "2025-09-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, example = "2025-09-04")]
    pub check_out: NaiveDate,
    pub nights_requested: u32,
    pub nights_covered: u32,
    pub fully_covered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "9000.00")]
    pub price_without_discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "9000.00")]
    pub price_with_discount: Option<Decimal>,
}

impl StayQuoteResponse {
    pub fn new(room_id: i32, range: &StayRange, outcome: &StayOutcome) -> Self {
        let quote = outcome.quote();
        Self {
            room_id,
            check_in: range.check_in(),
            check_out: range.check_out(),
            nights_requested: range.night_count(),
            nights_covered: outcome.nights_covered(),
            fully_covered: outcome.is_covered(),
            price_without_discount: quote.map(|q| q.price_plain),
            price_with_discount: quote.map(|q| q.price_discounted),
        }
    }
}
