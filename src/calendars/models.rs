use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use std::collections::HashSet;

use crate::calendars::error::CalendarError;
use crate::validation::{validate_nightly_price, validate_non_negative_amount, validate_period};

/// A date span during which a hotel's rooms have fixed nightly prices
///
/// `start_date` and `end_date` are both inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PricingPeriod {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 3)]
    pub hotel_id: i32,
    #[schema(value_type = String, example = "2025-09-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-09-05")]
    pub end_date: NaiveDate,
    pub available_for_booking: bool,
    pub discount: bool,
    #[schema(value_type = Option<String>, example = "0.17")]
    pub discount_amount: Option<Decimal>,
}

/// Price of one night in a room during a pricing period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NightlyPrice {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = 1)]
    pub period_id: i32,
    #[schema(example = 7)]
    pub room_id: i32,
    #[schema(value_type = String, example = "3000.00")]
    pub price: Decimal,
}

/// One room's nightly price joined with the period it belongs to
///
/// This is the unit the pricing engine works on. A hotel calendar is loaded
/// as a flat list of entries in a single statement.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CalendarEntry {
    pub period_id: i32,
    pub hotel_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub available_for_booking: bool,
    pub discount: bool,
    pub discount_amount: Option<Decimal>,
    pub room_id: i32,
    pub price: Decimal,
}

impl CalendarEntry {
    /// Join periods with their prices, dropping prices of unknown periods
    pub fn join(periods: &[PricingPeriod], prices: &[NightlyPrice]) -> Vec<CalendarEntry> {
        prices
            .iter()
            .filter_map(|price| {
                periods
                    .iter()
                    .find(|period| period.id == price.period_id)
                    .map(|period| CalendarEntry {
                        period_id: period.id,
                        hotel_id: period.hotel_id,
                        start_date: period.start_date,
                        end_date: period.end_date,
                        available_for_booking: period.available_for_booking,
                        discount: period.discount,
                        discount_amount: period.discount_amount,
                        room_id: price.room_id,
                        price: price.price,
                    })
            })
            .collect()
    }

    /// Whether the night starting on `night` falls inside the period
    pub fn contains(&self, night: NaiveDate) -> bool {
        self.start_date <= night && night <= self.end_date
    }

    /// Discount that applies to this entry's nights, if any
    ///
    /// A period flagged as discounted without an amount is treated as
    /// undiscounted.
    pub fn effective_discount(&self) -> Option<Decimal> {
        if self.discount {
            self.discount_amount
        } else {
            None
        }
    }
}

/// Nested `{room, price}` pair of a period payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NightlyPriceInput {
    #[schema(example = 7)]
    pub room: i32,
    #[validate(custom = "validate_nightly_price")]
    #[schema(value_type = String, example = "5000.00")]
    pub price: Decimal,
}

fn default_available_for_booking() -> bool {
    true
}

/// Request DTO for creating or fully replacing a pricing period
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_period"))]
pub struct PricingPeriodRequest {
    #[schema(value_type = String, example = "2025-09-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-09-10")]
    pub end_date: NaiveDate,
    #[serde(default = "default_available_for_booking")]
    pub available_for_booking: bool,
    #[serde(default)]
    pub discount: bool,
    #[validate(custom = "validate_non_negative_amount")]
    #[schema(value_type = Option<String>, example = "0.17")]
    pub discount_amount: Option<Decimal>,
    #[validate]
    #[serde(default)]
    pub calendar_prices: Vec<NightlyPriceInput>,
}

impl PricingPeriodRequest {
    /// Check that every room appears once and belongs to the hotel
    pub fn check_rooms(&self, hotel_id: i32, hotel_rooms: &HashSet<i32>) -> Result<(), CalendarError> {
        let mut seen = HashSet::with_capacity(self.calendar_prices.len());
        for entry in &self.calendar_prices {
            if !seen.insert(entry.room) {
                return Err(CalendarError::DuplicateRoom(entry.room));
            }
            if !hotel_rooms.contains(&entry.room) {
                return Err(CalendarError::RoomNotInHotel {
                    room_id: entry.room,
                    hotel_id,
                });
            }
        }
        Ok(())
    }

    /// Room ids of the payload, in payload order
    pub fn room_ids(&self) -> Vec<i32> {
        self.calendar_prices.iter().map(|entry| entry.room).collect()
    }
}

/// Response DTO for a pricing period with its nightly prices
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricingPeriodResponse {
    pub id: i32,
    pub hotel_id: i32,
    #[schema(value_type = String)]
    pub start_date: NaiveDate,
    #[schema(value_type = String)]
    pub end_date: NaiveDate,
    pub available_for_booking: bool,
    pub discount: bool,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    pub calendar_prices: Vec<NightlyPriceResponse>,
}

/// Response DTO for a nightly price
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NightlyPriceResponse {
    pub room: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
}

impl From<NightlyPrice> for NightlyPriceResponse {
    fn from(price: NightlyPrice) -> Self {
        Self {
            room: price.room_id,
            price: price.price,
        }
    }
}

impl PricingPeriodResponse {
    /// Combine a period with the prices attached to it
    pub fn new(period: PricingPeriod, prices: Vec<NightlyPrice>) -> Self {
        Self {
            id: period.id,
            hotel_id: period.hotel_id,
            start_date: period.start_date,
            end_date: period.end_date,
            available_for_booking: period.available_for_booking,
            discount: period.discount,
            discount_amount: period.discount_amount,
            calendar_prices: prices.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(discount: bool, discount_amount: Option<Decimal>) -> PricingPeriod {
        PricingPeriod {
            id: 1,
            hotel_id: 1,
            start_date: date(2025, 9, 1),
            end_date: date(2025, 9, 5),
            available_for_booking: true,
            discount,
            discount_amount,
        }
    }

    fn entry(discount: bool, discount_amount: Option<Decimal>) -> CalendarEntry {
        let price = NightlyPrice {
            id: 1,
            period_id: 1,
            room_id: 7,
            price: dec!(3000),
        };
        CalendarEntry::join(&[period(discount, discount_amount)], &[price]).remove(0)
    }

    #[test]
    fn test_entry_contains_is_inclusive() {
        let e = entry(false, None);
        assert!(e.contains(date(2025, 9, 1)));
        assert!(e.contains(date(2025, 9, 5)));
        assert!(!e.contains(date(2025, 8, 31)));
        assert!(!e.contains(date(2025, 9, 6)));
    }

    #[test]
    fn test_effective_discount() {
        assert_eq!(entry(false, Some(dec!(0.2))).effective_discount(), None);
        assert_eq!(entry(true, Some(dec!(0.2))).effective_discount(), Some(dec!(0.2)));
        assert_eq!(entry(true, None).effective_discount(), None);
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{
            "start_date": "2025-09-01",
            "end_date": "2025-09-05",
            "calendar_prices": [{"room": 7, "price": "3000.00"}]
        }"#;

        let request: PricingPeriodRequest =
            serde_json::from_str(json).expect("Failed to deserialize PricingPeriodRequest");

        assert!(request.available_for_booking);
        assert!(!request.discount);
        assert_eq!(request.discount_amount, None);
        assert_eq!(request.calendar_prices.len(), 1);
        assert_eq!(request.calendar_prices[0].price, dec!(3000));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_inverted_dates() {
        let json = r#"{
            "start_date": "2025-09-05",
            "end_date": "2025-09-01",
            "calendar_prices": []
        }"#;
        let request: PricingPeriodRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_requires_amount_for_discount() {
        let json = r#"{
            "start_date": "2025-09-01",
            "end_date": "2025-09-05",
            "discount": true,
            "calendar_prices": []
        }"#;
        let request: PricingPeriodRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_rejects_negative_price() {
        let json = r#"{
            "start_date": "2025-09-01",
            "end_date": "2025-09-05",
            "calendar_prices": [{"room": 7, "price": "-1.00"}]
        }"#;
        let request: PricingPeriodRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_check_rooms() {
        let json = r#"{
            "start_date": "2025-09-01",
            "end_date": "2025-09-05",
            "calendar_prices": [{"room": 7, "price": "3000"}, {"room": 8, "price": "3500"}]
        }"#;
        let request: PricingPeriodRequest = serde_json::from_str(json).unwrap();

        let rooms: HashSet<i32> = [7, 8].into_iter().collect();
        assert!(request.check_rooms(1, &rooms).is_ok());
        assert_eq!(request.room_ids(), vec![7, 8]);

        let only_seven: HashSet<i32> = [7].into_iter().collect();
        assert!(matches!(
            request.check_rooms(1, &only_seven),
            Err(CalendarError::RoomNotInHotel { room_id: 8, hotel_id: 1 })
        ));
    }

    #[test]
    fn test_check_rooms_rejects_duplicates() {
        let json = r#"{
            "start_date": "2025-09-01",
            "end_date": "2025-09-05",
            "calendar_prices": [{"room": 7, "price": "3000"}, {"room": 7, "price": "3500"}]
        }"#;
        let request: PricingPeriodRequest = serde_json::from_str(json).unwrap();
        let rooms: HashSet<i32> = [7].into_iter().collect();

        assert!(matches!(
            request.check_rooms(1, &rooms),
            Err(CalendarError::DuplicateRoom(7))
        ));
    }

    #[test]
    fn test_response_serialization() {
        let response = PricingPeriodResponse::new(
            period(true, Some(dec!(0.50))),
            vec![NightlyPrice {
                id: 3,
                period_id: 1,
                room_id: 7,
                price: dec!(4000.00),
            }],
        );

        let json = serde_json::to_value(&response).expect("Failed to serialize response");
        assert_eq!(json["start_date"], "2025-09-01");
        assert_eq!(json["discount"], true);
        assert_eq!(json["discount_amount"], "0.50");
        assert_eq!(json["calendar_prices"][0]["room"], 7);
        assert_eq!(json["calendar_prices"][0]["price"], "4000.00");
    }
}
