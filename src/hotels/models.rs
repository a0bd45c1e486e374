use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::pricing::PricePair;
use crate::query::{normalize_string, split_list, QueryError};

/// A hotel as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Hotel {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Sea Breeze")]
    pub name: String,
    #[schema(example = 4)]
    pub star_category: Option<i32>,
    #[schema(example = "Italy")]
    pub country: String,
    #[schema(example = "Rimini")]
    pub city: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
}

/// Query parameters of `GET /api/hotels`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct HotelSearchQuery {
    /// Countries, comma-separated, case-insensitive
    pub country: Option<String>,
    /// Cities, comma-separated, case-insensitive
    pub city: Option<String>,
    /// Rooms for exactly this many adults
    pub number_of_adults: Option<i32>,
    /// Rooms for exactly this many children
    pub number_of_children: Option<i32>,
    /// Lower bound of the hotel's minimum price
    #[param(value_type = Option<String>, example = "1000.00")]
    pub price_gte: Option<Decimal>,
    /// Upper bound of the hotel's minimum price
    #[param(value_type = Option<String>, example = "50000.00")]
    pub price_lte: Option<Decimal>,
}

/// Validated hotel search filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelFilters {
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub adults: Option<i32>,
    pub children: Option<i32>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
}

impl HotelSearchQuery {
    pub fn validate(self) -> Result<HotelFilters, QueryError> {
        if let (Some(gte), Some(lte)) = (self.price_gte, self.price_lte) {
            if gte > lte {
                return Err(QueryError::Conflict(
                    "price_gte cannot be greater than price_lte".to_string(),
                ));
            }
        }

        Ok(HotelFilters {
            countries: split_list(normalize_string(self.country).as_deref()),
            cities: split_list(normalize_string(self.city).as_deref()),
            adults: self.number_of_adults,
            children: self.number_of_children,
            price_gte: self.price_gte,
            price_lte: self.price_lte,
        })
    }
}

impl HotelFilters {
    /// Whether a minimum price lies within the requested bounds
    pub fn accepts_price(&self, price: Decimal) -> bool {
        self.price_gte.map_or(true, |gte| price >= gte)
            && self.price_lte.map_or(true, |lte| price <= lte)
    }
}

/// A hotel annotated with the price of its cheapest room
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HotelWithPrice {
    #[serde(flatten)]
    pub hotel: Hotel,
    /// Room the minimum comes from
    pub room_id: i32,
    #[schema(value_type = String, example = "25000.00")]
    pub min_price_without_discount: Decimal,
    #[schema(value_type = String, example = "20000.00")]
    pub min_price_with_discount: Decimal,
    /// Nights of the requested stay, absent for nightly rates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
}

impl HotelWithPrice {
    pub fn new(hotel: Hotel, room_id: i32, prices: PricePair, nights: Option<u32>) -> Self {
        Self {
            hotel,
            room_id,
            min_price_without_discount: prices.plain,
            min_price_with_discount: prices.discounted,
            nights,
        }
    }
}

/// Cheapest hotel of a country with the number of hotels there
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PopularHotel {
    #[serde(flatten)]
    pub hotel: Hotel,
    #[schema(value_type = String, example = "25000.00")]
    pub min_price_without_discount: Decimal,
    pub hotels_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_search_query_validation() {
        let query = HotelSearchQuery {
            country: Some("Italy, Spain".to_string()),
            number_of_adults: Some(2),
            price_gte: Some(dec!(100)),
            price_lte: Some(dec!(500)),
            ..Default::default()
        };

        let filters = query.validate().unwrap();
        assert_eq!(filters.countries, vec!["Italy", "Spain"]);
        assert!(filters.cities.is_empty());
        assert_eq!(filters.adults, Some(2));
        assert!(filters.accepts_price(dec!(100)));
        assert!(filters.accepts_price(dec!(500)));
        assert!(!filters.accepts_price(dec!(500.01)));
        assert!(!filters.accepts_price(dec!(99.99)));
    }

    #[test]
    fn test_inverted_price_bounds_are_rejected() {
        let query = HotelSearchQuery {
            price_gte: Some(dec!(500)),
            price_lte: Some(dec!(100)),
            ..Default::default()
        };
        assert!(matches!(query.validate(), Err(QueryError::Conflict(_))));
    }

    #[test]
    fn test_hotel_with_price_serialization() {
        let hotel = Hotel {
            id: 3,
            name: "Sea Breeze".to_string(),
            star_category: Some(4),
            country: "Italy".to_string(),
            city: Some("Rimini".to_string()),
            address: None,
            is_active: true,
        };
        let prices = PricePair {
            plain: dec!(12000.00),
            discounted: dec!(6000.00),
        };

        let json = serde_json::to_value(HotelWithPrice::new(hotel, 7, prices, Some(3))).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["country"], "Italy");
        assert_eq!(json["min_price_without_discount"], "12000.00");
        assert_eq!(json["min_price_with_discount"], "6000.00");
        assert_eq!(json["nights"], 3);
    }
}
