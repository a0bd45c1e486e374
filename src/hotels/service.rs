// Hotel search and marketing rollups
//
// Hotels are priced through their rooms: the engine prices every eligible
// room, the hotel-level minimum picks one room per hotel and the country
// rollups pick one hotel per country.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::hotels::{Hotel, HotelFilters, HotelRepository, HotelWithPrice, PopularHotel};
use crate::pricing::{
    cheapest_hotel_per_country, with_country, Cheapest, PriceBasis, PriceWindow, PricingError,
    PricingService, RateFilter, RoomPrice, StayRange,
};

#[derive(Clone)]
pub struct HotelService {
    hotels: HotelRepository,
    pricing: PricingService,
}

impl HotelService {
    pub fn new(hotels: HotelRepository, pricing: PricingService) -> Self {
        Self { hotels, pricing }
    }

    async fn minimums(
        &self,
        hotels: &[Hotel],
        filters: &HotelFilters,
        window: PriceWindow,
        basis: PriceBasis,
    ) -> Result<BTreeMap<i32, Cheapest<RoomPrice>>, PricingError> {
        let hotel_ids: Vec<i32> = hotels.iter().map(|h| h.id).collect();
        if hotel_ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let rooms = self.hotels.eligible_rooms(&hotel_ids, filters).await?;
        self.pricing.hotel_minimums(&rooms, window, basis).await
    }

    /// Hotels with at least one eligible room, cheapest first
    pub async fn search(
        &self,
        filters: &HotelFilters,
        range: Option<StayRange>,
        today: NaiveDate,
    ) -> Result<Vec<HotelWithPrice>, PricingError> {
        let timer = self.pricing.metrics().start_hotel_rollup();

        let hotels = self.hotels.search(filters).await?;
        let window = match range {
            Some(range) => PriceWindow::Stay(range),
            None => PriceWindow::Nightly(RateFilter {
                discounted_only: false,
                not_ended_before: Some(today),
                rank_by: PriceBasis::Discounted,
            }),
        };
        let minimums = self
            .minimums(&hotels, filters, window, PriceBasis::Discounted)
            .await?;

        let results = rank_search_results(hotels, minimums, filters, range);
        timer.complete();
        Ok(results)
    }

    /// One discounted hotel per country, ordered by country
    pub async fn hot(
        &self,
        range: Option<StayRange>,
        today: NaiveDate,
    ) -> Result<Vec<HotelWithPrice>, PricingError> {
        let timer = self.pricing.metrics().start_hotel_rollup();

        let hotels = self.hotels.active().await?;
        let window = match range {
            Some(range) => PriceWindow::Stay(range),
            None => PriceWindow::Nightly(RateFilter {
                discounted_only: true,
                not_ended_before: Some(today),
                rank_by: PriceBasis::Discounted,
            }),
        };
        let minimums = self
            .minimums(&hotels, &HotelFilters::default(), window, PriceBasis::Discounted)
            .await?;

        let deals = hot_deals(hotels, minimums, range);
        timer.complete();
        Ok(deals)
    }

    /// Cheapest hotel of each country, cheapest countries first
    pub async fn popular(
        &self,
        range: Option<StayRange>,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PopularHotel>, PricingError> {
        let timer = self.pricing.metrics().start_hotel_rollup();

        let hotels = self.hotels.active().await?;
        let counts = self.hotels.count_active_by_country().await?;
        let window = match range {
            Some(range) => PriceWindow::Stay(range),
            None => PriceWindow::Nightly(popular_rates(today)),
        };
        let minimums = self
            .minimums(&hotels, &HotelFilters::default(), window, PriceBasis::Plain)
            .await?;

        let popular = rank_popular(hotels, minimums, &counts, limit);
        timer.complete();
        Ok(popular)
    }
}

/// Nightly rates that price popular hotels when no stay is given
fn popular_rates(today: NaiveDate) -> RateFilter {
    RateFilter {
        discounted_only: false,
        not_ended_before: Some(today),
        rank_by: PriceBasis::Plain,
    }
}

fn index_by_id(hotels: Vec<Hotel>) -> HashMap<i32, Hotel> {
    hotels.into_iter().map(|hotel| (hotel.id, hotel)).collect()
}

/// Annotate hotels with their minimum, filter by price bounds and sort
///
/// Hotels without a priced room are dropped. Order is by discounted minimum,
/// then hotel id.
pub fn rank_search_results(
    hotels: Vec<Hotel>,
    minimums: BTreeMap<i32, Cheapest<RoomPrice>>,
    filters: &HotelFilters,
    range: Option<StayRange>,
) -> Vec<HotelWithPrice> {
    let mut by_id = index_by_id(hotels);
    let nights = range.map(|r| r.night_count());

    let mut results: Vec<HotelWithPrice> = minimums
        .into_iter()
        .filter(|(_, cheapest)| filters.accepts_price(cheapest.candidate.prices.discounted))
        .filter_map(|(hotel_id, cheapest)| {
            by_id.remove(&hotel_id).map(|hotel| {
                HotelWithPrice::new(
                    hotel,
                    cheapest.candidate.room.room_id,
                    cheapest.candidate.prices,
                    nights,
                )
            })
        })
        .collect();

    results.sort_by(|a, b| {
        a.min_price_with_discount
            .cmp(&b.min_price_with_discount)
            .then(a.hotel.id.cmp(&b.hotel.id))
    });
    results
}

/// One discounted hotel per country, ordered by country
pub fn hot_deals(
    hotels: Vec<Hotel>,
    minimums: BTreeMap<i32, Cheapest<RoomPrice>>,
    range: Option<StayRange>,
) -> Vec<HotelWithPrice> {
    let mut by_id = index_by_id(hotels);
    let nights = range.map(|r| r.night_count());

    let candidates = with_country(minimums, |id| by_id.get(&id).map(|h| h.country.clone()));
    let winners = cheapest_hotel_per_country(candidates, PriceBasis::Discounted, true);

    winners
        .into_values()
        .filter_map(|winner| {
            let candidate = winner.candidate;
            by_id
                .remove(&candidate.hotel_id)
                .map(|hotel| HotelWithPrice::new(hotel, candidate.room_id, candidate.prices, nights))
        })
        .collect()
}

/// Cheapest hotel per country by plain price, first `limit` by price
pub fn rank_popular(
    hotels: Vec<Hotel>,
    minimums: BTreeMap<i32, Cheapest<RoomPrice>>,
    counts: &HashMap<String, i64>,
    limit: usize,
) -> Vec<PopularHotel> {
    let mut by_id = index_by_id(hotels);

    let candidates = with_country(minimums, |id| by_id.get(&id).map(|h| h.country.clone()));
    let mut winners: Vec<Cheapest<_>> = cheapest_hotel_per_country(candidates, PriceBasis::Plain, false)
        .into_values()
        .collect();
    winners.sort_by(|a, b| {
        a.price
            .cmp(&b.price)
            .then(a.candidate.hotel_id.cmp(&b.candidate.hotel_id))
    });

    winners
        .into_iter()
        .take(limit)
        .filter_map(|winner| {
            by_id.remove(&winner.candidate.hotel_id).map(|hotel| PopularHotel {
                hotels_count: counts.get(&hotel.country).copied().unwrap_or(0),
                min_price_without_discount: winner.price,
                hotel,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendars::CalendarEntry;
    use crate::pricing::{hotel_minimums, PricePair, PricingCalendar, RoomKey};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn hotel(id: i32, country: &str) -> Hotel {
        Hotel {
            id,
            name: format!("Hotel {}", id),
            star_category: None,
            country: country.to_string(),
            city: None,
            address: None,
            is_active: true,
        }
    }

    fn room(room_id: i32, hotel_id: i32, plain: Decimal, discounted: Decimal) -> RoomPrice {
        RoomPrice {
            room: RoomKey::new(room_id, hotel_id),
            prices: PricePair { plain, discounted },
        }
    }

    fn catalog() -> (Vec<Hotel>, Vec<RoomPrice>) {
        let hotels = vec![hotel(1, "Italy"), hotel(2, "Italy"), hotel(3, "Spain"), hotel(4, "Egypt")];
        let rooms = vec![
            room(10, 1, dec!(800), dec!(800)),
            room(11, 1, dec!(1000), dec!(900)),
            room(20, 2, dec!(900), dec!(600)),
            room(30, 3, dec!(700), dec!(700)),
            room(40, 4, dec!(1500), dec!(1200)),
        ];
        (hotels, rooms)
    }

    #[test]
    fn test_search_ranks_by_discounted_minimum() {
        let (hotels, rooms) = catalog();
        let minimums = hotel_minimums(rooms, PriceBasis::Discounted);

        let results = rank_search_results(hotels, minimums, &HotelFilters::default(), None);

        let ids: Vec<i32> = results.iter().map(|h| h.hotel.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
        assert_eq!(results[0].min_price_with_discount, dec!(600));
        assert_eq!(results[0].room_id, 20);
        assert_eq!(results[0].nights, None);
    }

    #[test]
    fn test_search_applies_price_bounds() {
        let (hotels, rooms) = catalog();
        let minimums = hotel_minimums(rooms, PriceBasis::Discounted);
        let filters = HotelFilters {
            price_gte: Some(dec!(700)),
            price_lte: Some(dec!(1000)),
            ..Default::default()
        };

        let results = rank_search_results(hotels, minimums, &filters, None);

        let ids: Vec<i32> = results.iter().map(|h| h.hotel.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_search_drops_unpriced_hotels() {
        let hotels = vec![hotel(1, "Italy"), hotel(5, "France")];
        let minimums = hotel_minimums(vec![room(10, 1, dec!(100), dec!(100))], PriceBasis::Discounted);

        let results = rank_search_results(hotels, minimums, &HotelFilters::default(), None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hotel.id, 1);
    }

    #[test]
    fn test_hot_deals_one_discounted_hotel_per_country() {
        let (hotels, rooms) = catalog();
        let minimums = hotel_minimums(rooms, PriceBasis::Discounted);

        let deals = hot_deals(hotels, minimums, None);

        // ordered by country; Spain has no discount
        let picked: Vec<(&str, i32)> = deals
            .iter()
            .map(|d| (d.hotel.country.as_str(), d.hotel.id))
            .collect();
        assert_eq!(picked, vec![("Egypt", 4), ("Italy", 2)]);
        assert_eq!(deals[1].min_price_without_discount, dec!(900));
        assert_eq!(deals[1].min_price_with_discount, dec!(600));
    }

    #[test]
    fn test_popular_hotels_by_plain_price() {
        let (hotels, rooms) = catalog();
        let minimums = hotel_minimums(rooms, PriceBasis::Plain);
        let counts: HashMap<String, i64> = [
            ("Italy".to_string(), 2),
            ("Spain".to_string(), 1),
            ("Egypt".to_string(), 1),
        ]
        .into_iter()
        .collect();

        let popular = rank_popular(hotels, minimums, &counts, 2);

        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].hotel.id, 3);
        assert_eq!(popular[0].min_price_without_discount, dec!(700));
        assert_eq!(popular[1].hotel.id, 1);
        assert_eq!(popular[1].hotels_count, 2);
    }

    #[test]
    fn test_popular_nightly_minimum_ignores_discounted_periods() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let period = |period_id: i32, start_month: u32, price: Decimal, discount_amount: Option<Decimal>| {
            CalendarEntry {
                period_id,
                hotel_id: 1,
                start_date: NaiveDate::from_ymd_opt(2025, start_month, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, start_month, 28).unwrap(),
                available_for_booking: true,
                discount: discount_amount.is_some(),
                discount_amount,
                room_id: 10,
                price,
            }
        };
        // the discounted period is cheaper after discount, the plain one before
        let calendar = PricingCalendar::new(vec![
            period(1, 8, dec!(1000), Some(dec!(0.5))),
            period(2, 9, dec!(800), None),
        ]);
        let rooms = vec![RoomKey::new(10, 1)];
        let priced: Vec<RoomPrice> = calendar.nightly_prices(&rooms, popular_rates(today)).collect();
        let minimums = hotel_minimums(priced, PriceBasis::Plain);
        let counts: HashMap<String, i64> = [("Italy".to_string(), 1)].into_iter().collect();

        let popular = rank_popular(vec![hotel(1, "Italy")], minimums, &counts, 10);

        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].min_price_without_discount, dec!(800));
    }
}
