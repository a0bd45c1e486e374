// Catalog rollup selector
//
// Grouped-min reduction over priced candidates. Works on plain values so it
// can be tested without a database; the engine supplies the prices.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::pricing::engine::RoomKey;

/// Which of the two totals a rollup ranks by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceBasis {
    Plain,
    #[default]
    Discounted,
}

/// Plain and discounted price of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePair {
    pub plain: Decimal,
    pub discounted: Decimal,
}

impl PricePair {
    pub fn on(&self, basis: PriceBasis) -> Decimal {
        match basis {
            PriceBasis::Plain => self.plain,
            PriceBasis::Discounted => self.discounted,
        }
    }

    /// Whether a discount actually lowered the price
    pub fn is_discounted(&self) -> bool {
        self.discounted < self.plain
    }
}

/// Winner of a group together with the price it won on
#[derive(Debug, Clone, PartialEq)]
pub struct Cheapest<C> {
    pub candidate: C,
    pub price: Decimal,
}

/// Select the cheapest candidate of every group
///
/// Candidates for which `price` returns `None` are discarded. Ties are broken
/// by the lowest `tie_break` id, so the result does not depend on input order.
/// Groups without any priced candidate are absent from the map.
pub fn cheapest_per_group<C, K, I>(
    candidates: I,
    group_key: impl Fn(&C) -> K,
    price: impl Fn(&C) -> Option<Decimal>,
    tie_break: impl Fn(&C) -> i32,
) -> BTreeMap<K, Cheapest<C>>
where
    I: IntoIterator<Item = C>,
    K: Ord,
{
    let mut winners: BTreeMap<K, Cheapest<C>> = BTreeMap::new();

    for candidate in candidates {
        let Some(candidate_price) = price(&candidate) else {
            continue;
        };

        match winners.entry(group_key(&candidate)) {
            Entry::Vacant(slot) => {
                slot.insert(Cheapest {
                    candidate,
                    price: candidate_price,
                });
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                let beats = candidate_price < current.price
                    || (candidate_price == current.price
                        && tie_break(&candidate) < tie_break(&current.candidate));
                if beats {
                    slot.insert(Cheapest {
                        candidate,
                        price: candidate_price,
                    });
                }
            }
        }
    }

    winners
}

/// Priced room produced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomPrice {
    pub room: RoomKey,
    pub prices: PricePair,
}

/// Cheapest room of every hotel
pub fn hotel_minimums(
    rooms: impl IntoIterator<Item = RoomPrice>,
    basis: PriceBasis,
) -> BTreeMap<i32, Cheapest<RoomPrice>> {
    cheapest_per_group(
        rooms,
        |room| room.room.hotel_id,
        |room| Some(room.prices.on(basis)),
        |room| room.room.room_id,
    )
}

/// A hotel's minimum price together with its partition key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelPrice {
    pub hotel_id: i32,
    pub country: String,
    pub room_id: i32,
    pub prices: PricePair,
}

/// Cheapest hotel of every country
///
/// With `discounted_only`, hotels whose winning price carries no discount
/// are not candidates.
pub fn cheapest_hotel_per_country(
    hotels: impl IntoIterator<Item = HotelPrice>,
    basis: PriceBasis,
    discounted_only: bool,
) -> BTreeMap<String, Cheapest<HotelPrice>> {
    cheapest_per_group(
        hotels,
        |hotel| hotel.country.clone(),
        |hotel| {
            if discounted_only && !hotel.prices.is_discounted() {
                None
            } else {
                Some(hotel.prices.on(basis))
            }
        },
        |hotel| hotel.hotel_id,
    )
}

/// Attach countries to hotel minimums, dropping hotels with unknown country
pub fn with_country(
    minimums: BTreeMap<i32, Cheapest<RoomPrice>>,
    country_of: impl Fn(i32) -> Option<String>,
) -> Vec<HotelPrice> {
    minimums
        .into_iter()
        .filter_map(|(hotel_id, cheapest)| {
            country_of(hotel_id).map(|country| HotelPrice {
                hotel_id,
                country,
                room_id: cheapest.candidate.room.room_id,
                prices: cheapest.candidate.prices,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn room(room_id: i32, hotel_id: i32, plain: Decimal, discounted: Decimal) -> RoomPrice {
        RoomPrice {
            room: RoomKey::new(room_id, hotel_id),
            prices: PricePair { plain, discounted },
        }
    }

    fn hotel(hotel_id: i32, country: &str, plain: Decimal, discounted: Decimal) -> HotelPrice {
        HotelPrice {
            hotel_id,
            country: country.to_string(),
            room_id: hotel_id * 10,
            prices: PricePair { plain, discounted },
        }
    }

    #[test]
    fn test_hotel_minimums_pick_cheapest_room() {
        let rooms = vec![
            room(1, 1, dec!(9000), dec!(9000)),
            room(2, 1, dec!(12000), dec!(6000)),
            room(3, 2, dec!(5000), dec!(5000)),
        ];

        let by_discounted = hotel_minimums(rooms.clone(), PriceBasis::Discounted);
        assert_eq!(by_discounted[&1].candidate.room.room_id, 2);
        assert_eq!(by_discounted[&1].price, dec!(6000));
        assert_eq!(by_discounted[&2].price, dec!(5000));

        let by_plain = hotel_minimums(rooms, PriceBasis::Plain);
        assert_eq!(by_plain[&1].candidate.room.room_id, 1);
        assert_eq!(by_plain[&1].price, dec!(9000));
    }

    #[test]
    fn test_ties_break_on_lowest_id() {
        let rooms = vec![
            room(7, 1, dec!(100), dec!(100)),
            room(3, 1, dec!(100), dec!(100)),
            room(5, 1, dec!(100), dec!(100)),
        ];

        let winners = hotel_minimums(rooms, PriceBasis::Plain);
        assert_eq!(winners[&1].candidate.room.room_id, 3);
    }

    #[test]
    fn test_unpriced_candidates_are_discarded() {
        let candidates = vec![(1, "a", None), (2, "a", Some(dec!(10))), (3, "b", None)];

        let winners = cheapest_per_group(
            candidates,
            |(_, group, _)| *group,
            |(_, _, price)| *price,
            |(id, _, _)| *id,
        );

        assert_eq!(winners.len(), 1);
        assert_eq!(winners["a"].candidate.0, 2);
        assert!(!winners.contains_key("b"));
    }

    #[test]
    fn test_cheapest_hotel_per_country() {
        let hotels = vec![
            hotel(1, "Italy", dec!(800), dec!(800)),
            hotel(2, "Italy", dec!(900), dec!(600)),
            hotel(3, "Spain", dec!(700), dec!(700)),
        ];

        let popular = cheapest_hotel_per_country(hotels.clone(), PriceBasis::Plain, false);
        assert_eq!(popular["Italy"].candidate.hotel_id, 1);
        assert_eq!(popular["Spain"].candidate.hotel_id, 3);

        let hot = cheapest_hotel_per_country(hotels, PriceBasis::Discounted, true);
        assert_eq!(hot.len(), 1);
        assert_eq!(hot["Italy"].candidate.hotel_id, 2);
        assert_eq!(hot["Italy"].price, dec!(600));
    }

    #[test]
    fn test_with_country_drops_unknown_hotels() {
        let minimums = hotel_minimums(
            vec![room(1, 1, dec!(10), dec!(10)), room(2, 2, dec!(20), dec!(20))],
            PriceBasis::Plain,
        );

        let hotels = with_country(minimums, |id| (id == 1).then(|| "Italy".to_string()));

        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].hotel_id, 1);
        assert_eq!(hotels[0].room_id, 1);
    }
}
