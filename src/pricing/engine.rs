// Coverage & aggregation engine
//
// Decomposes a stay into nights, resolves every night to exactly one priced
// period of the room's hotel and sums plain and discounted prices. The engine
// holds an immutable snapshot of calendar entries and never touches storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::calendars::CalendarEntry;
use crate::discount::{apply_optional_discount, round_to_cents};
use crate::pricing::rollup::{PriceBasis, PricePair, RoomPrice};
use crate::pricing::stay::StayRange;

/// A room together with the hotel that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoomKey {
    pub room_id: i32,
    pub hotel_id: i32,
}

impl RoomKey {
    pub fn new(room_id: i32, hotel_id: i32) -> Self {
        Self { room_id, hotel_id }
    }
}

/// Outcome of resolving a single night
#[derive(Debug, Clone, PartialEq)]
pub enum NightResolution {
    /// Exactly one available period prices the night
    Priced {
        period_id: i32,
        price: Decimal,
        discounted_price: Decimal,
    },
    /// No period of the room's hotel prices the night
    NoPeriod,
    /// The only period pricing the night is closed for booking
    Closed { period_id: i32 },
    /// Several periods claim the night
    Ambiguous { period_ids: Vec<i32> },
}

/// Aggregated price of a fully covered stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayQuote {
    pub price_plain: Decimal,
    pub price_discounted: Decimal,
    pub nights_covered: u32,
}

impl StayQuote {
    pub fn prices(&self) -> PricePair {
        PricePair {
            plain: self.price_plain,
            discounted: self.price_discounted,
        }
    }
}

/// Result of pricing a stay for one room
#[derive(Debug, Clone, PartialEq)]
pub enum StayOutcome {
    /// Every night resolved to exactly one available priced period
    Covered(StayQuote),
    /// At least one night could not be resolved
    NotFullyCovered {
        nights_covered: u32,
        nights_requested: u32,
    },
}

impl StayOutcome {
    pub fn quote(&self) -> Option<&StayQuote> {
        match self {
            StayOutcome::Covered(quote) => Some(quote),
            StayOutcome::NotFullyCovered { .. } => None,
        }
    }

    pub fn is_covered(&self) -> bool {
        matches!(self, StayOutcome::Covered(_))
    }

    pub fn nights_covered(&self) -> u32 {
        match self {
            StayOutcome::Covered(quote) => quote.nights_covered,
            StayOutcome::NotFullyCovered { nights_covered, .. } => *nights_covered,
        }
    }
}

/// Which nightly rates take part in a date-less rollup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateFilter {
    /// Only periods with an effective discount
    pub discounted_only: bool,
    /// Skip periods that ended before this date
    pub not_ended_before: Option<NaiveDate>,
    /// Price a room's periods are ranked by
    pub rank_by: PriceBasis,
}

/// Immutable snapshot of calendar entries indexed by room
#[derive(Debug, Clone, Default)]
pub struct PricingCalendar {
    entries_by_room: HashMap<i32, Vec<CalendarEntry>>,
}

impl PricingCalendar {
    /// Index calendar entries by room
    pub fn new(entries: impl IntoIterator<Item = CalendarEntry>) -> Self {
        let mut entries_by_room: HashMap<i32, Vec<CalendarEntry>> = HashMap::new();
        for entry in entries {
            entries_by_room.entry(entry.room_id).or_default().push(entry);
        }
        for entries in entries_by_room.values_mut() {
            entries.sort_by_key(|e| (e.start_date, e.period_id));
        }
        Self { entries_by_room }
    }

    /// Entries that price `room` and belong to the room's own hotel
    fn entries_for(&self, room: RoomKey) -> impl Iterator<Item = &CalendarEntry> {
        self.entries_by_room
            .get(&room.room_id)
            .into_iter()
            .flatten()
            .filter(move |entry| entry.hotel_id == room.hotel_id)
    }

    /// Resolve one night for a room
    pub fn resolve_night(&self, room: RoomKey, night: NaiveDate) -> NightResolution {
        let claims: Vec<&CalendarEntry> = self
            .entries_for(room)
            .filter(|entry| entry.contains(night))
            .collect();
        resolve_claims(&claims)
    }

    /// Price a stay for one room
    ///
    /// The room is covered only when every night of the stay resolves to a
    /// single available priced period. Prices of uncovered nights never leak
    /// into the totals because uncovered stays carry no totals at all.
    pub fn compute_stay(&self, room: RoomKey, range: &StayRange) -> StayOutcome {
        let relevant: Vec<&CalendarEntry> = self
            .entries_for(room)
            .filter(|entry| range.overlaps(entry.start_date, entry.end_date))
            .collect();

        let mut price_plain = Decimal::ZERO;
        let mut price_discounted = Decimal::ZERO;
        let mut nights_covered = 0u32;

        for night in range.nights() {
            let claims: Vec<&CalendarEntry> = relevant
                .iter()
                .copied()
                .filter(|entry| entry.contains(night))
                .collect();

            match resolve_claims(&claims) {
                NightResolution::Priced {
                    price,
                    discounted_price,
                    ..
                } => {
                    price_plain += price;
                    price_discounted += discounted_price;
                    nights_covered += 1;
                }
                unresolved => {
                    tracing::trace!(
                        "Room {} night {} unresolved: {:?}",
                        room.room_id,
                        night,
                        unresolved
                    );
                }
            }
        }

        let nights_requested = range.night_count();
        if nights_covered == nights_requested {
            StayOutcome::Covered(StayQuote {
                price_plain: round_to_cents(price_plain),
                price_discounted: round_to_cents(price_discounted),
                nights_covered,
            })
        } else {
            StayOutcome::NotFullyCovered {
                nights_covered,
                nights_requested,
            }
        }
    }

    /// Price a stay for many rooms, keeping only fully covered ones
    pub fn stay_prices<'a>(
        &'a self,
        rooms: impl IntoIterator<Item = &'a RoomKey> + 'a,
        range: &'a StayRange,
    ) -> impl Iterator<Item = RoomPrice> + 'a {
        rooms.into_iter().filter_map(move |room| {
            match self.compute_stay(*room, range) {
                StayOutcome::Covered(quote) => Some(RoomPrice {
                    room: *room,
                    prices: quote.prices(),
                }),
                StayOutcome::NotFullyCovered {
                    nights_covered,
                    nights_requested,
                } => {
                    tracing::debug!(
                        "Excluding room {}: {}/{} nights covered",
                        room.room_id,
                        nights_covered,
                        nights_requested
                    );
                    None
                }
            }
        })
    }

    /// Cheapest available nightly rate of a room
    ///
    /// Entries are ranked by `filter.rank_by`, then by the other price. The
    /// returned pair always comes from a single period.
    pub fn cheapest_nightly_rate(&self, room: RoomKey, filter: RateFilter) -> Option<PricePair> {
        self.entries_for(room)
            .filter(|entry| entry.available_for_booking)
            .filter(|entry| !filter.discounted_only || entry.effective_discount().is_some())
            .filter(|entry| match filter.not_ended_before {
                Some(date) => entry.end_date >= date,
                None => true,
            })
            .map(|entry| PricePair {
                plain: entry.price,
                discounted: round_to_cents(apply_optional_discount(
                    entry.price,
                    entry.effective_discount(),
                )),
            })
            .min_by(|a, b| {
                a.on(filter.rank_by)
                    .cmp(&b.on(filter.rank_by))
                    .then(a.plain.cmp(&b.plain))
                    .then(a.discounted.cmp(&b.discounted))
            })
    }

    /// Cheapest nightly rate for many rooms, skipping rooms without any
    pub fn nightly_prices<'a>(
        &'a self,
        rooms: impl IntoIterator<Item = &'a RoomKey> + 'a,
        filter: RateFilter,
    ) -> impl Iterator<Item = RoomPrice> + 'a {
        rooms.into_iter().filter_map(move |room| {
            self.cheapest_nightly_rate(*room, filter)
                .map(|prices| RoomPrice { room: *room, prices })
        })
    }
}

fn resolve_claims(claims: &[&CalendarEntry]) -> NightResolution {
    match claims {
        [] => NightResolution::NoPeriod,
        [entry] if entry.available_for_booking => NightResolution::Priced {
            period_id: entry.period_id,
            price: entry.price,
            discounted_price: apply_optional_discount(entry.price, entry.effective_discount()),
        },
        [entry] => NightResolution::Closed {
            period_id: entry.period_id,
        },
        many => NightResolution::Ambiguous {
            period_ids: many.iter().map(|entry| entry.period_id).collect(),
        },
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(day as i64)
    }

    /// Without discounts both totals equal the sum of the nightly prices
    #[test]
    fn prop_undiscounted_totals_equal_nightly_sum() {
        proptest!(|(
            prices in prop::collection::vec(0u32..=50_000u32, 1..=12),
            offset in 0u32..=3,
        )| {
            let room = RoomKey::new(1, 1);
            // one single-day period per night
            let entries: Vec<CalendarEntry> = prices
                .iter()
                .enumerate()
                .map(|(i, &p)| CalendarEntry {
                    period_id: i as i32 + 1,
                    hotel_id: 1,
                    start_date: date(i as u32),
                    end_date: date(i as u32),
                    available_for_booking: true,
                    discount: false,
                    discount_amount: None,
                    room_id: 1,
                    price: Decimal::from(p),
                })
                .collect();
            let calendar = PricingCalendar::new(entries);

            let start = offset.min(prices.len() as u32 - 1);
            let range = StayRange::new(date(start), date(prices.len() as u32)).unwrap();
            let expected: Decimal = prices[start as usize..].iter().map(|&p| Decimal::from(p)).sum();

            let quote = *calendar.compute_stay(room, &range).quote().unwrap();
            prop_assert_eq!(quote.price_plain, expected);
            prop_assert_eq!(quote.price_discounted, expected);
            prop_assert_eq!(quote.nights_covered, range.night_count());
        });
    }

    /// Coverage never exceeds the requested nights and a single hole always disqualifies
    #[test]
    fn prop_hole_means_not_covered() {
        proptest!(|(
            nights in 2u32..=20,
            hole_seed in 0u32..=1000,
        )| {
            let hole = hole_seed % nights;
            let room = RoomKey::new(1, 1);
            let entries: Vec<CalendarEntry> = (0..nights)
                .filter(|&i| i != hole)
                .map(|i| CalendarEntry {
                    period_id: i as i32 + 1,
                    hotel_id: 1,
                    start_date: date(i),
                    end_date: date(i),
                    available_for_booking: true,
                    discount: true,
                    discount_amount: Some(Decimal::new(20, 2)),
                    room_id: 1,
                    price: Decimal::from(1000),
                })
                .collect();
            let calendar = PricingCalendar::new(entries);
            let range = StayRange::new(date(0), date(nights)).unwrap();

            let outcome = calendar.compute_stay(room, &range);
            prop_assert!(!outcome.is_covered());
            prop_assert_eq!(outcome.nights_covered(), nights - 1);
        });
    }
}
