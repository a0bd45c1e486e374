use std::collections::{BTreeMap, BTreeSet};

use crate::calendars::CalendarRepository;
use crate::pricing::engine::{PricingCalendar, RateFilter, RoomKey, StayOutcome};
use crate::pricing::error::PricingError;
use crate::pricing::metrics::PerformanceMetrics;
use crate::pricing::rollup::{hotel_minimums, Cheapest, PriceBasis, RoomPrice};
use crate::pricing::stay::StayRange;

/// How candidate rooms are priced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceWindow {
    /// Total of a concrete stay; rooms not fully covered are dropped
    Stay(StayRange),
    /// Cheapest single nightly rate passing the filter
    Nightly(RateFilter),
}

/// Loads calendar snapshots and runs the engine over them
#[derive(Clone)]
pub struct PricingService {
    calendars: CalendarRepository,
    metrics: PerformanceMetrics,
}

impl PricingService {
    pub fn new(calendars: CalendarRepository, metrics: PerformanceMetrics) -> Self {
        Self { calendars, metrics }
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    async fn load(&self, rooms: &[RoomKey]) -> Result<PricingCalendar, PricingError> {
        let hotel_ids: Vec<i32> = rooms
            .iter()
            .map(|room| room.hotel_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if hotel_ids.is_empty() {
            return Ok(PricingCalendar::default());
        }

        let entries = self.calendars.load_calendar(&hotel_ids).await?;
        tracing::debug!(
            "Loaded {} calendar entries for {} hotels",
            entries.len(),
            hotel_ids.len()
        );
        Ok(PricingCalendar::new(entries))
    }

    /// Price a stay for a single room
    pub async fn quote_room(
        &self,
        room: RoomKey,
        range: &StayRange,
    ) -> Result<StayOutcome, PricingError> {
        let timer = self.metrics.start_stay_quote();
        let calendar = self.load(&[room]).await?;
        let outcome = calendar.compute_stay(room, range);
        timer.complete();

        Ok(outcome)
    }

    /// Price many rooms, keeping only those the window can price
    pub async fn price_rooms(
        &self,
        rooms: &[RoomKey],
        window: PriceWindow,
    ) -> Result<Vec<RoomPrice>, PricingError> {
        let calendar = self.load(rooms).await?;

        let priced: Vec<RoomPrice> = match window {
            PriceWindow::Stay(range) => calendar.stay_prices(rooms, &range).collect(),
            PriceWindow::Nightly(filter) => calendar.nightly_prices(rooms, filter).collect(),
        };

        let excluded = rooms.len() - priced.len();
        if excluded > 0 {
            self.metrics.record_rooms_excluded(excluded);
        }
        Ok(priced)
    }

    /// Cheapest room of every hotel owning one of `rooms`
    pub async fn hotel_minimums(
        &self,
        rooms: &[RoomKey],
        window: PriceWindow,
        basis: PriceBasis,
    ) -> Result<BTreeMap<i32, Cheapest<RoomPrice>>, PricingError> {
        let priced = self.price_rooms(rooms, window).await?;
        Ok(hotel_minimums(priced, basis))
    }
}
