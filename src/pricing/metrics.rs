// Performance metrics for the pricing engine
//
// Tracks execution times and slow operations of stay computations and
// catalog rollups.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use utoipa::ToSchema;

/// Performance threshold for slow operations (100ms)
const SLOW_OPERATION_THRESHOLD_MS: u64 = 100;

/// Performance metrics shared by all request handlers
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct OperationCounters {
    count: AtomicU64,
    total_time_us: AtomicU64,
    slow: AtomicU64,
}

impl OperationCounters {
    fn record(&self, operation: OperationType, duration: Duration) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if duration.as_millis() as u64 > SLOW_OPERATION_THRESHOLD_MS {
            self.slow.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow {}: {}ms", operation.label(), duration.as_millis());
        }
    }

    fn avg_time_ms(&self) -> f64 {
        let count = self.count.load(Ordering::Relaxed);
        let total_us = self.total_time_us.load(Ordering::Relaxed);

        if count == 0 {
            0.0
        } else {
            (total_us as f64 / count as f64) / 1000.0
        }
    }

    fn summary(&self) -> OperationSummary {
        OperationSummary {
            count: self.count.load(Ordering::Relaxed),
            avg_time_ms: self.avg_time_ms(),
            slow: self.slow.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
struct MetricsInner {
    stay_quotes: OperationCounters,
    room_searches: OperationCounters,
    hotel_rollups: OperationCounters,
    calendar_replaces: OperationCounters,
    // Rooms dropped from results because a night was not covered
    rooms_excluded: AtomicU64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Start timing a single-room stay computation
    pub fn start_stay_quote(&self) -> OperationTimer {
        OperationTimer::new(OperationType::StayQuote, self.clone())
    }

    /// Start timing a priced room search
    pub fn start_room_search(&self) -> OperationTimer {
        OperationTimer::new(OperationType::RoomSearch, self.clone())
    }

    /// Start timing a hotel rollup (search, hot or popular)
    pub fn start_hotel_rollup(&self) -> OperationTimer {
        OperationTimer::new(OperationType::HotelRollup, self.clone())
    }

    /// Start timing a nightly price replacement
    pub fn start_calendar_replace(&self) -> OperationTimer {
        OperationTimer::new(OperationType::CalendarReplace, self.clone())
    }

    pub fn record_rooms_excluded(&self, count: usize) {
        self.inner
            .rooms_excluded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    fn counters(&self, operation: OperationType) -> &OperationCounters {
        match operation {
            OperationType::StayQuote => &self.inner.stay_quotes,
            OperationType::RoomSearch => &self.inner.room_searches,
            OperationType::HotelRollup => &self.inner.hotel_rollups,
            OperationType::CalendarReplace => &self.inner.calendar_replaces,
        }
    }

    fn record(&self, operation: OperationType, duration: Duration) {
        self.counters(operation).record(operation, duration);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            stay_quotes: self.inner.stay_quotes.summary(),
            room_searches: self.inner.room_searches.summary(),
            hotel_rollups: self.inner.hotel_rollups.summary(),
            calendar_replaces: self.inner.calendar_replaces.summary(),
            rooms_excluded: self.inner.rooms_excluded.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            "Pricing Performance Metrics:\n\
             Stay quotes: {} computed, avg {:.2}ms, {} slow\n\
             Room searches: {} run, avg {:.2}ms, {} slow, {} rooms excluded\n\
             Hotel rollups: {} run, avg {:.2}ms, {} slow\n\
             Calendar replaces: {} run, avg {:.2}ms, {} slow",
            summary.stay_quotes.count,
            summary.stay_quotes.avg_time_ms,
            summary.stay_quotes.slow,
            summary.room_searches.count,
            summary.room_searches.avg_time_ms,
            summary.room_searches.slow,
            summary.rooms_excluded,
            summary.hotel_rollups.count,
            summary.hotel_rollups.avg_time_ms,
            summary.hotel_rollups.slow,
            summary.calendar_replaces.count,
            summary.calendar_replaces.avg_time_ms,
            summary.calendar_replaces.slow,
        );
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum OperationType {
    StayQuote,
    RoomSearch,
    HotelRollup,
    CalendarReplace,
}

impl OperationType {
    fn label(self) -> &'static str {
        match self {
            OperationType::StayQuote => "stay quote",
            OperationType::RoomSearch => "room search",
            OperationType::HotelRollup => "hotel rollup",
            OperationType::CalendarReplace => "calendar replace",
        }
    }
}

/// Records the elapsed time when completed or dropped, whichever comes first
pub struct OperationTimer {
    start: Instant,
    operation_type: OperationType,
    metrics: PerformanceMetrics,
    recorded: bool,
}

impl OperationTimer {
    fn new(operation_type: OperationType, metrics: PerformanceMetrics) -> Self {
        Self {
            start: Instant::now(),
            operation_type,
            metrics,
            recorded: false,
        }
    }

    /// Complete the timer and record the duration
    pub fn complete(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.recorded {
            self.recorded = true;
            self.metrics
                .record(self.operation_type, self.start.elapsed());
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.finish();
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OperationSummary {
    pub count: u64,
    pub avg_time_ms: f64,
    pub slow: u64,
}

/// Summary of performance metrics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsSummary {
    pub stay_quotes: OperationSummary,
    pub room_searches: OperationSummary,
    pub hotel_rollups: OperationSummary,
    pub calendar_replaces: OperationSummary,
    pub rooms_excluded: u64,
}
