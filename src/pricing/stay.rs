use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::pricing::error::PricingError;

/// Longest stay, in nights, that can be priced
pub const MAX_STAY_NIGHTS: i64 = 366;

/// A requested stay `[check_in, check_out)`
///
/// Night `i` covers `[check_in + i, check_in + i + 1)`, so the check-out day
/// itself is never priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// Build a stay range, rejecting empty, inverted or overlong ranges
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, PricingError> {
        if check_out <= check_in {
            return Err(PricingError::InvalidRange {
                start: check_in,
                end: check_out,
            });
        }
        let nights = (check_out - check_in).num_days();
        if nights > MAX_STAY_NIGHTS {
            return Err(PricingError::StayTooLong {
                nights,
                max: MAX_STAY_NIGHTS,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Date of the last night of the stay
    pub fn last_night(&self) -> NaiveDate {
        self.check_out - Duration::days(1)
    }

    /// Number of nights in the stay (always >= 1)
    pub fn night_count(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// Iterate over the first day of every night in the stay
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> {
        let count = self.night_count() as usize;
        self.check_in.iter_days().take(count)
    }

    /// Whether the inclusive span `[start, end]` touches any night of the stay
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.last_night() && end >= self.check_in
    }
}

/// `date_range_after` / `date_range_before` query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DateRangeQuery {
    /// Check-in date (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-09-01")]
    pub date_range_after: Option<NaiveDate>,
    /// Check-out date (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-09-04")]
    pub date_range_before: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Convert into a stay range
    ///
    /// Returns `Ok(None)` when neither bound is given.
    pub fn stay_range(&self) -> Result<Option<StayRange>, PricingError> {
        match (self.date_range_after, self.date_range_before) {
            (Some(check_in), Some(check_out)) => StayRange::new(check_in, check_out).map(Some),
            (None, None) => Ok(None),
            _ => Err(PricingError::IncompleteRange),
        }
    }
}
