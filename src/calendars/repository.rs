use sqlx::{PgPool, Postgres, Transaction};
use std::collections::{HashMap, HashSet};

use crate::calendars::error::CalendarError;
use crate::calendars::{CalendarEntry, NightlyPrice, PricingPeriod, PricingPeriodRequest};
use crate::query::Pagination;

const PERIOD_COLUMNS: &str =
    "id, hotel_id, start_date, end_date, available_for_booking, discount, discount_amount";

/// A period together with its nightly prices
pub type PeriodWithPrices = (PricingPeriod, Vec<NightlyPrice>);

/// Repository for pricing periods and their nightly prices
#[derive(Clone)]
pub struct CalendarRepository {
    pool: PgPool,
}

impl CalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn hotel_exists(&self, hotel_id: i32) -> Result<bool, CalendarError> {
        Ok(crate::db::exists(&self.pool, "hotels", hotel_id).await?)
    }

    /// Ids of every room of a hotel
    pub async fn hotel_room_ids(&self, hotel_id: i32) -> Result<HashSet<i32>, CalendarError> {
        let ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM rooms WHERE hotel_id = $1")
            .bind(hotel_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// List a hotel's periods ordered by start date
    pub async fn list(
        &self,
        hotel_id: i32,
        pagination: Pagination,
    ) -> Result<Vec<PeriodWithPrices>, CalendarError> {
        let periods = sqlx::query_as::<_, PricingPeriod>(&format!(
            "SELECT {} FROM pricing_periods WHERE hotel_id = $1 \
             ORDER BY start_date, id LIMIT $2 OFFSET $3",
            PERIOD_COLUMNS
        ))
        .bind(hotel_id)
        .bind(pagination.limit as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let period_ids: Vec<i32> = periods.iter().map(|p| p.id).collect();
        let prices = sqlx::query_as::<_, NightlyPrice>(
            "SELECT id, period_id, room_id, price FROM nightly_prices \
             WHERE period_id = ANY($1) ORDER BY room_id",
        )
        .bind(&period_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_period: HashMap<i32, Vec<NightlyPrice>> = HashMap::new();
        for price in prices {
            by_period.entry(price.period_id).or_default().push(price);
        }

        Ok(periods
            .into_iter()
            .map(|period| {
                let prices = by_period.remove(&period.id).unwrap_or_default();
                (period, prices)
            })
            .collect())
    }

    /// Find one period of a hotel
    pub async fn find(
        &self,
        hotel_id: i32,
        period_id: i32,
    ) -> Result<Option<PeriodWithPrices>, CalendarError> {
        let period = sqlx::query_as::<_, PricingPeriod>(&format!(
            "SELECT {} FROM pricing_periods WHERE id = $1 AND hotel_id = $2",
            PERIOD_COLUMNS
        ))
        .bind(period_id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        match period {
            Some(period) => {
                let prices = sqlx::query_as::<_, NightlyPrice>(
                    "SELECT id, period_id, room_id, price FROM nightly_prices \
                     WHERE period_id = $1 ORDER BY room_id",
                )
                .bind(period.id)
                .fetch_all(&self.pool)
                .await?;
                Ok(Some((period, prices)))
            }
            None => Ok(None),
        }
    }

    /// Create a period with its nightly prices in one transaction
    pub async fn create(
        &self,
        hotel_id: i32,
        request: &PricingPeriodRequest,
    ) -> Result<PeriodWithPrices, CalendarError> {
        let mut tx = self.pool.begin().await?;

        let period = sqlx::query_as::<_, PricingPeriod>(&format!(
            r#"
            INSERT INTO pricing_periods
                (hotel_id, start_date, end_date, available_for_booking, discount, discount_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PERIOD_COLUMNS
        ))
        .bind(hotel_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.available_for_booking)
        .bind(request.discount)
        .bind(request.discount_amount)
        .fetch_one(&mut *tx)
        .await?;

        let prices = upsert_prices(&mut tx, period.id, request).await?;

        tx.commit().await?;

        tracing::info!(
            "Created pricing period {} for hotel {} with {} prices",
            period.id,
            hotel_id,
            prices.len()
        );
        Ok((period, prices))
    }

    /// Fully update a period and atomically replace its nightly prices
    ///
    /// The period row is locked for the duration of the transaction. Prices
    /// are upserted and rooms missing from the payload are deleted, so no
    /// committed state ever has an empty price set for a priced period.
    /// Returns `Ok(None)` if the period does not exist.
    pub async fn replace(
        &self,
        hotel_id: i32,
        period_id: i32,
        request: &PricingPeriodRequest,
    ) -> Result<Option<PeriodWithPrices>, CalendarError> {
        self.replace_in_transaction(hotel_id, period_id, request)
            .await
            .map_err(CalendarError::UpdateFailed)
    }

    async fn replace_in_transaction(
        &self,
        hotel_id: i32,
        period_id: i32,
        request: &PricingPeriodRequest,
    ) -> Result<Option<PeriodWithPrices>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM pricing_periods WHERE id = $1 AND hotel_id = $2 FOR UPDATE",
        )
        .bind(period_id)
        .bind(hotel_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            // dropping the transaction rolls it back
            return Ok(None);
        }

        let period = sqlx::query_as::<_, PricingPeriod>(&format!(
            r#"
            UPDATE pricing_periods
            SET start_date = $1,
                end_date = $2,
                available_for_booking = $3,
                discount = $4,
                discount_amount = $5
            WHERE id = $6
            RETURNING {}
            "#,
            PERIOD_COLUMNS
        ))
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.available_for_booking)
        .bind(request.discount)
        .bind(request.discount_amount)
        .bind(period_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM nightly_prices WHERE period_id = $1 AND NOT (room_id = ANY($2))")
            .bind(period_id)
            .bind(request.room_ids())
            .execute(&mut *tx)
            .await?;

        let prices = upsert_prices(&mut tx, period_id, request).await?;

        tx.commit().await?;

        tracing::info!(
            "Replaced pricing period {} of hotel {} with {} prices",
            period_id,
            hotel_id,
            prices.len()
        );
        Ok(Some((period, prices)))
    }

    /// Delete a period; its prices cascade
    pub async fn delete(&self, hotel_id: i32, period_id: i32) -> Result<bool, CalendarError> {
        let result = sqlx::query("DELETE FROM pricing_periods WHERE id = $1 AND hotel_id = $2")
            .bind(period_id)
            .bind(hotel_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load the calendars of several hotels as one snapshot
    ///
    /// A single statement sees one committed state, so a concurrent replace
    /// is observed either entirely or not at all.
    pub async fn load_calendar(&self, hotel_ids: &[i32]) -> Result<Vec<CalendarEntry>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEntry>(
            r#"
            SELECT p.id AS period_id, p.hotel_id, p.start_date, p.end_date,
                   p.available_for_booking, p.discount, p.discount_amount,
                   np.room_id, np.price
            FROM pricing_periods p
            JOIN nightly_prices np ON np.period_id = p.id
            WHERE p.hotel_id = ANY($1)
            "#,
        )
        .bind(hotel_ids)
        .fetch_all(&self.pool)
        .await
    }
}

async fn upsert_prices(
    tx: &mut Transaction<'_, Postgres>,
    period_id: i32,
    request: &PricingPeriodRequest,
) -> Result<Vec<NightlyPrice>, sqlx::Error> {
    let mut prices = Vec::with_capacity(request.calendar_prices.len());

    for entry in &request.calendar_prices {
        let price = sqlx::query_as::<_, NightlyPrice>(
            r#"
            INSERT INTO nightly_prices (period_id, room_id, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (period_id, room_id) DO UPDATE SET price = EXCLUDED.price
            RETURNING id, period_id, room_id, price
            "#,
        )
        .bind(period_id)
        .bind(entry.room)
        .bind(entry.price)
        .fetch_one(&mut **tx)
        .await?;
        prices.push(price);
    }

    prices.sort_by_key(|p| p.room_id);
    Ok(prices)
}
