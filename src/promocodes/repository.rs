use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::promocodes::PromoCode;

/// Read access to promo codes and the tours they are redeemed against
#[derive(Clone)]
pub struct PromoRepository {
    pool: PgPool,
}

impl PromoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a promo code by its exact code, with its eligible tours and hotels
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, sqlx::Error> {
        sqlx::query_as::<_, PromoCode>(
            "SELECT p.id, p.code, p.description, p.start_date, p.end_date, \
                    p.discount_amount, p.is_active, \
                    ARRAY(SELECT t.tour_id FROM promo_code_tours t \
                          WHERE t.promo_code_id = p.id ORDER BY t.tour_id) AS tour_ids, \
                    ARRAY(SELECT h.hotel_id FROM promo_code_hotels h \
                          WHERE h.promo_code_id = p.id ORDER BY h.hotel_id) AS hotel_ids \
             FROM promo_codes p WHERE p.code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    /// Total price of a tour
    pub async fn tour_price(&self, tour_id: i32) -> Result<Option<Decimal>, sqlx::Error> {
        sqlx::query_scalar("SELECT total_price FROM tours WHERE id = $1")
            .bind(tour_id)
            .fetch_optional(&self.pool)
            .await
    }
}
