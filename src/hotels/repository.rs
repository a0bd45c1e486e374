use sqlx::PgPool;
use std::collections::HashMap;

use crate::hotels::{Hotel, HotelFilters};
use crate::pricing::RoomKey;
use crate::query::{bind_params, SQLQueryBuilder, SqlParam};

const HOTEL_COLUMNS: &str = "h.id, h.name, h.star_category, h.country, h.city, h.address, h.is_active";

/// Read access to the hotel catalog
#[derive(Clone)]
pub struct HotelRepository {
    pool: PgPool,
}

impl HotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active hotels matching the location filters
    pub async fn search(&self, filters: &HotelFilters) -> Result<Vec<Hotel>, sqlx::Error> {
        let (sql, params) = build_hotel_search(filters).build();
        tracing::debug!("Hotel search: {}", sql);

        bind_params(sqlx::query_as::<_, Hotel>(&sql), params)
            .fetch_all(&self.pool)
            .await
    }

    /// All active hotels
    pub async fn active(&self) -> Result<Vec<Hotel>, sqlx::Error> {
        self.search(&HotelFilters::default()).await
    }

    /// Rooms of the given hotels matching the guest filters
    pub async fn eligible_rooms(
        &self,
        hotel_ids: &[i32],
        filters: &HotelFilters,
    ) -> Result<Vec<RoomKey>, sqlx::Error> {
        let (sql, params) = build_room_search(hotel_ids, filters).build();

        let rows = bind_params(sqlx::query_as::<_, (i32, i32)>(&sql), params)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(room_id, hotel_id)| RoomKey::new(room_id, hotel_id))
            .collect())
    }

    /// Number of active hotels per country
    pub async fn count_active_by_country(&self) -> Result<HashMap<String, i64>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT country, COUNT(*) FROM hotels WHERE is_active GROUP BY country",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

fn build_hotel_search(filters: &HotelFilters) -> SQLQueryBuilder {
    let mut builder =
        SQLQueryBuilder::new(&format!("SELECT {} FROM hotels h", HOTEL_COLUMNS));

    builder.add_clause("h.is_active");
    builder.add_any_ci("h.country", filters.countries.clone());
    builder.add_any_ci("h.city", filters.cities.clone());
    builder.set_order("h.id");

    builder
}

fn build_room_search(hotel_ids: &[i32], filters: &HotelFilters) -> SQLQueryBuilder {
    let mut builder = SQLQueryBuilder::new("SELECT r.id, r.hotel_id FROM rooms r");

    builder.add_condition("r.hotel_id = ANY({})", SqlParam::IntList(hotel_ids.to_vec()));
    if let Some(adults) = filters.adults {
        builder.add_eq("r.number_of_adults", adults);
    }
    if let Some(children) = filters.children {
        builder.add_eq("r.number_of_children", children);
    }
    builder.set_order("r.id");

    builder
}
