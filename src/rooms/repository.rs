use sqlx::PgPool;

use crate::query::{bind_params, SQLQueryBuilder};
use crate::rooms::{Room, RoomFilters};

const ROOM_SELECT: &str =
    "SELECT id, hotel_id, category, number_of_adults, number_of_children FROM rooms";

/// Read access to the room catalog
#[derive(Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!("{} WHERE id = $1", ROOM_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Rooms matching the filters, ordered by id
    pub async fn search(&self, filters: &RoomFilters) -> Result<Vec<Room>, sqlx::Error> {
        let (sql, params) = build_search(filters).build();
        tracing::debug!("Room search: {}", sql);

        bind_params(sqlx::query_as::<_, Room>(&sql), params)
            .fetch_all(&self.pool)
            .await
    }
}

fn build_search(filters: &RoomFilters) -> SQLQueryBuilder {
    let mut builder = SQLQueryBuilder::new(ROOM_SELECT);

    if let Some(hotel_id) = filters.hotel_id {
        builder.add_eq("hotel_id", hotel_id);
    }
    builder.add_any_ci("category", filters.categories.clone());
    builder.add_any("number_of_adults", filters.adults.clone());
    builder.add_any("number_of_children", filters.children.clone());
    builder.set_order("id");

    builder
}
