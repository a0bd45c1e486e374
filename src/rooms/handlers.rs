// HTTP handlers for room endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::pricing::{DateRangeQuery, PriceWindow, PricingError, RoomKey};
use crate::query::PaginationQuery;
use crate::rooms::{RoomFilterQuery, RoomResponse, StayQuoteResponse};
use crate::AppState;

/// Handler for GET /api/rooms
/// Lists rooms; with a date range only fully covered rooms are returned, priced
#[utoipa::path(
    get,
    path = "/api/rooms",
    params(DateRangeQuery, RoomFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Matching rooms", body = Vec<RoomResponse>),
        (status = 400, description = "Invalid filters or date range")
    ),
    tag = "rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(dates): Query<DateRangeQuery>,
    Query(filters): Query<RoomFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    let range = dates.stay_range()?;
    let filters = filters.validate()?;
    let pagination = pagination.validate()?;

    let rooms = state.rooms.search(&filters).await?;

    let Some(range) = range else {
        return Ok(Json(
            pagination.apply(rooms.into_iter().map(RoomResponse::plain).collect()),
        ));
    };

    let timer = state.metrics.start_room_search();
    let keys: Vec<RoomKey> = rooms.iter().map(|room| room.key()).collect();
    let priced: HashMap<i32, _> = state
        .pricing
        .price_rooms(&keys, PriceWindow::Stay(range))
        .await?
        .into_iter()
        .map(|price| (price.room.room_id, price))
        .collect();
    timer.complete();

    tracing::debug!(
        "{} of {} rooms fully covered for {} nights",
        priced.len(),
        rooms.len(),
        range.night_count()
    );

    let annotated: Vec<RoomResponse> = rooms
        .into_iter()
        .filter_map(|room| {
            priced
                .get(&room.id)
                .map(|price| RoomResponse::priced(room, price, &range))
        })
        .collect();

    Ok(Json(pagination.apply(annotated)))
}

/// Handler for GET /api/rooms/:id/quote
/// Prices a stay for one room, reporting partial coverage instead of failing
#[utoipa::path(
    get,
    path = "/api/rooms/{id}/quote",
    params(
        ("id" = i32, Path, description = "Room ID"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Stay quote", body = StayQuoteResponse),
        (status = 400, description = "Missing or invalid date range"),
        (status = 404, description = "Room not found")
    ),
    tag = "rooms"
)]
pub async fn quote_room(
    State(state): State<AppState>,
    Path(room_id): Path<i32>,
    Query(dates): Query<DateRangeQuery>,
) -> Result<Json<StayQuoteResponse>, PricingError> {
    let range = dates.stay_range()?.ok_or(PricingError::IncompleteRange)?;

    let room = state
        .rooms
        .find_by_id(room_id)
        .await?
        .ok_or(PricingError::RoomNotFound(room_id))?;

    let outcome = state.pricing.quote_room(room.key(), &range).await?;

    Ok(Json(StayQuoteResponse::new(room.id, &range, &outcome)))
}
