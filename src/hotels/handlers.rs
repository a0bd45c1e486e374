// HTTP handlers for hotel search and marketing widgets

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::error::ApiError;
use crate::hotels::{HotelSearchQuery, HotelWithPrice, PopularHotel};
use crate::pricing::DateRangeQuery;
use crate::query::PaginationQuery;
use crate::AppState;

/// Handler for GET /api/hotels
/// Searches active hotels, annotated with their cheapest eligible room
#[utoipa::path(
    get,
    path = "/api/hotels",
    params(DateRangeQuery, HotelSearchQuery, PaginationQuery),
    responses(
        (status = 200, description = "Hotels sorted by minimum price", body = Vec<HotelWithPrice>),
        (status = 400, description = "Invalid filters or date range")
    ),
    tag = "hotels"
)]
pub async fn search_hotels(
    State(state): State<AppState>,
    Query(dates): Query<DateRangeQuery>,
    Query(search): Query<HotelSearchQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<HotelWithPrice>>, ApiError> {
    let range = dates.stay_range()?;
    let filters = search.validate()?;
    let pagination = pagination.validate()?;

    let hotels = state
        .hotels
        .search(&filters, range, Utc::now().date_naive())
        .await?;

    tracing::debug!("Hotel search matched {} hotels", hotels.len());
    Ok(Json(pagination.apply(hotels)))
}

/// Handler for GET /api/hotels/hot
/// One discounted hotel per country
#[utoipa::path(
    get,
    path = "/api/hotels/hot",
    params(DateRangeQuery, PaginationQuery),
    responses(
        (status = 200, description = "Cheapest discounted hotel of each country", body = Vec<HotelWithPrice>),
        (status = 400, description = "Invalid date range")
    ),
    tag = "hotels"
)]
pub async fn hot_hotels(
    State(state): State<AppState>,
    Query(dates): Query<DateRangeQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<HotelWithPrice>>, ApiError> {
    let range = dates.stay_range()?;
    let pagination = pagination.validate()?;

    let deals = state.hotels.hot(range, Utc::now().date_naive()).await?;

    Ok(Json(pagination.apply(deals)))
}

/// Handler for GET /api/hotels/popular
/// Cheapest hotel of each country, limited to the configured number of countries
#[utoipa::path(
    get,
    path = "/api/hotels/popular",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Popular hotels", body = Vec<PopularHotel>),
        (status = 400, description = "Invalid date range")
    ),
    tag = "hotels"
)]
pub async fn popular_hotels(
    State(state): State<AppState>,
    Query(dates): Query<DateRangeQuery>,
) -> Result<Json<Vec<PopularHotel>>, ApiError> {
    let range = dates.stay_range()?;

    let popular = state
        .hotels
        .popular(range, Utc::now().date_naive(), state.popular_hotels_limit)
        .await?;

    Ok(Json(popular))
}
