// HTTP handlers for pricing calendar endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::calendars::{CalendarError, PricingPeriodRequest, PricingPeriodResponse};
use crate::query::PaginationQuery;
use crate::AppState;

async fn ensure_hotel(state: &AppState, hotel_id: i32) -> Result<(), CalendarError> {
    if state.calendars.hotel_exists(hotel_id).await? {
        Ok(())
    } else {
        Err(CalendarError::HotelNotFound(hotel_id))
    }
}

async fn validate_payload(
    state: &AppState,
    hotel_id: i32,
    request: &PricingPeriodRequest,
) -> Result<(), CalendarError> {
    request.validate()?;
    let hotel_rooms = state.calendars.hotel_room_ids(hotel_id).await?;
    request.check_rooms(hotel_id, &hotel_rooms)
}

/// Handler for GET /api/hotels/:hotel_id/price_calendars
#[utoipa::path(
    get,
    path = "/api/hotels/{hotel_id}/price_calendars",
    params(
        ("hotel_id" = i32, Path, description = "Hotel ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Pricing periods of the hotel", body = Vec<PricingPeriodResponse>),
        (status = 400, description = "Invalid pagination"),
        (status = 404, description = "Hotel not found")
    ),
    tag = "price_calendars"
)]
pub async fn list_periods(
    State(state): State<AppState>,
    Path(hotel_id): Path<i32>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<PricingPeriodResponse>>, CalendarError> {
    let pagination = pagination.validate()?;
    ensure_hotel(&state, hotel_id).await?;

    let periods = state.calendars.list(hotel_id, pagination).await?;

    tracing::debug!("Retrieved {} pricing periods for hotel {}", periods.len(), hotel_id);
    Ok(Json(
        periods
            .into_iter()
            .map(|(period, prices)| PricingPeriodResponse::new(period, prices))
            .collect(),
    ))
}

/// Handler for POST /api/hotels/:hotel_id/price_calendars
#[utoipa::path(
    post,
    path = "/api/hotels/{hotel_id}/price_calendars",
    params(("hotel_id" = i32, Path, description = "Hotel ID")),
    request_body = PricingPeriodRequest,
    responses(
        (status = 201, description = "Pricing period created", body = PricingPeriodResponse),
        (status = 400, description = "Invalid period or prices"),
        (status = 404, description = "Hotel not found")
    ),
    tag = "price_calendars"
)]
pub async fn create_period(
    State(state): State<AppState>,
    Path(hotel_id): Path<i32>,
    Json(request): Json<PricingPeriodRequest>,
) -> Result<(StatusCode, Json<PricingPeriodResponse>), CalendarError> {
    ensure_hotel(&state, hotel_id).await?;
    validate_payload(&state, hotel_id, &request).await?;

    let (period, prices) = state.calendars.create(hotel_id, &request).await?;

    Ok((
        StatusCode::CREATED,
        Json(PricingPeriodResponse::new(period, prices)),
    ))
}

/// Handler for GET /api/hotels/:hotel_id/price_calendars/:id
#[utoipa::path(
    get,
    path = "/api/hotels/{hotel_id}/price_calendars/{id}",
    params(
        ("hotel_id" = i32, Path, description = "Hotel ID"),
        ("id" = i32, Path, description = "Pricing period ID")
    ),
    responses(
        (status = 200, description = "Pricing period found", body = PricingPeriodResponse),
        (status = 404, description = "Hotel or period not found")
    ),
    tag = "price_calendars"
)]
pub async fn get_period(
    State(state): State<AppState>,
    Path((hotel_id, period_id)): Path<(i32, i32)>,
) -> Result<Json<PricingPeriodResponse>, CalendarError> {
    let (period, prices) = state
        .calendars
        .find(hotel_id, period_id)
        .await?
        .ok_or(CalendarError::PeriodNotFound { hotel_id, period_id })?;

    Ok(Json(PricingPeriodResponse::new(period, prices)))
}

/// Handler for PUT /api/hotels/:hotel_id/price_calendars/:id
/// Replaces the period and its nightly prices atomically
#[utoipa::path(
    put,
    path = "/api/hotels/{hotel_id}/price_calendars/{id}",
    params(
        ("hotel_id" = i32, Path, description = "Hotel ID"),
        ("id" = i32, Path, description = "Pricing period ID")
    ),
    request_body = PricingPeriodRequest,
    responses(
        (status = 200, description = "Pricing period replaced", body = PricingPeriodResponse),
        (status = 400, description = "Invalid period or prices"),
        (status = 404, description = "Hotel or period not found"),
        (status = 500, description = "Could not update pricing")
    ),
    tag = "price_calendars"
)]
pub async fn replace_period(
    State(state): State<AppState>,
    Path((hotel_id, period_id)): Path<(i32, i32)>,
    Json(request): Json<PricingPeriodRequest>,
) -> Result<Json<PricingPeriodResponse>, CalendarError> {
    ensure_hotel(&state, hotel_id).await?;
    validate_payload(&state, hotel_id, &request).await?;

    let timer = state.metrics.start_calendar_replace();
    let replaced = state.calendars.replace(hotel_id, period_id, &request).await;
    timer.complete();

    let (period, prices) = replaced?.ok_or(CalendarError::PeriodNotFound { hotel_id, period_id })?;

    Ok(Json(PricingPeriodResponse::new(period, prices)))
}

/// Handler for DELETE /api/hotels/:hotel_id/price_calendars/:id
#[utoipa::path(
    delete,
    path = "/api/hotels/{hotel_id}/price_calendars/{id}",
    params(
        ("hotel_id" = i32, Path, description = "Hotel ID"),
        ("id" = i32, Path, description = "Pricing period ID")
    ),
    responses(
        (status = 204, description = "Pricing period deleted"),
        (status = 404, description = "Hotel or period not found")
    ),
    tag = "price_calendars"
)]
pub async fn delete_period(
    State(state): State<AppState>,
    Path((hotel_id, period_id)): Path<(i32, i32)>,
) -> Result<StatusCode, CalendarError> {
    if !state.calendars.delete(hotel_id, period_id).await? {
        return Err(CalendarError::PeriodNotFound { hotel_id, period_id });
    }

    tracing::info!("Deleted pricing period {} of hotel {}", period_id, hotel_id);
    Ok(StatusCode::NO_CONTENT)
}
