// HTTP handler for promo code checks

use axum::{extract::State, Json};
use chrono::Utc;
use validator::Validate;

use crate::promocodes::{PromoCodeCheckRequest, PromoCodeCheckResponse, PromoError};
use crate::AppState;

/// Handler for POST /api/promocodes/check
/// Validates a promo code against exactly one tour or hotel
#[utoipa::path(
    post,
    path = "/api/promocodes/check",
    request_body = PromoCodeCheckRequest,
    responses(
        (status = 200, description = "Promo code applies", body = PromoCodeCheckResponse),
        (status = 400, description = "Unknown, expired or ineligible promo code"),
        (status = 404, description = "Tour not found")
    ),
    tag = "promocodes"
)]
pub async fn check_promo_code(
    State(state): State<AppState>,
    Json(request): Json<PromoCodeCheckRequest>,
) -> Result<Json<PromoCodeCheckResponse>, PromoError> {
    request.validate()?;

    let response = state
        .promos
        .check(&request, Utc::now().date_naive())
        .await?;

    Ok(Json(response))
}
