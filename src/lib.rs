pub mod calendars;
pub mod config;
pub mod db;
pub mod discount;
pub mod error;
pub mod hotels;
pub mod pricing;
pub mod promocodes;
pub mod query;
pub mod rooms;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use calendars::CalendarRepository;
use config::AppConfig;
use hotels::{HotelRepository, HotelService};
use pricing::{PerformanceMetrics, PricingService};
use promocodes::{PromoRepository, PromoService};
use rooms::RoomRepository;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        calendars::list_periods,
        calendars::create_period,
        calendars::get_period,
        calendars::replace_period,
        calendars::delete_period,
        rooms::list_rooms,
        rooms::quote_room,
        hotels::search_hotels,
        hotels::hot_hotels,
        hotels::popular_hotels,
        promocodes::check_promo_code,
        pricing::get_metrics,
    ),
    components(
        schemas(
            calendars::PricingPeriodRequest,
            calendars::NightlyPriceInput,
            calendars::PricingPeriodResponse,
            calendars::NightlyPriceResponse,
            rooms::Room,
            rooms::RoomResponse,
            rooms::StayQuoteResponse,
            hotels::Hotel,
            hotels::HotelWithPrice,
            hotels::PopularHotel,
            promocodes::PromoCodeCheckRequest,
            promocodes::PromoCodeCheckResponse,
            pricing::MetricsSummary,
            pricing::OperationSummary,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "price_calendars", description = "Hotel pricing periods and nightly prices"),
        (name = "rooms", description = "Room search and stay quotes"),
        (name = "hotels", description = "Hotel search and country rollups"),
        (name = "promocodes", description = "Promo code checks"),
        (name = "pricing", description = "Pricing engine diagnostics")
    ),
    info(
        title = "Travel Booking Pricing API",
        version = "1.0.0",
        description = "Nightly pricing calendars, stay quotes, hotel rollups and promo codes"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub calendars: CalendarRepository,
    pub rooms: RoomRepository,
    pub hotels: HotelService,
    pub promos: PromoService,
    pub pricing: PricingService,
    pub metrics: PerformanceMetrics,
    pub popular_hotels_limit: usize,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let metrics = PerformanceMetrics::new();
        let calendars = CalendarRepository::new(pool.clone());
        let pricing = PricingService::new(calendars.clone(), metrics.clone());

        Self {
            rooms: RoomRepository::new(pool.clone()),
            hotels: HotelService::new(HotelRepository::new(pool.clone()), pricing.clone()),
            promos: PromoService::new(PromoRepository::new(pool)),
            calendars,
            pricing,
            metrics,
            popular_hotels_limit: config.popular_hotels_limit,
        }
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/api/hotels/:hotel_id/price_calendars",
            get(calendars::list_periods).post(calendars::create_period),
        )
        .route(
            "/api/hotels/:hotel_id/price_calendars/:id",
            get(calendars::get_period)
                .put(calendars::replace_period)
                .delete(calendars::delete_period),
        )
        .route("/api/rooms", get(rooms::list_rooms))
        .route("/api/rooms/:id/quote", get(rooms::quote_room))
        .route("/api/hotels", get(hotels::search_hotels))
        .route("/api/hotels/hot", get(hotels::hot_hotels))
        .route("/api/hotels/popular", get(hotels::popular_hotels))
        .route("/api/promocodes/check", post(promocodes::check_promo_code))
        .route("/api/pricing/metrics", get(pricing::get_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
